use actix_cors::Cors;
use actix_web::{self, App, HttpServer, middleware::Logger, web};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, run_migrations},
    modules::{
        file::{
            model::UploadConfig, repository_pg::FilePgRepository, service::FileService,
            storage::LocalBlobStorage,
        },
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
    utils::TokenConfig,
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool = connect_database()
        .await
        .map_err(|e| std::io::Error::other(format!("Database connection error: {e}")))?;
    run_migrations(&db_pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Database migration error: {e}")))?;

    let tokens =
        TokenConfig { secret: ENV.jwt_secret.clone(), expiration: ENV.access_token_expiration };

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let user_service = UserService::with_dependencies(Arc::new(user_repo), tokens.clone());

    if let (Some(email), Some(password)) = (&ENV.admin_email, &ENV.admin_password) {
        user_service
            .seed_admin(email, password)
            .await
            .map_err(|e| std::io::Error::other(format!("Admin seeding error: {e}")))?;
    }

    let storage = LocalBlobStorage::new(&ENV.upload_dir)
        .map_err(|e| std::io::Error::other(format!("Upload directory error: {e}")))?;
    log::info!("Storing uploads in {}", ENV.upload_dir);

    let file_service = web::Data::new(FileService::new(
        Arc::new(FilePgRepository::new(db_pool.clone())),
        Arc::new(storage),
        UploadConfig { policy: ENV.access_policy, ..UploadConfig::default() },
    ));
    let user_service = web::Data::new(user_service);
    let tokens = web::Data::new(tokens);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(tokens.clone())
            .app_data(user_service.clone())
            .app_data(file_service.clone())
            .service(health_check)
            .configure(modules::user::route::public_api_configure)
            .configure(modules::file::route::configure::<FilePgRepository, LocalBlobStorage>)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
