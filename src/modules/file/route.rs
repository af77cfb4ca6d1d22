use actix_web::{middleware::from_fn, web};

use crate::middlewares::authentication;
use crate::modules::file::{handle::*, repository::FileRepository, storage::BlobStorage};

pub fn configure<R, S>(cfg: &mut web::ServiceConfig)
where
    R: FileRepository + Send + Sync + 'static,
    S: BlobStorage + Send + Sync + 'static,
{
    cfg.service(
        web::resource("/upload")
            .wrap(from_fn(authentication))
            .route(web::post().to(upload_file::<R, S>)),
    )
    .service(
        web::resource("/add-tags")
            .wrap(from_fn(authentication))
            .route(web::post().to(add_tags::<R, S>)),
    )
    .service(
        web::resource("/uploads")
            .wrap(from_fn(authentication))
            .route(web::get().to(list_files::<R, S>)),
    )
    .service(web::resource("/uploads/share/{filename}").route(web::get().to(view_file::<R, S>)))
    .service(web::resource("/uploads/stats/{filename}").route(web::get().to(get_stats::<R, S>)))
    .service(
        web::resource("/uploads/{filename}")
            .route(web::get().to(view_file::<R, S>))
            .route(web::delete().to(delete_file::<R, S>).wrap(from_fn(authentication))),
    );
}
