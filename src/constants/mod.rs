use crate::modules::file::model::AccessPolicy;

pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub database_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub upload_dir: String,
    pub access_policy: AccessPolicy,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        // Tokens live for one hour unless overridden; there is no refresh flow.
        let access_token_expiration = std::env::var("ACCESS_TOKEN_EXPIRATION")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let access_policy = std::env::var("ACCESS_POLICY")
            .unwrap_or_else(|_| "owner".to_string())
            .parse::<AccessPolicy>()
            .expect("ACCESS_POLICY must be either `owner` or `shared`");

        let admin_email = std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty());
        let admin_password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());

        Env {
            jwt_secret,
            access_token_expiration,
            database_url,
            frontend_url,
            ip,
            port,
            upload_dir,
            access_policy,
            admin_email,
            admin_password,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
