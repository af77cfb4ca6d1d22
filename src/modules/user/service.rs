use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::user::model::{
    InsertUser, LoginModel, LoginResponse, RegisterModel, normalize_email,
};
use crate::modules::user::{repository::UserRepository, schema::UserRole};
use crate::utils::{Claims, TokenConfig, hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    tokens: TokenConfig,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        tokens: TokenConfig,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, tokens }
    }

    pub async fn register(&self, user: RegisterModel) -> Result<Uuid, error::SystemError> {
        let password_hash = hash_password(&user.password)?;

        let new_user =
            InsertUser { email: normalize_email(&user.email), password_hash, role: UserRole::User };

        let user_id = self.repo.create(&new_user).await?;
        info!("User {} registered", user_id);
        Ok(user_id)
    }

    pub async fn login(&self, user: LoginModel) -> Result<LoginResponse, error::SystemError> {
        let user_entity = self
            .repo
            .find_by_email(&normalize_email(&user.email))
            .await?
            .ok_or_else(|| error::SystemError::bad_request("Invalid credentials"))?;

        let valid = verify_password(&user_entity.password_hash, &user.password)?;
        if !valid {
            return Err(error::SystemError::bad_request("Invalid credentials"));
        }

        let token = Claims::new(&user_entity.id, &user_entity.role, self.tokens.expiration)
            .encode(self.tokens.secret.as_bytes())?;

        Ok(LoginResponse { token, role: user_entity.role })
    }

    /// Creates the bootstrap admin account unless the email is already taken.
    /// Returns `true` when a new account was inserted.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<bool, error::SystemError> {
        let email = normalize_email(email);
        if self.repo.find_by_email(&email).await?.is_some() {
            info!("Admin seed skipped, {} already exists", email);
            return Ok(false);
        }

        let password_hash = hash_password(password)?;
        let id = self
            .repo
            .create(&InsertUser { email: email.clone(), password_hash, role: UserRole::Admin })
            .await?;
        info!("Seeded admin account {} ({})", email, id);
        Ok(true)
    }
}
