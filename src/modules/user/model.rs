use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::UserRole;

#[derive(Deserialize, Validate)]
pub struct RegisterModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginModel {
    #[validate(length(min = 1, message = "Email cannot be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

pub struct InsertUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: uuid::Uuid,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: UserRole,
}

/// Emails are compared case-insensitively and stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
