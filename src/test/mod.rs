//! In-memory repository doubles for service and handler tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::api::error;
use crate::modules::file::{model::NewFile, repository::FileRepository, schema::FileEntity};
use crate::modules::user::{model::InsertUser, repository::UserRepository, schema::UserEntity};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<UserEntity>>,
}

#[async_trait::async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(error::SystemError::Conflict(Some(error::DbErrorMeta {
                code: Some("23505".to_string()),
                constraint: Some("uq_users_email".to_string()),
                message: "duplicate key value violates unique constraint".to_string(),
            })));
        }

        let id = Uuid::now_v7();
        users.push(UserEntity {
            id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.clone(),
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }
}

#[derive(Default)]
pub struct MemoryFileRepository {
    files: Mutex<Vec<FileEntity>>,
    fail_inserts: AtomicBool,
}

impl MemoryFileRepository {
    /// Makes every subsequent `create` fail like a dropped connection.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }
}

#[async_trait::async_trait]
impl FileRepository for MemoryFileRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(error::SystemError::DatabaseError("connection reset".into()));
        }

        let mut files = self.files.lock().unwrap();
        if files.iter().any(|f| f.filename == file.filename) {
            return Err(error::SystemError::Conflict(None));
        }

        let entity = FileEntity {
            id: Uuid::now_v7(),
            filename: file.filename.clone(),
            original_name: file.original_name.clone(),
            file_path: file.file_path.clone(),
            tags: None,
            view_count: 0,
            shareable_link: file.shareable_link.clone(),
            user_id: file.user_id,
            created_at: chrono::Utc::now(),
        };
        files.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_filename(
        &self,
        filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let files = self.files.lock().unwrap();
        Ok(files.iter().find(|f| f.filename == filename).cloned())
    }

    async fn find_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = self.files.lock().unwrap();
        Ok(files.iter().rev().cloned().collect())
    }

    async fn find_by_owner(&self, user_id: &Uuid) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = self.files.lock().unwrap();
        Ok(files.iter().rev().filter(|f| f.user_id == *user_id).cloned().collect())
    }

    async fn update_tags(
        &self,
        filename: &str,
        tags: Option<&str>,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let mut files = self.files.lock().unwrap();
        Ok(files.iter_mut().find(|f| f.filename == filename).map(|f| {
            f.tags = tags.map(str::to_string);
            f.clone()
        }))
    }

    async fn increment_view_count(
        &self,
        filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let mut files = self.files.lock().unwrap();
        Ok(files.iter_mut().find(|f| f.filename == filename).map(|f| {
            f.view_count += 1;
            f.clone()
        }))
    }

    async fn delete(&self, filename: &str) -> Result<bool, error::SystemError> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.filename != filename);
        Ok(files.len() < before)
    }
}
