use uuid::Uuid;

use crate::{
    api::error,
    modules::file::{model::NewFile, schema::FileEntity},
};

#[async_trait::async_trait]
pub trait FileRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError>;

    async fn find_by_filename(
        &self,
        filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    /// All records, newest first.
    async fn find_all(&self) -> Result<Vec<FileEntity>, error::SystemError>;

    async fn find_by_owner(&self, user_id: &Uuid) -> Result<Vec<FileEntity>, error::SystemError>;

    async fn update_tags(
        &self,
        filename: &str,
        tags: Option<&str>,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    /// Adds one to the view count in a single statement and returns the
    /// updated row, or `None` when the filename is unknown.
    async fn increment_view_count(
        &self,
        filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError>;

    async fn delete(&self, filename: &str) -> Result<bool, error::SystemError>;
}
