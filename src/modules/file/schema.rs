use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::file::model::decode_tags;

/// File metadata entity from database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub tags: Option<String>,
    pub view_count: i64,
    pub shareable_link: String,
    pub user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A file record as returned to clients, with tags split into a list.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub tags: Vec<String>,
    pub view_count: i64,
    pub shareable_link: String,
    pub user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<FileEntity> for FileResponse {
    fn from(entity: FileEntity) -> Self {
        FileResponse {
            tags: decode_tags(entity.tags.as_deref()),
            id: entity.id,
            filename: entity.filename,
            original_name: entity.original_name,
            file_path: entity.file_path,
            view_count: entity.view_count,
            shareable_link: entity.shareable_link,
            user_id: entity.user_id,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileBodyResponse {
    pub file: FileResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileStatsResponse {
    pub filename: String,
    pub original_name: String,
    pub view_count: i64,
    pub tags: Vec<String>,
}

impl From<FileEntity> for FileStatsResponse {
    fn from(entity: FileEntity) -> Self {
        FileStatsResponse {
            tags: decode_tags(entity.tags.as_deref()),
            filename: entity.filename,
            original_name: entity.original_name,
            view_count: entity.view_count,
        }
    }
}
