use uuid::Uuid;

use crate::{
    api::error,
    modules::file::{model::NewFile, repository::FileRepository, schema::FileEntity},
};

#[derive(Clone)]
pub struct FilePgRepository {
    pool: sqlx::PgPool,
}

impl FilePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FilePgRepository {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO files (id, filename, original_name, file_path, shareable_link, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&file.filename)
        .bind(&file.original_name)
        .bind(&file.file_path)
        .bind(&file.shareable_link)
        .bind(file.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_filename(
        &self,
        filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            "SELECT * FROM files WHERE filename = $1",
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn find_all(&self) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>(
            "SELECT * FROM files ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn find_by_owner(&self, user_id: &Uuid) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>(
            "SELECT * FROM files WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn update_tags(
        &self,
        filename: &str,
        tags: Option<&str>,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            "UPDATE files SET tags = $2 WHERE filename = $1 RETURNING *",
        )
        .bind(filename)
        .bind(tags)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn increment_view_count(
        &self,
        filename: &str,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            "UPDATE files SET view_count = view_count + 1 WHERE filename = $1 RETURNING *",
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete(&self, filename: &str) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM files WHERE filename = $1")
            .bind(filename)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}
