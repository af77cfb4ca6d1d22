use log::{info, warn};
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::file::{
    model::{NewFile, Requester, UploadConfig, encode_tags, generate_filename},
    repository::FileRepository,
    schema::FileEntity,
    storage::{BlobStorage, validate_name},
};

#[derive(Clone)]
pub struct FileService<R, S>
where
    R: FileRepository + Send + Sync,
    S: BlobStorage + Send + Sync,
{
    file_repo: Arc<R>,
    storage: Arc<S>,
    config: UploadConfig,
}

impl<R, S> FileService<R, S>
where
    R: FileRepository + Send + Sync,
    S: BlobStorage + Send + Sync,
{
    pub fn new(file_repo: Arc<R>, storage: Arc<S>, config: UploadConfig) -> Self {
        Self { file_repo, storage, config }
    }

    /// Persists the blob, then its record. If the insert fails the blob is
    /// removed again so no orphan is left behind.
    pub async fn upload_file(
        &self,
        owner_id: Uuid,
        field_name: &str,
        original_name: String,
        bytes: &[u8],
        base_url: &str,
    ) -> Result<FileEntity, error::SystemError> {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen();
        let filename = generate_filename(field_name, &original_name, millis, suffix);

        self.storage.write(&filename, bytes).await?;

        let new_file = NewFile {
            file_path: format!("{}/{}", self.config.url_prefix, filename),
            shareable_link: format!(
                "{}{}/{}",
                base_url.trim_end_matches('/'),
                self.config.share_prefix,
                filename
            ),
            filename,
            original_name,
            user_id: owner_id,
        };

        match self.file_repo.create(&new_file).await {
            Ok(entity) => {
                info!("File {} uploaded by {} ({} bytes)", entity.filename, owner_id, bytes.len());
                Ok(entity)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&new_file.filename).await {
                    warn!("Failed to remove orphaned blob {}: {}", new_file.filename, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Returns the record with the stored content and counts one view. The
    /// content is read first, so a record whose blob is gone is not counted.
    pub async fn record_access(
        &self,
        filename: &str,
    ) -> Result<(FileEntity, Vec<u8>), error::SystemError> {
        validate_name(filename).map_err(|_| error::SystemError::not_found("File not found"))?;

        let bytes = self.storage.read(filename).await?;

        let file = self
            .file_repo
            .increment_view_count(filename)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;

        Ok((file, bytes))
    }

    /// Reads a record without counting a view.
    pub async fn get_stats(&self, filename: &str) -> Result<FileEntity, error::SystemError> {
        self.file_repo
            .find_by_filename(filename)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))
    }

    /// Replaces the whole tag set of a file.
    pub async fn set_tags(
        &self,
        requester: &Requester,
        filename: &str,
        tags: &[String],
    ) -> Result<FileEntity, error::SystemError> {
        let file = self.get_stats(filename).await?;

        if !self.config.policy.can_modify(requester, &file.user_id) {
            return Err(error::SystemError::forbidden(
                "You don't have permission to tag this file",
            ));
        }

        let stored = encode_tags(tags)?;
        self.file_repo
            .update_tags(filename, stored.as_deref())
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))
    }

    pub async fn list_files(
        &self,
        requester: &Requester,
    ) -> Result<Vec<FileEntity>, error::SystemError> {
        if self.config.policy.can_list_all(requester) {
            self.file_repo.find_all().await
        } else {
            self.file_repo.find_by_owner(&requester.user_id).await
        }
    }

    /// Removes the record, then the blob. A blob that cannot be removed is
    /// logged and left on disk; the record stays deleted.
    pub async fn delete_file(
        &self,
        requester: &Requester,
        filename: &str,
    ) -> Result<(), error::SystemError> {
        let file = self.get_stats(filename).await?;

        if !self.config.policy.can_modify(requester, &file.user_id) {
            return Err(error::SystemError::forbidden(
                "You don't have permission to delete this file",
            ));
        }

        if !self.file_repo.delete(filename).await? {
            return Err(error::SystemError::not_found("File not found"));
        }

        if let Err(e) = self.storage.delete(filename).await {
            warn!("File {} deleted but its blob could not be removed: {}", filename, e);
        }

        info!("File {} deleted by {}", filename, requester.user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::file::model::AccessPolicy;
    use crate::modules::file::storage::LocalBlobStorage;
    use crate::modules::user::schema::UserRole;
    use crate::test::MemoryFileRepository;

    struct Fixture {
        _dir: tempfile::TempDir,
        blob_dir: std::path::PathBuf,
        repo: Arc<MemoryFileRepository>,
        service: FileService<MemoryFileRepository, LocalBlobStorage>,
    }

    fn fixture(policy: AccessPolicy) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let blob_dir = dir.path().join("uploads");
        let repo = Arc::new(MemoryFileRepository::default());
        let storage = Arc::new(LocalBlobStorage::new(&blob_dir).unwrap());
        let config = UploadConfig { policy, ..UploadConfig::default() };
        let service = FileService::new(repo.clone(), storage, config);
        Fixture { _dir: dir, blob_dir, repo, service }
    }

    fn user() -> Requester {
        Requester { user_id: Uuid::now_v7(), role: UserRole::User }
    }

    fn admin() -> Requester {
        Requester { user_id: Uuid::now_v7(), role: UserRole::Admin }
    }

    async fn upload(f: &Fixture, owner: &Requester) -> FileEntity {
        f.service
            .upload_file(owner.user_id, "file", "notes.txt".to_string(), b"content", "http://host:5000")
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_upload_then_list_has_fresh_record() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let owner = user();

        let created = upload(&f, &owner).await;
        let listed = f.service.list_files(&owner).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, created.filename);
        assert_eq!(listed[0].view_count, 0);
        assert_eq!(listed[0].tags, None);
        assert_eq!(listed[0].original_name, "notes.txt");
        assert!(created.filename.ends_with(".txt"));
        assert_eq!(created.file_path, format!("/uploads/{}", created.filename));
        assert_eq!(
            created.shareable_link,
            format!("http://host:5000/uploads/share/{}", created.filename)
        );
        assert!(f.blob_dir.join(&created.filename).exists());
    }

    #[actix_web::test]
    async fn test_failed_insert_removes_blob() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        f.repo.fail_inserts(true);

        let result = f
            .service
            .upload_file(Uuid::now_v7(), "file", "a.bin".to_string(), b"x", "http://h")
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(&f.blob_dir).unwrap().count(), 0);
        assert!(f.repo.is_empty());
    }

    #[actix_web::test]
    async fn test_sequential_accesses_are_counted() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let created = upload(&f, &user()).await;

        for expected in 1..=5 {
            let (file, bytes) = f.service.record_access(&created.filename).await.unwrap();
            assert_eq!(file.view_count, expected);
            assert_eq!(bytes, b"content");
        }

        let stats = f.service.get_stats(&created.filename).await.unwrap();
        assert_eq!(stats.view_count, 5);
    }

    #[actix_web::test]
    async fn test_stats_do_not_count_views() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let created = upload(&f, &user()).await;

        f.service.get_stats(&created.filename).await.unwrap();
        f.service.get_stats(&created.filename).await.unwrap();

        assert_eq!(f.service.get_stats(&created.filename).await.unwrap().view_count, 0);
    }

    #[actix_web::test]
    async fn test_access_unknown_file_is_not_found() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);

        let unknown = f.service.record_access("nope.txt").await;
        let traversal = f.service.record_access("../etc/passwd").await;

        assert!(matches!(unknown, Err(error::SystemError::NotFound(_))));
        assert!(matches!(traversal, Err(error::SystemError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_missing_blob_is_not_found() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let created = upload(&f, &user()).await;
        std::fs::remove_file(f.blob_dir.join(&created.filename)).unwrap();

        let result = f.service.record_access(&created.filename).await;
        assert!(matches!(result, Err(error::SystemError::NotFound(_))));

        let stats = f.service.get_stats(&created.filename).await.unwrap();
        assert_eq!(stats.view_count, 0);
    }

    #[actix_web::test]
    async fn test_set_tags_replaces_and_clears() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let owner = user();
        let created = upload(&f, &owner).await;

        let tags = vec!["a".to_string(), "b".to_string()];
        let tagged = f.service.set_tags(&owner, &created.filename, &tags).await.unwrap();
        assert_eq!(tagged.tags.as_deref(), Some("a,b"));

        let tags = vec!["c".to_string()];
        let retagged = f.service.set_tags(&owner, &created.filename, &tags).await.unwrap();
        assert_eq!(retagged.tags.as_deref(), Some("c"));

        f.service.set_tags(&owner, &created.filename, &[]).await.unwrap();
        let listed = f.service.list_files(&owner).await.unwrap();
        assert_eq!(listed[0].tags, None);
    }

    #[actix_web::test]
    async fn test_set_tags_unknown_file() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let result = f.service.set_tags(&user(), "missing", &[]).await;
        assert!(matches!(result, Err(error::SystemError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_delete_then_access_is_not_found() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let owner = user();
        let created = upload(&f, &owner).await;

        f.service.delete_file(&owner, &created.filename).await.unwrap();

        let result = f.service.record_access(&created.filename).await;
        assert!(matches!(result, Err(error::SystemError::NotFound(_))));
        assert!(!f.blob_dir.join(&created.filename).exists());
    }

    #[actix_web::test]
    async fn test_delete_survives_missing_blob() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let owner = user();
        let created = upload(&f, &owner).await;
        std::fs::remove_file(f.blob_dir.join(&created.filename)).unwrap();

        f.service.delete_file(&owner, &created.filename).await.unwrap();
        assert!(f.repo.is_empty());
    }

    #[actix_web::test]
    async fn test_owner_policy_restricts_strangers() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let owner = user();
        let stranger = user();
        let created = upload(&f, &owner).await;

        let tag = f.service.set_tags(&stranger, &created.filename, &[]).await;
        let delete = f.service.delete_file(&stranger, &created.filename).await;

        assert!(matches!(tag, Err(error::SystemError::Forbidden(_))));
        assert!(matches!(delete, Err(error::SystemError::Forbidden(_))));
        assert!(f.service.list_files(&stranger).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_admin_manages_any_file() {
        let f = fixture(AccessPolicy::OwnerOrAdmin);
        let admin = admin();
        upload(&f, &user()).await;
        let created = upload(&f, &user()).await;

        assert_eq!(f.service.list_files(&admin).await.unwrap().len(), 2);
        f.service.delete_file(&admin, &created.filename).await.unwrap();
        assert_eq!(f.service.list_files(&admin).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_shared_policy_allows_everyone() {
        let f = fixture(AccessPolicy::Shared);
        let stranger = user();
        let created = upload(&f, &user()).await;

        assert_eq!(f.service.list_files(&stranger).await.unwrap().len(), 1);
        f.service.set_tags(&stranger, &created.filename, &["x".to_string()]).await.unwrap();
        f.service.delete_file(&stranger, &created.filename).await.unwrap();
    }
}
