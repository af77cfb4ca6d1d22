use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::{api::error, modules::user::schema::UserRole, utils::Claims};

pub const TAG_DELIMITER: &str = ",";

/// New file metadata to insert into database
#[derive(Debug, Clone)]
pub struct NewFile {
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub shareable_link: String,
    pub user_id: Uuid,
}

/// Who may list, tag and delete records they did not upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    /// Owners manage their own files, admins manage everything.
    #[default]
    OwnerOrAdmin,
    /// Every authenticated caller manages every file.
    Shared,
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" | "owner-or-admin" => Ok(AccessPolicy::OwnerOrAdmin),
            "shared" => Ok(AccessPolicy::Shared),
            other => Err(format!("unknown access policy `{other}`")),
        }
    }
}

impl AccessPolicy {
    pub fn can_list_all(&self, requester: &Requester) -> bool {
        match self {
            AccessPolicy::Shared => true,
            AccessPolicy::OwnerOrAdmin => requester.role == UserRole::Admin,
        }
    }

    pub fn can_modify(&self, requester: &Requester, owner_id: &Uuid) -> bool {
        self.can_list_all(requester) || requester.user_id == *owner_id
    }
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Requester {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl From<&Claims> for Requester {
    fn from(claims: &Claims) -> Self {
        Requester { user_id: claims.sub, role: claims.role.clone() }
    }
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub url_prefix: String,
    pub share_prefix: String,
    pub policy: AccessPolicy,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/uploads".to_string(),
            share_prefix: "/uploads/share".to_string(),
            policy: AccessPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddTagsModel {
    #[validate(length(min = 1, message = "Filename cannot be empty"))]
    pub filename: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Builds a collision-resistant blob name:
/// `<millis>-<field>-<suffix><.ext>`. Only purely alphanumeric extensions of
/// the original name are carried over.
pub fn generate_filename(field_name: &str, original_name: &str, millis: i64, suffix: u32) -> String {
    let field: String = field_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let field = if field.is_empty() { "file".to_string() } else { field };

    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 16)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{millis}-{field}-{suffix:08x}.{}", ext.to_ascii_lowercase()),
        None => format!("{millis}-{field}-{suffix:08x}"),
    }
}

/// Joins tags into the stored representation. Whitespace is trimmed, empty
/// entries dropped, and an empty set is stored as `NULL`.
pub fn encode_tags(tags: &[String]) -> Result<Option<String>, error::SystemError> {
    let mut cleaned = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tag.contains(TAG_DELIMITER) {
            return Err(error::SystemError::bad_request(format!(
                "Tag '{tag}' must not contain '{TAG_DELIMITER}'"
            )));
        }
        cleaned.push(tag);
    }

    if cleaned.is_empty() {
        Ok(None)
    } else {
        Ok(Some(cleaned.join(TAG_DELIMITER)))
    }
}

pub fn decode_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(TAG_DELIMITER)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
