//! Types for storage operations

use serde::{Deserialize, Serialize};

/// Reference to an object in the default bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageRef {
    full_path: String,
}

impl StorageRef {
    /// Reference an object by path, e.g. `images/{uid}/{name}`
    pub fn new(path: &str) -> Self {
        Self {
            full_path: path.trim_matches('/').to_string(),
        }
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.full_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.full_path)
    }

    /// Path percent-encoded as a single URL segment
    pub(crate) fn encoded_path(&self) -> String {
        urlencoding::encode(&self.full_path).into_owned()
    }
}

/// Object metadata returned by upload and metadata requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Full object path
    pub name: String,

    /// The bucket
    pub bucket: String,

    #[serde(default)]
    pub content_type: Option<String>,

    /// Size in bytes, encoded as a decimal string
    #[serde(default)]
    pub size: Option<String>,

    /// Comma-separated download tokens
    #[serde(default)]
    pub download_tokens: Option<String>,

    #[serde(default)]
    pub time_created: Option<String>,
}

impl ObjectMetadata {
    pub fn first_download_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|t| t.split(',').map(str::trim).find(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_exposes_name_and_encoded_path() {
        let reference = StorageRef::new("/images/u1/abc/");
        assert_eq!(reference.full_path(), "images/u1/abc");
        assert_eq!(reference.name(), "abc");
        assert_eq!(reference.encoded_path(), "images%2Fu1%2Fabc");
    }

    #[test]
    fn first_token_skips_blanks() {
        let meta = ObjectMetadata {
            name: "images/u1/abc".into(),
            bucket: "b".into(),
            content_type: None,
            size: None,
            download_tokens: Some(" ,tok-1,tok-2".into()),
            time_created: None,
        };
        assert_eq!(meta.first_download_token(), Some("tok-1"));
    }
}
