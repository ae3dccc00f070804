//! Object storage client for product images.
//!
//! Images are uploaded under a generated key of the form
//! `{unix_millis}-{filename}`. The public URL is stored on the product, and
//! deletion parses the key back out of that URL (last path segment, query
//! string dropped, percent-decoded).

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use crate::config::StorageConfig;

/// Errors that can occur when interacting with object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A stored object URL could not be parsed back into a key.
    #[error("invalid object URL: {0}")]
    InvalidObjectUrl(String),

    /// Failed to build the request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Object storage client.
#[derive(Clone)]
pub struct ObjectStoreClient {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
}

impl ObjectStoreClient {
    /// Create a new object storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StorageError::Parse(format!("Invalid access token format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        })
    }

    /// Upload an object and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns error if the upload request fails.
    pub async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let url = self.object_url(key);

        let response = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(url)
    }

    /// Delete the object a stored public URL points at.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidObjectUrl` when the URL has no key, or
    /// an API error when the delete request fails.
    pub async fn delete_by_url(&self, object_url: &str) -> Result<(), StorageError> {
        let key = key_from_url(object_url)?;

        let response = self.client.delete(self.object_url(&key)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.bucket,
            urlencoding::encode(key)
        )
    }
}

/// Build the storage key for an upload: `{unix_millis}-{filename}`.
///
/// The filename is reduced to a safe character set first.
#[must_use]
pub fn object_key(filename: &str, uploaded_at_millis: i64) -> String {
    format!("{uploaded_at_millis}-{}", sanitize_filename(filename))
}

/// Extract the storage key from a stored public URL.
///
/// Takes the last path segment, drops any query string, and percent-decodes
/// it — the inverse of [`object_key`] plus URL encoding.
///
/// # Errors
///
/// Returns `StorageError::InvalidObjectUrl` when the URL doesn't parse or
/// has an empty path.
pub fn key_from_url(object_url: &str) -> Result<String, StorageError> {
    let parsed = Url::parse(object_url)
        .map_err(|_| StorageError::InvalidObjectUrl(object_url.to_string()))?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StorageError::InvalidObjectUrl(object_url.to_string()))?;

    let decoded = urlencoding::decode(segment)
        .map_err(|_| StorageError::InvalidObjectUrl(object_url.to_string()))?;

    Ok(decoded.into_owned())
}

/// Keep only characters that are safe in a storage key.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_timestamp_prefixed() {
        assert_eq!(object_key("photo.png", 1_700_000_000_000), "1700000000000-photo.png");
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(
            object_key("my summer photo!.jpg", 1),
            "1-my_summer_photo_.jpg"
        );
        assert_eq!(object_key("", 1), "1-upload");
    }

    #[test]
    fn key_round_trips_through_url() {
        let key = object_key("chair.png", 1_700_000_000_000);
        let url = format!("https://storage.example.com/images/{key}");
        assert_eq!(key_from_url(&url).expect("key"), key);
    }

    #[test]
    fn key_parsing_drops_query_params() {
        let url = "https://storage.example.com/images/1700-chair.png?alt=media&v=2";
        assert_eq!(key_from_url(url).expect("key"), "1700-chair.png");
    }

    #[test]
    fn key_parsing_decodes_percent_encoding() {
        let url = "https://storage.example.com/images/1700-my%20chair.png";
        assert_eq!(key_from_url(url).expect("key"), "1700-my chair.png");
    }

    #[test]
    fn rejects_urls_without_a_key() {
        assert!(key_from_url("not a url").is_err());
        assert!(key_from_url("https://storage.example.com").is_err());
    }
}
