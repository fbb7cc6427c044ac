//! Drive API client
//!
//! Wraps the Drive v3 REST endpoints and implements the DriveStore trait from
//! gd-core. Every operation is a single round trip: no retry, no pagination,
//! no caching. Provider errors are mapped onto gd-core error variants with
//! the provider's message carried through verbatim.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use gd_core::{
    DriveFile, DriveStore, Error, QueryResult, Result, StoredCredentials, UploadRequest,
    FOLDER_MIME_TYPE,
};

use crate::auth;

const BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Fields requested on file resources
const FILE_FIELDS: &str = "id,name,mimeType,createdTime,parents";

/// Drive v3 API client
pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
    upload_url: String,
}

impl DriveClient {
    /// Create a client from a stored credential set
    ///
    /// An expired access token is refreshed here, at call time, through the
    /// auth layer; the refreshed token lives only for this process.
    pub async fn new(creds: StoredCredentials) -> Result<Self> {
        let creds = if creds.is_expired(Timestamp::now()) {
            tracing::debug!("access token expired, refreshing");
            auth::refresh_access_token(&creds).await?
        } else {
            creds
        };

        Ok(Self {
            http: reqwest::Client::new(),
            access_token: creds.token,
            base_url: BASE_URL.to_string(),
            upload_url: UPLOAD_URL.to_string(),
        })
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| Error::Network(format!("Invalid response body: {e}")))
        } else {
            Err(api_error(response).await)
        }
    }
}

#[async_trait]
impl DriveStore for DriveClient {
    async fn create_folder(&self, name: &str) -> Result<DriveFile> {
        let body = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
        });

        let response = self
            .http
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[("fields", FILE_FIELDS)])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let folder: DriveFile = self.handle_response(response).await?;
        tracing::info!(id = %folder.id, name, "folder created");
        Ok(folder)
    }

    async fn upload_file(&self, request: &UploadRequest) -> Result<DriveFile> {
        let name = request.target_name();
        if name.is_empty() {
            return Err(Error::Config(format!(
                "Upload source has no file name: {}",
                request.source.display()
            )));
        }

        let data = std::fs::read(&request.source)?;
        let content_type = mime_guess::from_path(&request.source).first_or_octet_stream();

        let mut metadata = serde_json::json!({ "name": name });
        if let Some(folder_id) = &request.folder_id {
            metadata["parents"] = serde_json::json!([folder_id]);
        }

        // Resumable upload: initiate a session, then send the bytes in one
        // shot. Interruption recovery is left to the provider's session TTL.
        let response = self
            .http
            .post(format!("{}/files", self.upload_url))
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "resumable"), ("fields", FILE_FIELDS)])
            .header("X-Upload-Content-Type", content_type.essence_str())
            .json(&metadata)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let session_uri = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Network("Upload session response is missing the Location header".into())
            })?;

        tracing::debug!(
            size = data.len(),
            content_type = content_type.essence_str(),
            "upload session created"
        );

        let response = self
            .http
            .put(session_uri)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type.essence_str())
            .body(data)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let file: DriveFile = self.handle_response(response).await?;
        tracing::info!(id = %file.id, name = %file.name, "file uploaded");
        Ok(file)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/files/{}", self.base_url, file_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        tracing::info!(id = file_id, "file deleted");
        Ok(())
    }

    async fn query_files(&self, name_contains: &str, order_by: &str) -> Result<QueryResult> {
        let query = build_name_query(name_contains);
        let fields = format!("nextPageToken,files({FILE_FIELDS})");

        let response = self
            .http
            .get(format!("{}/files", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query.as_str()),
                ("orderBy", order_by),
                ("fields", fields.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let result: QueryResult = self.handle_response(response).await?;
        tracing::debug!(matches = result.files.len(), query = %query, "query complete");
        Ok(result)
    }
}

/// Build the provider filter expression for a name-substring query
///
/// The substring lands inside single quotes, so backslashes and single
/// quotes have to be escaped, in that order.
fn build_name_query(name_contains: &str) -> String {
    let escaped = name_contains.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name contains '{escaped}'")
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

async fn api_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    classify_error(status, &body)
}

/// Map a provider error response onto a gd-core error
///
/// The provider's own message is kept verbatim; the status code picks the
/// variant. Quota denials arrive both as 403 with a quota reason and as 429.
fn classify_error(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let reasons: Vec<&str> = parsed
        .as_ref()
        .map(|e| e.error.errors.iter().map(|d| d.reason.as_str()).collect())
        .unwrap_or_default();

    match status {
        401 => Error::Auth(message),
        403 => {
            let quota = reasons.iter().any(|r| {
                matches!(
                    *r,
                    "storageQuotaExceeded"
                        | "quotaExceeded"
                        | "userRateLimitExceeded"
                        | "rateLimitExceeded"
                        | "dailyLimitExceeded"
                )
            });
            if quota {
                Error::QuotaExceeded(message)
            } else {
                Error::PermissionDenied(message)
            }
        }
        404 => Error::NotFound(message),
        429 => Error::QuotaExceeded(message),
        _ => Error::Network(format!("HTTP {status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_name_query_plain() {
        assert_eq!(build_name_query("report"), "name contains 'report'");
    }

    #[test]
    fn test_build_name_query_escapes_quotes() {
        assert_eq!(
            build_name_query("bob's report"),
            r"name contains 'bob\'s report'"
        );
    }

    #[test]
    fn test_build_name_query_escapes_backslash_first() {
        assert_eq!(build_name_query(r"a\'b"), r"name contains 'a\\\'b'");
    }

    #[test]
    fn test_classify_not_found_keeps_message_verbatim() {
        let body = r#"{"error": {"code": 404, "message": "File not found: abc123.",
            "errors": [{"reason": "notFound"}]}}"#;
        let err = classify_error(404, body);
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: File not found: abc123.");
    }

    #[test]
    fn test_classify_auth() {
        let body = r#"{"error": {"code": 401, "message": "Invalid Credentials",
            "errors": [{"reason": "authError"}]}}"#;
        let err = classify_error(401, body);
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_classify_quota_via_403_reason() {
        let body = r#"{"error": {"code": 403, "message": "Quota exceeded",
            "errors": [{"reason": "storageQuotaExceeded"}]}}"#;
        let err = classify_error(403, body);
        assert!(matches!(err, Error::QuotaExceeded(_)));
    }

    #[test]
    fn test_classify_plain_403_is_permission_denied() {
        let body = r#"{"error": {"code": 403, "message": "The user does not have permission",
            "errors": [{"reason": "insufficientFilePermissions"}]}}"#;
        let err = classify_error(403, body);
        assert!(matches!(err, Error::PermissionDenied(_)));
    }

    #[test]
    fn test_classify_429_is_quota() {
        let err = classify_error(429, "");
        assert!(matches!(err, Error::QuotaExceeded(_)));
    }

    #[test]
    fn test_classify_unparseable_body_falls_back_to_raw_text() {
        let err = classify_error(500, "backend exploded");
        assert!(matches!(err, Error::Network(_)));
        assert!(err.to_string().contains("backend exploded"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_query_result_wire_shape() {
        // The query response deserializes straight into QueryResult.
        let body = r#"{
            "nextPageToken": "tok",
            "files": [
                {"id": "a", "name": "annual report.pdf", "mimeType": "application/pdf",
                 "createdTime": "2024-01-15T10:00:00.000Z"},
                {"id": "b", "name": "report-final.txt"}
            ]
        }"#;
        let result: QueryResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.files.len(), 2);
        assert_eq!(result.files[0].id, "a");
        assert!(result.files[0].created_time.is_some());
        assert_eq!(result.next_page_token.as_deref(), Some("tok"));
    }
}
