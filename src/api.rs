// API client module: a small blocking HTTP client that talks to the
// LetsCrate service. Every call is a single POST with basic credentials;
// the engine only sees the `Transport` trait so tests can swap in a stub.

use crate::config::Credentials;
use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{multipart, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.letscrate.com/1/";

/// Blocking request/response round trip to the service.
pub trait Transport {
    fn post(&self, path: &str, params: &Params, credentials: &Credentials) -> Result<RawResponse>;
}

/// Form fields for one request, plus an optional local file for uploads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub fields: Vec<(String, String)>,
    pub file: Option<PathBuf>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parsed JSON envelope as the service returned it. Success and failure
/// share one loose shape: `{"status": "success"|"failure", "message": ..,
/// <payload key>: ..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse(Value);

impl RawResponse {
    pub fn new(value: Value) -> Self {
        RawResponse(value)
    }

    /// An empty success body.
    pub fn empty() -> Self {
        RawResponse(Value::Null)
    }

    fn has_value(&self, marker: &str) -> bool {
        self.0
            .as_object()
            .map(|m| m.values().any(|v| v.as_str() == Some(marker)))
            .unwrap_or(false)
    }

    /// True when any top-level value is the string `"failure"`.
    pub fn is_failure(&self) -> bool {
        self.has_value("failure")
    }

    /// True when any top-level value is the string `"success"`.
    pub fn is_success(&self) -> bool {
        self.has_value("success")
    }

    pub fn message(&self) -> String {
        self.0
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Request failed")
            .to_string()
    }

    /// Turn a failure envelope into `Error::RemoteFailure`.
    pub fn into_result(self) -> Result<Self> {
        if self.is_failure() {
            Err(Error::RemoteFailure {
                message: self.message(),
            })
        } else {
            Ok(self)
        }
    }

    /// Deserialize the object stored under `key`.
    pub fn payload<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .0
            .get(key)
            .ok_or_else(|| Error::MalformedResponse(format!("missing \"{}\"", key)))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Deserialize the whole body.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.0.clone())?)
    }
}

/// reqwest-backed transport. Holds the blocking client and the base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let client = Client::builder()
            .user_agent(concat!("letscrate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient { client, base_url })
    }

    /// Create an ApiClient from `LETSCRATE_API_URL`, falling back to the
    /// public endpoint.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("LETSCRATE_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upload_form(params: &Params, path: &Path) -> Result<multipart::Form> {
        let file = File::open(path)?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload")
            .to_string();
        let part = multipart::Part::reader(file).file_name(file_name);
        let mut form = multipart::Form::new().part("file", part);
        for (key, value) in &params.fields {
            form = form.text(key.clone(), value.clone());
        }
        Ok(form)
    }
}

impl Transport for ApiClient {
    fn post(&self, path: &str, params: &Params, credentials: &Credentials) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, fields = params.fields.len(), upload = params.file.is_some(), "POST");

        let request = self
            .client
            .post(&url)
            .basic_auth(credentials.username(), Some(credentials.password()));

        let response = match &params.file {
            Some(file) => {
                let form = Self::upload_form(params, file)?;
                // Uploads can take a while, show a spinner on stderr.
                let spinner = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                    spinner.set_style(style);
                }
                spinner.set_message(format!("Uploading {}...", file.display()));
                spinner.enable_steady_tick(Duration::from_millis(100));
                let sent = request.multipart(form).send();
                spinner.finish_and_clear();
                sent?
            }
            None => request.form(&params.fields).send()?,
        };

        let status = response.status();
        let body = response.text()?;
        tracing::trace!(status = status.as_u16(), len = body.len(), "response");

        if body.trim().is_empty() {
            if status.is_success() {
                return Ok(RawResponse::empty());
            }
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(RawResponse::new(value)),
            // A failure envelope is still JSON; anything else on an error
            // status is surfaced with the status code.
            Err(_) if !status.is_success() => Err(Error::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(Error::Json(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_marker_is_any_top_level_value() {
        let raw = RawResponse::new(json!({"status": "failure", "message": "Crate not found"}));
        assert!(raw.is_failure());
        assert!(!raw.is_success());
        match raw.into_result() {
            Err(Error::RemoteFailure { message }) => assert_eq!(message, "Crate not found"),
            other => panic!("expected remote failure, got {:?}", other),
        }

        let nested = RawResponse::new(json!({"crate": {"status": "failure"}}));
        assert!(!nested.is_failure(), "only top-level values count");
    }

    #[test]
    fn empty_body_is_neither_success_nor_failure() {
        let raw = RawResponse::empty();
        assert!(!raw.is_failure());
        assert!(!raw.is_success());
        assert!(raw.into_result().is_ok());
    }

    #[test]
    fn payload_reports_missing_keys() {
        let raw = RawResponse::new(json!({"status": "success"}));
        let err = raw.payload::<crate::model::Crate>("crate").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn params_builder_keeps_order() {
        let params = Params::new().field("crate_id", "00010").field("name", "x").file("a.txt");
        assert_eq!(params.get("crate_id"), Some("00010"));
        assert_eq!(params.fields[1].0, "name");
        assert_eq!(params.file, Some(PathBuf::from("a.txt")));
    }

    #[test]
    fn upload_form_needs_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beach.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();
        let params = Params::new().field("crate_id", "00010").file(&path);
        assert!(ApiClient::upload_form(&params, &path).is_ok());

        let missing = dir.path().join("gone.jpg");
        assert!(matches!(
            ApiClient::upload_form(&params, &missing),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:3001/1").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001/1/");
    }
}
