//! Client for the tax-law case archive.
//!
//! The archive's web UI talks to a single form-encoded RPC endpoint,
//! `POST /action.do`, with two fields: `actionId` selects the operation
//! and `paramData` carries its JSON payload. Every reply has the shape
//! `{"status": "SUCCESS", "data": {"<actionId>": ...}}`.
//!
//! | Action | Payload | Result |
//! |--------|---------|--------|
//! | [`DETAIL_ACTION`] | `{"dcmDVO": {"ntstDcmId", "ntstDcmGrpCd"}}` | case metadata and attachments |
//! | [`FILE_INFO_ACTION`] | `{"fleId", "fleSn"}` | list of file records with `fleDwldUri` |
//!
//! Attachments (usually HWP) are converted to PDF server-side by
//! `GET /downloadPDFFile.do?fleId=..&fleSn=..`.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ArchiveConfig;
use crate::extract::looks_like_pdf;

pub const ACTION_PATH: &str = "/action.do";
pub const DETAIL_ACTION: &str = "ASIQTB002PR01";
pub const FILE_INFO_ACTION: &str = "ACMCMA001MR02";
pub const PDF_DOWNLOAD_PATH: &str = "/downloadPDFFile.do";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("action {action} failed: {status}")]
    ActionStatus { action: String, status: String },
    #[error("malformed {action} payload: {source}")]
    Payload {
        action: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid URL {0}")]
    Url(String),
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Envelope returned by `/action.do`.
#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Case metadata and attachments returned by [`DETAIL_ACTION`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseDetail {
    #[serde(rename = "dcmDVO", default)]
    pub meta: Option<CaseMeta>,
    #[serde(rename = "dcmHwpEditorDVOList", default)]
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseMeta {
    /// Case title.
    #[serde(rename = "ntstDcmTtl", default)]
    pub title: Option<String>,
    /// Registration date, e.g. `"20140312"`.
    #[serde(rename = "ntstDcmRgtDt", default)]
    pub registered_on: Option<String>,
    /// Court case number, e.g. `"대법원2013두12345"`.
    #[serde(rename = "ntstPrdgHpnnNoCntn", default)]
    pub case_number: Option<String>,
}

/// One entry of `dcmHwpEditorDVOList`. Fields of an unexpected JSON type
/// read as `None` rather than failing the whole detail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attachment {
    #[serde(rename = "dcmFleTy", default, deserialize_with = "lenient_string")]
    pub file_type: Option<String>,
    #[serde(rename = "dcmFleId", default, deserialize_with = "lenient_string")]
    pub file_id: Option<String>,
    #[serde(rename = "dcmFleSn", default, deserialize_with = "lenient_serial")]
    pub file_serial: Option<FileSerial>,
}

/// Strings as-is, numbers in their decimal form, anything else `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_serial<'de, D>(deserializer: D) -> Result<Option<FileSerial>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => Some(match n.as_i64() {
            Some(i) => FileSerial::Number(i),
            None => FileSerial::Text(n.to_string()),
        }),
        Some(serde_json::Value::String(s)) => Some(FileSerial::Text(s)),
        _ => None,
    })
}

impl Attachment {
    /// Only HWP and PDF attachments can be served as PDF.
    pub fn is_convertible(&self) -> bool {
        matches!(self.file_type.as_deref(), Some("hwp") | Some("pdf"))
    }
}

impl CaseDetail {
    /// The first attachment the PDF endpoint can serve.
    pub fn pdf_attachment(&self) -> Option<&Attachment> {
        self.attachments
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|a| a.is_convertible())
    }
}

/// Attachment serial number. The archive sends it as a number, but some
/// records carry it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FileSerial {
    Number(i64),
    Text(String),
}

impl fmt::Display for FileSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSerial::Number(n) => write!(f, "{}", n),
            FileSerial::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One record of a [`FILE_INFO_ACTION`] reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileInfo {
    #[serde(rename = "fleDwldUri", default)]
    pub download_uri: Option<String>,
}

/// HTTP client bound to one archive base URL.
pub struct ArchiveClient {
    client: reqwest::Client,
    base: Url,
    action_timeout: Duration,
    download_timeout: Duration,
}

impl ArchiveClient {
    pub fn new(config: &ArchiveConfig) -> Result<Self, ArchiveError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ArchiveError::Url(format!("{}: {}", config.base_url, e)))?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base,
            action_timeout: Duration::from_secs(config.action_timeout_secs),
            download_timeout: Duration::from_secs(config.download_timeout_secs),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ArchiveError> {
        self.base
            .join(path)
            .map_err(|e| ArchiveError::Url(format!("{}: {}", path, e)))
    }

    /// Call one `/action.do` action and return its `data` object.
    ///
    /// A missing `data` field yields `Value::Null`.
    pub async fn request_action(
        &self,
        action_id: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ArchiveError> {
        let param_data = payload.to_string();
        let form = [("actionId", action_id), ("paramData", param_data.as_str())];

        let response = self
            .client
            .post(self.url(ACTION_PATH)?)
            .timeout(self.action_timeout)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        let body: ActionResponse = response.json().await?;
        match body.status.as_deref() {
            Some("SUCCESS") => Ok(body.data.unwrap_or(serde_json::Value::Null)),
            other => Err(ArchiveError::ActionStatus {
                action: action_id.to_string(),
                status: other.unwrap_or("None").to_string(),
            }),
        }
    }

    /// Fetch a case's metadata. `None` when the archive has no such case.
    pub async fn fetch_detail(
        &self,
        case_id: &str,
        group_code: Option<&str>,
    ) -> Result<Option<CaseDetail>, ArchiveError> {
        let mut dcm_dvo = serde_json::json!({ "ntstDcmId": case_id });
        if let Some(group) = group_code.filter(|g| !g.is_empty()) {
            dcm_dvo["ntstDcmGrpCd"] = serde_json::Value::from(group);
        }
        let data = self
            .request_action(DETAIL_ACTION, &serde_json::json!({ "dcmDVO": dcm_dvo }))
            .await?;

        let detail = match data.get(DETAIL_ACTION) {
            Some(value) if !is_empty_value(value) => value.clone(),
            _ => return Ok(None),
        };
        serde_json::from_value(detail)
            .map(Some)
            .map_err(|source| ArchiveError::Payload {
                action: DETAIL_ACTION.to_string(),
                source,
            })
    }

    /// Look up download info for an attachment. `None` when the archive
    /// returns no records.
    pub async fn fetch_file_info(
        &self,
        file_id: &str,
        file_serial: &FileSerial,
    ) -> Result<Option<FileInfo>, ArchiveError> {
        let payload = serde_json::json!({ "fleId": file_id, "fleSn": file_serial });
        let data = self.request_action(FILE_INFO_ACTION, &payload).await?;

        let first = match data.get(FILE_INFO_ACTION).and_then(|v| v.as_array()) {
            Some(items) if !items.is_empty() => items[0].clone(),
            _ => return Ok(None),
        };
        serde_json::from_value(first)
            .map(Some)
            .map_err(|source| ArchiveError::Payload {
                action: FILE_INFO_ACTION.to_string(),
                source,
            })
    }

    /// Download an attachment through the HWP-to-PDF endpoint.
    ///
    /// Returns `Ok(false)` without touching `out_path` when the response is
    /// not a 200, not a PDF, or smaller than `min_kb` KiB.
    pub async fn download_pdf(
        &self,
        file_id: &str,
        file_serial: &FileSerial,
        out_path: &Path,
        min_kb: u64,
    ) -> Result<bool, ArchiveError> {
        let serial = file_serial.to_string();
        let request = self
            .client
            .get(self.url(PDF_DOWNLOAD_PATH)?)
            .query(&[("fleId", file_id), ("fleSn", serial.as_str())]);
        self.save_if_pdf(request, out_path, min_kb).await
    }

    /// Download from a server-supplied URI, resolved against the base URL.
    /// Same acceptance rule as [`download_pdf`](Self::download_pdf).
    pub async fn download_uri(
        &self,
        uri: &str,
        out_path: &Path,
        min_kb: u64,
    ) -> Result<bool, ArchiveError> {
        let request = self.client.get(self.url(uri)?);
        self.save_if_pdf(request, out_path, min_kb).await
    }

    async fn save_if_pdf(
        &self,
        request: reqwest::RequestBuilder,
        out_path: &Path,
        min_kb: u64,
    ) -> Result<bool, ArchiveError> {
        let response = request.timeout(self.download_timeout).send().await?;
        if response.status() != StatusCode::OK {
            tracing::debug!(status = %response.status(), "download rejected");
            return Ok(false);
        }
        let bytes = response.bytes().await?;
        if !looks_like_pdf(&bytes, min_kb * 1024) {
            tracing::debug!(len = bytes.len(), "download is not a usable PDF");
            return Ok(false);
        }
        tokio::fs::write(out_path, &bytes).await?;
        Ok(true)
    }
}

/// `null`, `{}`, `[]`, `""`, `false`, and `0` all mean "nothing here".
fn is_empty_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
    }
}
