use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire format of every timestamp the service writes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Plate text stored when the recognizer finds nothing.
pub const PLATE_NOT_DETECTED: &str = "Not detected";

pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Authorized,
    Unauthorized,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Authorized => "Authorized",
            Status::Unauthorized => "Unauthorized",
        }
    }

    /// Row style for a stored status value. Anything but the exact string
    /// `Authorized` is styled as unauthorized.
    pub fn css_class(status: &str) -> &'static str {
        if status == Status::Authorized.as_str() {
            "authorized"
        } else {
            "unauthorized"
        }
    }
}

/// One car-log document as read back from the store.
///
/// Text submissions share the collection, so every field but the id may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub plate_number: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub plate_number: String,
    pub status: Status,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct TextSubmission {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextResponse {
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeLinks {
    pub upload: String,
    pub dashboard: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub message: String,
    pub links: HomeLinks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub collections: BTreeMap<String, usize>,
}
