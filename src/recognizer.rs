use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("plate recognizer unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("plate recognizer answered with status {0}")]
    Status(u16),
}

#[derive(Debug, Deserialize)]
struct RecognizerReply {
    #[serde(default)]
    plate_number: Option<String>,
}

/// Client for the external plate-recognition service.
#[derive(Debug, Clone)]
pub enum PlateRecognizer {
    /// No service configured; every image yields no plate.
    Disabled,
    Remote { client: Client, url: String },
}

impl PlateRecognizer {
    pub fn from_url(url: Option<String>) -> Self {
        match url {
            Some(url) => PlateRecognizer::Remote {
                client: Client::new(),
                url,
            },
            None => PlateRecognizer::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, PlateRecognizer::Remote { .. })
    }

    /// Sends the image to the recognizer and returns the normalized plate,
    /// or `None` when nothing usable was recognized.
    pub async fn recognize(&self, image: Vec<u8>, file_name: &str) -> Result<Option<String>, RecognizerError> {
        let (client, url) = match self {
            PlateRecognizer::Disabled => return Ok(None),
            PlateRecognizer::Remote { client, url } => (client, url),
        };

        let part = Part::bytes(image).file_name(file_name.to_string());
        let response = client
            .post(url)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RecognizerError::Status(response.status().as_u16()));
        }

        let reply: RecognizerReply = response.json().await?;
        debug!(raw = ?reply.plate_number, "recognizer replied");
        Ok(reply.plate_number.as_deref().and_then(normalize_plate))
    }
}

/// Keeps ASCII letters and digits, upper-cased. Empty results become `None`.
pub fn normalize_plate(raw: &str) -> Option<String> {
    let plate: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    (!plate.is_empty()).then_some(plate)
}
