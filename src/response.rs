use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{CoursewareError, Result};

/// Successful outcome of [`CoursewareClient::execute`](crate::CoursewareClient::execute).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code (2xx).
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Retries performed before this response arrived.
    pub retries: u32,
}

impl ApiResponse {
    /// Deserializes the whole body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            CoursewareError::Decode(format!("invalid response JSON: {err}; body: {}", self.body))
        })
    }

    /// Deserializes the body as a `{ success, data, message? }` envelope.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<Envelope<T>> {
        self.json()
    }

    /// Returns the envelope's `data`.
    ///
    /// Fails with [`CoursewareError::Decode`] when the backend reports
    /// `success: false` on a 2xx response.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        let envelope = self.envelope::<T>()?;
        if !envelope.success {
            return Err(CoursewareError::Decode(format!(
                "envelope reported failure: {}",
                envelope.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(envelope.data)
    }
}

/// Backend success envelope.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend failure body. Every field is optional so that non-conforming
/// bodies (proxies, HTML error pages) still parse.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FailureBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl FailureBody {
    pub(crate) fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}
