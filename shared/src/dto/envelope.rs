//! Response envelope shared by every API endpoint.

use serde::{Deserialize, Serialize};

/// `{success, data, error?}` wrapper around every API payload.
///
/// `success = false` is a failure even when the HTTP status is 2xx.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Unwrap the envelope into its payload or the server-provided error message.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("Response marked successful but carried no data".to_string()),
            (false, _) => Err(self
                .error
                .unwrap_or_else(|| "Request failed without an error message".to_string())),
        }
    }
}
