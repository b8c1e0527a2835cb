//! Response contract of the file upload endpoint
//!
//! The endpoint pins a multipart upload to IPFS and answers
//! `{"success": true, "url": "..."}` or, with a non-2xx status,
//! `{"error": "..."}`. The URL goes into `image` or `metadataUri`
//! unchanged.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Body returned by the upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Uploaded { success: bool, url: String },
    Rejected { error: String },
}

impl UploadResponse {
    /// Parse a JSON response body
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// The stored URL, or the endpoint's error message
    pub fn into_url(self) -> Result<String> {
        match self {
            UploadResponse::Uploaded { success: true, url } => Ok(url),
            UploadResponse::Uploaded { success: false, .. } => {
                Err(Error::Upload("endpoint reported failure".to_string()))
            }
            UploadResponse::Rejected { error } => Err(Error::Upload(error)),
        }
    }
}
