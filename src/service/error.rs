use std::io;

/// Errors raised by the mesh management service client.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Request to the mesh service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mesh service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unable to decode the mesh service response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Invalid mesh service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("Unable to write downloaded content: {0}")]
    Io(#[from] io::Error),
}

impl ServiceError {
    /// HTTP status of a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
