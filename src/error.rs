use thiserror::Error;

/// Result type for workbench operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while building, sending or interpreting a solve
#[derive(Error, Debug)]
pub enum ClientError {
    /// The solve service could not be reached at all
    #[error("connection failed: {0}")]
    Connection(#[source] reqwest::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The service answered with a non-success status and an error body
    #[error("{0}")]
    Api(String),

    /// Failed to parse a success body
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A present facet of the solution broke its shape contract
    #[error("malformed solve response: {0}")]
    MalformedResponse(String),

    /// The animated artifact was not valid base64
    #[error("invalid animated artifact: {0}")]
    Artifact(#[from] base64::DecodeError),

    /// Method identifier outside the supported catalogue
    #[error("unknown solve method: {0}")]
    UnknownMethod(String),

    /// Reading a problem file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A problem file does not describe a usable model
    #[error("invalid problem: {0}")]
    InvalidProblem(String),
}

impl ClientError {
    /// Text shown on the status line when a solve attempt ends in this error.
    pub fn status_line(&self) -> String {
        match self {
            ClientError::Connection(_) => "Error: connection failed.".to_string(),
            other => format!("Error: {}", other),
        }
    }
}

/// Transport failures become `Connection`; an undecodable body is `Parse`.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Connection(err)
        }
    }
}
