use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Human-readable detail supplied by the endpoint, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Why a submission was dropped without dispatching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("query is empty")]
    EmptyQuery,
    #[error("no document payload provided")]
    MissingDocument,
    #[error("a query is already awaiting an answer")]
    QueryInFlight,
    #[error("an ingestion is already in progress")]
    IngestionInFlight,
}

impl Rejection {
    /// Validation rejections come from bad input; the rest from busy guards.
    pub fn is_validation(self) -> bool {
        matches!(self, Self::EmptyQuery | Self::MissingDocument)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("transcript is empty; nothing to replace")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field} url '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{field} url '{value}' must use http or https")]
    UnsupportedScheme { field: &'static str, value: String },
    #[error("unknown theme '{0}' (expected 'classic' or 'terminal')")]
    UnknownTheme(String),
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
