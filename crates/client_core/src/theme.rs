//! User-visible copy for the two deployments of the chat client.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Classic,
    Terminal,
}

impl Theme {
    pub fn title(self) -> &'static str {
        match self {
            Self::Classic => "SimpleRAG",
            Self::Terminal => "NEXUS_RAG",
        }
    }

    pub fn greeting(self) -> &'static str {
        match self {
            Self::Classic => "Hello! Upload a PDF to start chatting.",
            Self::Terminal => "System Online. Upload data stream for analysis.",
        }
    }

    pub fn ingest_succeeded(self, file_name: &str) -> String {
        match self {
            Self::Classic => {
                format!("Successfully indexed: {file_name}. Ask me anything about it!")
            }
            Self::Terminal => format!("Data acknowledged: {file_name}. Ready for queries."),
        }
    }

    pub fn ingest_failed(self, file_name: &str) -> String {
        match self {
            Self::Classic => {
                format!("Failed to upload/index {file_name}. Please try again.")
            }
            Self::Terminal => format!("ERROR: Upload sequence failed for {file_name}."),
        }
    }

    /// Failure text for a query, preferring the endpoint's own detail.
    pub fn query_failed(self, detail: Option<&str>) -> String {
        match (self, detail) {
            (Self::Classic, Some(detail)) => format!("Error: {detail}"),
            (Self::Classic, None) => "Error: Something went wrong.".to_string(),
            (Self::Terminal, Some(detail)) => format!("ERROR: {detail}"),
            (Self::Terminal, None) => "ERROR: Connection interrupted.".to_string(),
        }
    }

    pub fn pending_indicator(self) -> &'static str {
        match self {
            Self::Classic => "Thinking...",
            Self::Terminal => "PROCESSING...",
        }
    }

    pub fn uploading_indicator(self) -> &'static str {
        match self {
            Self::Classic => "Indexing...",
            Self::Terminal => "UPLOADING...",
        }
    }

    pub fn user_label(self) -> &'static str {
        match self {
            Self::Classic => "You",
            Self::Terminal => "USER",
        }
    }

    pub fn system_label(self) -> &'static str {
        match self {
            Self::Classic => "Bot",
            Self::Terminal => "NEXUS",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Classic => "classic",
            Self::Terminal => "terminal",
        })
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Ok(Self::Classic),
            "terminal" | "nexus" => Ok(Self::Terminal),
            other => Err(ConfigError::UnknownTheme(other.to_string())),
        }
    }
}
