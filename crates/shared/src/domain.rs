use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(EntryId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    System,
}

/// One transcript item. Content is fixed once the entry exists; resolving a
/// pending placeholder produces a new entry rather than editing this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub is_pending: bool,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn user(id: EntryId, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content, false)
    }

    pub fn system(id: EntryId, content: impl Into<String>) -> Self {
        Self::new(id, Role::System, content, false)
    }

    pub fn placeholder(id: EntryId, content: impl Into<String>) -> Self {
        Self::new(id, Role::System, content, true)
    }

    fn new(id: EntryId, role: Role, content: impl Into<String>, is_pending: bool) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            is_pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_file_name: Option<String>,
    pub is_uploading: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub is_awaiting_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_query_text: Option<String>,
}
