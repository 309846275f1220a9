//! Link model

use serde::{Deserialize, Serialize};

/// An entry in the blogroll. Links relate to nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Unique identifier
    pub id: i64,
    /// Link caption
    pub name: String,
    /// Target URL
    pub url: String,
}

/// Input for creating a link
#[derive(Debug, Clone)]
pub struct CreateLinkInput {
    /// Link caption (required)
    pub name: String,
    /// Target URL (required)
    pub url: String,
}

impl CreateLinkInput {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Input for updating a link
#[derive(Debug, Clone, Default)]
pub struct UpdateLinkInput {
    /// New caption (optional)
    pub name: Option<String>,
    /// New URL (optional)
    pub url: Option<String>,
}

impl UpdateLinkInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the caption
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
