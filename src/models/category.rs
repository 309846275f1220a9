//! Category model
//!
//! Categories classify posts. The name is unique, and exactly one
//! category is flagged as the default. The default is permanent: it is
//! seeded by the migrations and absorbs the posts of any category that
//! gets deleted.

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name (unique)
    pub name: String,
    /// Whether this is the permanent fallback category.
    ///
    /// The default is identified by this flag, never by a well-known id,
    /// so renumbering rows cannot break the fallback lookup.
    pub is_default: bool,
}

impl Category {
    /// Check if this category is the permanent default
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category name (required, unique)
    pub name: String,
}

impl CreateCategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_default() {
        let default = Category {
            id: 7,
            name: "Default".to_string(),
            is_default: true,
        };
        let other = Category {
            id: 8,
            name: "Tech".to_string(),
            is_default: false,
        };

        assert!(default.is_default());
        assert!(!other.is_default());
    }
}
