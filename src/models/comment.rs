//! Comment model
//!
//! Comments hang off a post and may reply to another comment of the same
//! post. The `replied_id` foreign key is the single source of truth for
//! the tree edges; `CommentNode` is a query-time view assembled from the
//! flat list, so no live parent/child object graph (and no reference
//! cycle) ever exists in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Comment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: i64,
    /// Display name of the commenter
    pub author: String,
    /// Commenter email
    pub email: String,
    /// Commenter website (optional)
    pub site: Option<String>,
    /// Comment text
    pub body: String,
    /// Whether the blog owner wrote this comment
    pub from_admin: bool,
    /// Whether the owner has reviewed (approved) this comment
    pub reviewed: bool,
    /// Creation timestamp (indexed)
    pub timestamp: DateTime<Utc>,
    /// Post this comment belongs to
    pub post_id: i64,
    /// Parent comment; None for a root comment
    pub replied_id: Option<i64>,
}

impl Comment {
    /// Whether this comment starts a thread rather than replying to one
    pub fn is_root(&self) -> bool {
        self.replied_id.is_none()
    }
}

/// A comment with its replies, for threaded display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentNode {
    /// The comment itself
    #[serde(flatten)]
    pub comment: Comment,
    /// Direct replies, oldest first
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Create a leaf node with no replies
    pub fn new(comment: Comment) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    /// Total number of comments in this subtree, the root included
    pub fn total_count(&self) -> usize {
        1 + self.replies.iter().map(|r| r.total_count()).sum::<usize>()
    }

    /// All ids in this subtree, depth-first, root first
    pub fn subtree_ids(&self) -> Vec<i64> {
        let mut ids = vec![self.comment.id];
        for reply in &self.replies {
            ids.extend(reply.subtree_ids());
        }
        ids
    }
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    /// Post the comment is attached to
    pub post_id: i64,
    /// Parent comment, when replying
    pub replied_id: Option<i64>,
    /// Commenter name (required)
    pub author: String,
    /// Commenter email (required)
    pub email: String,
    /// Commenter website (optional)
    pub site: Option<String>,
    /// Comment text (required)
    pub body: String,
    /// Whether the blog owner is the author
    pub from_admin: bool,
}

impl CreateCommentInput {
    pub fn new(post_id: i64, author: impl Into<String>, email: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            post_id,
            replied_id: None,
            author: author.into(),
            email: email.into(),
            site: None,
            body: body.into(),
            from_admin: false,
        }
    }

    /// Mark as a reply to another comment
    pub fn with_reply_to(mut self, replied_id: i64) -> Self {
        self.replied_id = Some(replied_id);
        self
    }

    /// Set the commenter website
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Mark as written by the blog owner
    pub fn from_admin(mut self) -> Self {
        self.from_admin = true;
        self
    }
}

/// Build a comment tree from a flat list.
///
/// Comments whose parent is not in the list (the parent was filtered out,
/// or the edge is malformed) are surfaced as roots rather than dropped.
/// Siblings keep the order of the input list.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let ids: std::collections::HashSet<i64> = comments.iter().map(|c| c.id).collect();

    // Adjacency map: parent id -> children, in input order
    let mut children_map: HashMap<Option<i64>, Vec<Comment>> = HashMap::new();
    for comment in comments {
        let key = match comment.replied_id {
            Some(parent) if ids.contains(&parent) => Some(parent),
            _ => None,
        };
        children_map.entry(key).or_default().push(comment);
    }

    fn build_subtree(
        parent_id: Option<i64>,
        children_map: &mut HashMap<Option<i64>, Vec<Comment>>,
    ) -> Vec<CommentNode> {
        let Some(children) = children_map.remove(&parent_id) else {
            return Vec::new();
        };

        children
            .into_iter()
            .map(|comment| {
                let replies = build_subtree(Some(comment.id), children_map);
                CommentNode { comment, replies }
            })
            .collect()
    }

    build_subtree(None, &mut children_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(id: i64, post_id: i64, replied_id: Option<i64>) -> Comment {
        Comment {
            id,
            author: format!("author-{}", id),
            email: format!("a{}@example.com", id),
            site: None,
            body: format!("comment {}", id),
            from_admin: false,
            reviewed: true,
            timestamp: Utc::now(),
            post_id,
            replied_id,
        }
    }

    #[test]
    fn test_is_root() {
        assert!(comment(1, 1, None).is_root());
        assert!(!comment(2, 1, Some(1)).is_root());
    }

    #[test]
    fn test_build_comment_tree_empty() {
        assert!(build_comment_tree(Vec::new()).is_empty());
    }

    #[test]
    fn test_build_comment_tree_flat() {
        let tree = build_comment_tree(vec![comment(1, 1, None), comment(2, 1, None)]);

        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|n| n.replies.is_empty()));
    }

    #[test]
    fn test_build_comment_tree_nested() {
        // 1 -> 2 -> 4, 1 -> 3
        let tree = build_comment_tree(vec![
            comment(1, 1, None),
            comment(2, 1, Some(1)),
            comment(3, 1, Some(1)),
            comment(4, 1, Some(2)),
        ]);

        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.comment.id, 1);
        assert_eq!(root.replies.len(), 2);
        assert_eq!(root.replies[0].comment.id, 2);
        assert_eq!(root.replies[0].replies[0].comment.id, 4);
        assert_eq!(root.total_count(), 4);
    }

    #[test]
    fn test_build_comment_tree_missing_parent_becomes_root() {
        // Parent 99 is not in the list; the reply must not vanish
        let tree = build_comment_tree(vec![comment(1, 1, None), comment(2, 1, Some(99))]);

        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_subtree_ids_depth_first() {
        let tree = build_comment_tree(vec![
            comment(1, 1, None),
            comment(2, 1, Some(1)),
            comment(3, 1, Some(2)),
        ]);

        assert_eq!(tree[0].subtree_ids(), vec![1, 2, 3]);
    }
}
