// Comment records collected during a harvest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a record is a top-level comment or a reply in its thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    TopLevel,
    Reply,
}

impl CommentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentKind::TopLevel => "top_level",
            CommentKind::Reply => "reply",
        }
    }
}

/// One comment as returned by the platform.
///
/// `text` is the platform's display text and may contain markup.
/// `parent_id` is set only for replies and points at the platform id of the
/// top-level comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub author: String,
    pub text: String,
    pub like_count: u64,
    pub published_at: DateTime<Utc>,
    pub kind: CommentKind,
    pub parent_id: Option<String>,
}

impl CommentRecord {
    pub fn top_level(
        id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        like_count: u64,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            text: text.into(),
            like_count,
            published_at,
            kind: CommentKind::TopLevel,
            parent_id: None,
        }
    }

    pub fn reply(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        like_count: u64,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            text: text.into(),
            like_count,
            published_at,
            kind: CommentKind::Reply,
            parent_id: Some(parent_id.into()),
        }
    }

    pub fn is_reply(&self) -> bool {
        self.kind == CommentKind::Reply
    }
}

/// Count the reply records attached to `parent_id`
pub fn count_replies(records: &[CommentRecord], parent_id: &str) -> usize {
    records
        .iter()
        .filter(|r| r.is_reply() && r.parent_id.as_deref() == Some(parent_id))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reply_carries_parent() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let top = CommentRecord::top_level("c1", "alice", "hello", 3, at);
        let reply = CommentRecord::reply("c1.r1", "c1", "bob", "hi", 0, at);

        assert_eq!(top.parent_id, None);
        assert!(!top.is_reply());
        assert_eq!(reply.parent_id.as_deref(), Some("c1"));
        assert_eq!(count_replies(&[top, reply], "c1"), 1);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&CommentKind::TopLevel).unwrap(), "\"top_level\"");
        assert_eq!(CommentKind::Reply.as_str(), "reply");
    }
}
