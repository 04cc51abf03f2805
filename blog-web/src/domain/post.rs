use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub author_id: i64,
}

/// A post joined with its author's display name, as listed and looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub author_id: i64,
    pub username: String,
}

/// Fields submitted by the create and update forms.
#[derive(Debug, Clone, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

impl PostForm {
    pub const TITLE_REQUIRED: &'static str = "Title is required.";

    /// Checks the submitted title. Whitespace is not trimmed, so only an
    /// empty string is rejected.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.is_empty() {
            return Err(Self::TITLE_REQUIRED);
        }
        Ok(())
    }
}

impl PostWithAuthor {
    pub fn from_post(post: Post, username: String) -> Self {
        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            created: post.created,
            author_id: post.author_id,
            username,
        }
    }
}
