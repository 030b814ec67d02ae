use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::post::PostRecord;

pub const MAX_POST_CHARS: usize = 280;

/// A post being composed, optionally as a reply to another post.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub in_reply_to: Option<u64>,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Draft {
            text: text.into(),
            in_reply_to: None,
        }
    }

    /// Start a reply to `post`, mentioning its author when the handle is known.
    pub fn reply_to(post: &PostRecord) -> Self {
        let text = match &post.author_handle {
            Some(handle) => format!("@{} ", handle),
            None => String::new(),
        };
        Draft {
            text,
            in_reply_to: Some(post.id),
        }
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::EmptyDraft);
        }
        let count = self.char_count();
        if count > MAX_POST_CHARS {
            return Err(Error::DraftTooLong(count));
        }
        Ok(())
    }
}
