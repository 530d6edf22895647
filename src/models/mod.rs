use serde::Deserialize;
use std::collections::HashMap;

pub mod comments;

/// Top-level response for Reddit post listings
#[derive(Deserialize, Debug)]
pub struct RedditListingResponse {
    pub kind: String,
    pub data: RedditListingData,
}

/// Collection of posts in a listing
#[derive(Deserialize, Debug)]
pub struct RedditListingData {
    pub after: Option<String>,
    #[serde(default)]
    pub dist: i32,
    pub children: Vec<RedditPostEntity>,
    pub before: Option<String>,
}

/// Reddit post entity with kind and data fields
#[derive(Deserialize, Debug)]
pub struct RedditPostEntity {
    pub kind: String,
    pub data: RedditPostData,
}

/// A forgiving post data model; most fields default so the same type decodes
/// both listing endpoints and the submission half of a comments response.
#[derive(Deserialize, Debug)]
pub struct RedditPostData {
    pub id: String,
    /// Fullname ("t3_" + id). Absent in some listing shapes.
    #[serde(default)]
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub url: String,
    pub created_utc: f64,

    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub selftext: String,

    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub upvote_ratio: f32,
    #[serde(default)]
    pub num_comments: i32,

    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub locked: bool,

    pub link_flair_text: Option<String>,

    // Additional fields we don't explicitly model
    #[serde(flatten)]
    pub additional_fields: HashMap<String, serde_json::Value>,
}

impl RedditPostData {
    /// The submission's fullname, derived from the id when the listing did
    /// not carry one.
    pub fn fullname(&self) -> String {
        if self.name.is_empty() {
            format!("t3_{}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Format a post for display with important metadata
    pub fn format_summary(&self) -> String {
        let mut content = format!(
            "Title: {}\nAuthor: u/{}\nSubreddit: r/{}\nScore: {} ({}% upvoted) | Comments: {}\n",
            self.title,
            self.author,
            self.subreddit,
            self.score,
            (self.upvote_ratio * 100.0) as i32,
            self.num_comments,
        );

        let mut flags = Vec::new();
        if self.is_self {
            flags.push("Self Post");
        }
        if self.over_18 {
            flags.push("NSFW");
        }
        if self.stickied {
            flags.push("Stickied");
        }
        if self.locked {
            flags.push("Locked");
        }
        if !flags.is_empty() {
            content.push_str(&format!("Flags: [{}]\n", flags.join(", ")));
        }

        if let Some(flair) = &self.link_flair_text {
            if !flair.is_empty() {
                content.push_str(&format!("Flair: {}\n", flair));
            }
        }

        content.push_str(&format!("Permalink: https://reddit.com{}", self.permalink));

        content
    }

    /// Get a short summary for the post (title, author, score)
    pub fn format_short_summary(&self) -> String {
        format!(
            "[r/{} | {} pts] {} - by u/{}",
            self.subreddit, self.score, self.title, self.author
        )
    }

    /// Format timestamp as a human-readable string
    pub fn format_timestamp(&self) -> String {
        use chrono::{TimeZone, Utc};

        let timestamp = Utc
            .timestamp_opt(self.created_utc as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);

        timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}
