use crate::models::comments::{
    CommentListing, CommentThing, MoreChildrenResponse, SubmissionComments,
};
use crate::models::RedditListingResponse;
use crate::tree::{FetchError, TreeError};
use log::debug;
use reqwest::{Client, Error as ReqwestError};
use std::fmt;
use url::Url;

// Define a custom error type for handling Reddit API errors
#[derive(Debug)]
pub enum RedditClientError {
    RequestError(ReqwestError),
    ApiError(String),
    ParseError(serde_json::Error),
    TreeError(TreeError),
}

impl fmt::Display for RedditClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RedditClientError::RequestError(err) => write!(f, "Request error: {}", err),
            RedditClientError::ApiError(msg) => write!(f, "Reddit API error: {}", msg),
            RedditClientError::ParseError(err) => write!(f, "Parse error: {}", err),
            RedditClientError::TreeError(err) => write!(f, "Comment tree error: {}", err),
        }
    }
}

impl std::error::Error for RedditClientError {}

impl From<ReqwestError> for RedditClientError {
    fn from(err: ReqwestError) -> Self {
        RedditClientError::RequestError(err)
    }
}

impl From<serde_json::Error> for RedditClientError {
    fn from(err: serde_json::Error) -> Self {
        RedditClientError::ParseError(err)
    }
}

impl From<TreeError> for RedditClientError {
    fn from(err: TreeError) -> Self {
        RedditClientError::TreeError(err)
    }
}

// A failed morechildren call degrades to a recoverable per-placeholder error
// at the expansion boundary.
impl From<RedditClientError> for FetchError {
    fn from(err: RedditClientError) -> Self {
        match err {
            RedditClientError::ApiError(msg) if msg.contains("child references") => {
                FetchError::InvalidToken(msg)
            }
            other => FetchError::Upstream(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct RedditClient {
    pub client: Client,
    pub user_agent: String,
}

impl RedditClient {
    pub fn new() -> Self {
        let user_agent = "redthread/0.1 (comment thread client)".to_string();
        Self {
            client: Self::get_client(&user_agent).unwrap(),
            user_agent,
        }
    }

    pub fn with_user_agent(user_agent: String) -> Self {
        Self {
            client: Self::get_client(&user_agent).unwrap(),
            user_agent,
        }
    }

    /// Create a client from a configuration object
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        debug!(
            "Creating RedditClient with user_agent: {}",
            config.user_agent
        );
        Self::with_user_agent(config.user_agent.clone())
    }

    fn get_client(user_agent: &str) -> Result<Client, RedditClientError> {
        Ok(Client::builder().user_agent(user_agent).build()?)
    }

    /// Fetch new posts from a subreddit (public endpoint, no authentication).
    pub async fn fetch_new_posts(
        &self,
        subreddit: &str,
        limit: i32,
    ) -> Result<RedditListingResponse, RedditClientError> {
        let url = format!("https://www.reddit.com/r/{}/new.json?limit={}", subreddit, limit);
        self.fetch_listing(&url).await
    }

    /// Fetch new posts from the public Reddit frontpage
    pub async fn fetch_public_new_posts(
        &self,
        limit: i32,
    ) -> Result<RedditListingResponse, RedditClientError> {
        let url = format!("https://www.reddit.com/new.json?limit={}", limit);
        self.fetch_listing(&url).await
    }

    async fn fetch_listing(&self, url: &str) -> Result<RedditListingResponse, RedditClientError> {
        debug!("Fetching listing URL: {}", url);
        debug!("Using User-Agent: {}", self.user_agent);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(RedditClientError::ApiError(format!(
                "Server returned error status: {}",
                status
            )));
        }

        let body = response.text().await?;
        debug!("Response body length: {} bytes", body.len());

        let parsed = match serde_json::from_str::<RedditListingResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Error parsing listing: {}", e);
                debug!("First 100 chars: {}", &body[..body.len().min(100)]);
                return Err(RedditClientError::ParseError(e));
            }
        };

        debug!(
            "Successfully parsed {} posts from listing",
            parsed.data.children.len()
        );
        Ok(parsed)
    }

    /// Fetch a submission and its partially materialized comment forest.
    ///
    /// # Arguments
    /// * `url` - A full reddit.com submission URL or a bare permalink path
    /// * `limit` - Comment limit for the initial fetch; entries beyond it
    ///   arrive as "more" stubs
    pub async fn fetch_submission_comments(
        &self,
        url: &str,
        limit: u32,
    ) -> Result<SubmissionComments, RedditClientError> {
        let api_url = format!(
            "{}?limit={}&raw_json=1",
            Self::comments_json_url(url)?,
            limit
        );
        debug!("Fetching submission comments from: {}", api_url);

        let response = self.client.get(&api_url).send().await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(RedditClientError::ApiError(format!(
                "Server returned error status: {}",
                status
            )));
        }

        let body = response.text().await?;
        debug!("Response body length: {} bytes", body.len());

        // The comments endpoint returns a two-element array: the submission
        // listing and the comment forest.
        let (submission, comments): (RedditListingResponse, CommentListing) =
            serde_json::from_str(&body)?;

        let submission = submission
            .data
            .children
            .into_iter()
            .next()
            .map(|entity| entity.data)
            .ok_or_else(|| {
                RedditClientError::ApiError("submission listing was empty".to_string())
            })?;

        Ok(SubmissionComments {
            submission,
            comments,
        })
    }

    /// Resolve a "more comments" stub into the flat thing sequence behind it.
    ///
    /// # Arguments
    /// * `link_fullname` - The submission's fullname ("t3_" + id)
    /// * `children` - The stub's child comment ids (reference tokens)
    pub async fn fetch_more_children(
        &self,
        link_fullname: &str,
        children: &[String],
    ) -> Result<Vec<CommentThing>, RedditClientError> {
        if children.is_empty() {
            return Err(RedditClientError::ApiError(
                "placeholder carries no child references".to_string(),
            ));
        }

        let url = format!(
            "https://www.reddit.com/api/morechildren.json?api_type=json&link_id={}&children={}",
            link_fullname,
            children.join(",")
        );
        debug!("Fetching more children from: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(RedditClientError::ApiError(format!(
                "Server returned error status: {}",
                status
            )));
        }

        let parsed: MoreChildrenResponse = response.json().await?;

        if !parsed.json.errors.is_empty() {
            return Err(RedditClientError::ApiError(format!(
                "Reddit API returned an error: {:?}",
                parsed.json.errors
            )));
        }

        Ok(parsed.json.data.map(|data| data.things).unwrap_or_default())
    }

    /// Normalize a submission reference into its `.json` comments URL.
    /// Accepts a full URL or a bare permalink path, with or without a
    /// trailing slash or `.json` suffix.
    fn comments_json_url(url: &str) -> Result<String, RedditClientError> {
        let path = if url.starts_with("http://") || url.starts_with("https://") {
            let parsed = Url::parse(url).map_err(|e| {
                RedditClientError::ApiError(format!("invalid submission URL: {}", e))
            })?;
            parsed.path().to_string()
        } else if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{}", url)
        };

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".json").unwrap_or(path);

        Ok(format!("https://www.reddit.com{}.json", path))
    }
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_submission_urls() {
        let expect = "https://www.reddit.com/r/rust/comments/abc123/some_title.json";
        for input in [
            "https://www.reddit.com/r/rust/comments/abc123/some_title/",
            "https://www.reddit.com/r/rust/comments/abc123/some_title.json",
            "/r/rust/comments/abc123/some_title",
            "r/rust/comments/abc123/some_title/",
        ] {
            assert_eq!(RedditClient::comments_json_url(input).unwrap(), expect);
        }
    }

    #[test]
    fn client_errors_degrade_to_fetch_errors() {
        let err = RedditClientError::ApiError("placeholder carries no child references".into());
        assert!(matches!(FetchError::from(err), FetchError::InvalidToken(_)));

        let err = RedditClientError::ApiError("Server returned error status: 503".into());
        assert!(matches!(FetchError::from(err), FetchError::Upstream(_)));
    }
}
