use crate::client::{RedditClient, RedditClientError};
use crate::models::RedditListingResponse;
use log::{error, info};

/// Configuration options for fetching posts
#[derive(Debug, Clone)]
pub struct PostsOptions {
    /// The number of posts to retrieve
    pub count: i32,
    /// The name of the subreddit to fetch posts from (None for public frontpage)
    pub subreddit: Option<String>,
    /// Display posts in a brief, one-line format
    pub brief: bool,
    /// Custom user agent for the Reddit client (optional)
    pub user_agent: Option<String>,
}

impl Default for PostsOptions {
    fn default() -> Self {
        Self {
            count: 10,
            subreddit: None,
            brief: false,
            user_agent: None,
        }
    }
}

/// Result of a posts fetch operation
#[derive(Debug)]
pub struct PostsResult {
    /// The number of posts found
    pub post_count: usize,
    /// Formatted output (for CLI display)
    pub formatted_output: String,
    /// The raw API response data
    pub raw_response: RedditListingResponse,
}

/// Operation for fetching posts from Reddit
pub struct PostsOperation {
    /// Configuration options for the operation
    options: PostsOptions,
    /// Reddit client for API interactions
    client: RedditClient,
}

impl PostsOperation {
    /// Create a new posts operation with the provided options
    pub fn new(options: PostsOptions) -> Self {
        let client = match &options.user_agent {
            Some(user_agent) => RedditClient::with_user_agent(user_agent.clone()),
            None => RedditClient::new(),
        };

        Self { options, client }
    }

    /// Create a new posts operation with a custom Reddit client
    pub fn with_client(options: PostsOptions, client: RedditClient) -> Self {
        Self { options, client }
    }

    /// Execute the posts operation
    pub async fn execute(&self) -> Result<PostsResult, RedditClientError> {
        info!(
            "Fetching {} posts from {}",
            self.options.count,
            self.options
                .subreddit
                .as_deref()
                .unwrap_or("public frontpage")
        );

        let posts_result = match &self.options.subreddit {
            Some(sub) => self.client.fetch_new_posts(sub, self.options.count).await,
            None => self.client.fetch_public_new_posts(self.options.count).await,
        }?;

        let mut output = String::new();

        if posts_result.data.children.is_empty() {
            output.push_str("No posts found.\n");
        } else {
            output.push_str(&format!(
                "Found {} posts\n",
                posts_result.data.children.len()
            ));

            for post in &posts_result.data.children {
                if self.options.brief {
                    output.push_str(&format!("{}\n", post.data.format_short_summary()));
                } else {
                    output.push_str(&format!(
                        "\n[{}]\n{}\n",
                        post.data.format_timestamp(),
                        post.data.format_summary()
                    ));
                }
            }
        }

        Ok(PostsResult {
            post_count: posts_result.data.children.len(),
            formatted_output: output,
            raw_response: posts_result,
        })
    }
}

/// CLI handler function for posts command
pub async fn handle_posts_command(options: PostsOptions) -> Result<(), RedditClientError> {
    let operation = PostsOperation::new(options);
    match operation.execute().await {
        Ok(result) => {
            println!("{}", result.formatted_output);
            Ok(())
        }
        Err(err) => {
            error!("Error executing posts operation: {:?}", err);
            Err(err)
        }
    }
}

/// CLI handler function for posts command with client
pub async fn handle_posts_command_with_client(
    options: PostsOptions,
    client: RedditClient,
) -> Result<(), RedditClientError> {
    let operation = PostsOperation::with_client(options, client);
    match operation.execute().await {
        Ok(result) => {
            println!("{}", result.formatted_output);
            Ok(())
        }
        Err(err) => {
            error!("Error executing posts operation: {:?}", err);
            Err(err)
        }
    }
}
