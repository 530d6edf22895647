use crate::client::{RedditClient, RedditClientError};
use crate::models::comments;
use crate::tree::{CommentEntry, CommentTree, FetchError, ThresholdRule};
use log::{error, info, warn};

/// Configuration options for fetching a submission's comment tree
#[derive(Debug, Clone)]
pub struct CommentsOptions {
    /// Submission URL or bare permalink path
    pub url: String,
    /// Comment limit for the initial fetch
    pub limit: u32,
    /// Expand eligible "more comments" stubs after the initial fetch
    pub expand: bool,
    /// Expansion threshold compared against each stub's omitted count
    pub threshold: u32,
    /// How the threshold comparison is performed
    pub rule: ThresholdRule,
    /// Custom user agent for the Reddit client (optional)
    pub user_agent: Option<String>,
}

impl Default for CommentsOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            limit: 100,
            expand: false,
            threshold: 0,
            rule: ThresholdRule::Inclusive,
            user_agent: None,
        }
    }
}

/// Result of a comments fetch operation
#[derive(Debug)]
pub struct CommentsResult {
    /// Number of materialized comments in the final tree
    pub comment_count: usize,
    /// Eligible stubs left unresolved after expansion (fetch failures)
    pub unresolved: usize,
    /// Formatted output (for CLI display)
    pub formatted_output: String,
}

/// Operation for fetching and expanding a submission's comment tree
pub struct CommentsOperation {
    /// Configuration options for the operation
    options: CommentsOptions,
    /// Reddit client for API interactions
    client: RedditClient,
}

impl CommentsOperation {
    /// Create a new comments operation with the provided options
    pub fn new(options: CommentsOptions) -> Self {
        let client = match &options.user_agent {
            Some(user_agent) => RedditClient::with_user_agent(user_agent.clone()),
            None => RedditClient::new(),
        };

        Self { options, client }
    }

    /// Create a new comments operation with a custom Reddit client
    pub fn with_client(options: CommentsOptions, client: RedditClient) -> Self {
        Self { options, client }
    }

    /// Execute the comments operation
    pub async fn execute(&self) -> Result<CommentsResult, RedditClientError> {
        info!(
            "Fetching up to {} comments for {}",
            self.options.limit, self.options.url
        );

        let fetched = self
            .client
            .fetch_submission_comments(&self.options.url, self.options.limit)
            .await?;

        let mut tree = comments::build_tree(&fetched.comments)?;
        info!(
            "Built comment tree: {} materialized, {} stubs",
            tree.materialized_len(),
            tree.flatten().filter(|e| e.is_more()).count()
        );

        if self.options.expand {
            let link = fetched.submission.fullname();
            // Expansion can surface fresh stubs, so passes repeat until a
            // pass resolves nothing or nothing eligible remains.
            loop {
                let expanded = replace_more_comments(
                    &mut tree,
                    &self.client,
                    &link,
                    self.options.threshold,
                    self.options.rule,
                )
                .await?;
                if !expanded
                    || tree
                        .pending_more(self.options.threshold, self.options.rule)
                        .is_empty()
                {
                    break;
                }
            }
        }

        let unresolved = tree
            .pending_more(self.options.threshold, self.options.rule)
            .len();

        let mut output = format!(
            "{}\n\n",
            fetched.submission.format_summary()
        );
        format_entries(&tree, tree.root(), 0, &mut output);

        Ok(CommentsResult {
            comment_count: tree.materialized_len(),
            unresolved,
            formatted_output: output,
        })
    }
}

/// One live expansion pass: resolve every currently eligible stub through the
/// morechildren endpoint, sequentially in flattened pre-order, splicing each
/// result before the next stub is attempted. A failed fetch leaves its stub
/// in place and the pass continues; returns whether anything was expanded.
pub async fn replace_more_comments(
    tree: &mut CommentTree,
    client: &RedditClient,
    link_fullname: &str,
    threshold: u32,
    rule: ThresholdRule,
) -> Result<bool, RedditClientError> {
    let mut expanded = false;
    for more in tree.pending_more(threshold, rule) {
        // An earlier splice in this pass may have consumed the stub.
        if !tree.contains_more(&more.id) {
            continue;
        }
        match client.fetch_more_children(link_fullname, &more.children).await {
            Ok(things) => {
                let entries = comments::things_entries(&things);
                tree.splice_more(&more.id, entries)?;
                expanded = true;
            }
            Err(err) => {
                let err = FetchError::from(err);
                warn!("leaving placeholder '{}' unresolved: {}", more.id, err);
            }
        }
    }
    Ok(expanded)
}

/// Render the tree as an indented thread, stubs included.
fn format_entries(tree: &CommentTree, entries: &[CommentEntry], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for entry in entries {
        match entry {
            CommentEntry::Comment(id) => {
                if let Some(node) = tree.get(id) {
                    out.push_str(&format!(
                        "{}u/{}: {}\n",
                        indent,
                        node.author,
                        one_line(&node.body)
                    ));
                    format_entries(tree, &node.children, depth + 1, out);
                }
            }
            CommentEntry::More(more) => {
                if more.count > 0 {
                    out.push_str(&format!("{}[{} more comments]\n", indent, more.count));
                } else {
                    out.push_str(&format!("{}[continue this thread]\n", indent));
                }
            }
        }
    }
}

fn one_line(body: &str) -> String {
    let flattened: String = body
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if flattened.chars().count() > 120 {
        let truncated: String = flattened.chars().take(120).collect();
        format!("{}...", truncated)
    } else {
        flattened
    }
}

/// CLI handler function for comments command
pub async fn handle_comments_command(options: CommentsOptions) -> Result<(), RedditClientError> {
    let operation = CommentsOperation::new(options);
    match operation.execute().await {
        Ok(result) => {
            println!("{}", result.formatted_output);
            println!(
                "{} comments materialized, {} stubs unresolved",
                result.comment_count, result.unresolved
            );
            Ok(())
        }
        Err(err) => {
            error!("Error executing comments operation: {:?}", err);
            Err(err)
        }
    }
}

/// CLI handler function for comments command with client
pub async fn handle_comments_command_with_client(
    options: CommentsOptions,
    client: RedditClient,
) -> Result<(), RedditClientError> {
    let operation = CommentsOperation::with_client(options, client);
    match operation.execute().await {
        Ok(result) => {
            println!("{}", result.formatted_output);
            println!(
                "{} comments materialized, {} stubs unresolved",
                result.comment_count, result.unresolved
            );
            Ok(())
        }
        Err(err) => {
            error!("Error executing comments operation: {:?}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{FetchedComment, FetchedEntry, MoreComments};

    fn comment(id: &str, parent: Option<&str>) -> FetchedEntry {
        FetchedEntry::Comment(FetchedComment {
            id: id.to_string(),
            author: format!("u{}", id),
            body: format!("body {}", id),
            parent_id: parent.map(str::to_string),
        })
    }

    #[test]
    fn formats_threads_with_indentation_and_stubs() {
        let tree = CommentTree::build(vec![
            comment("a", None),
            comment("b", Some("a")),
            FetchedEntry::More(MoreComments {
                id: "m".to_string(),
                parent_id: Some("a".to_string()),
                count: 3,
                children: vec!["x".to_string()],
            }),
        ])
        .unwrap();

        let mut out = String::new();
        format_entries(&tree, tree.root(), 0, &mut out);

        assert_eq!(
            out,
            "u/ua: body a\n  u/ub: body b\n  [3 more comments]\n"
        );
    }

    #[test]
    fn long_bodies_are_truncated_to_one_line() {
        let body = format!("first\nsecond {}", "x".repeat(200));
        let line = one_line(&body);
        assert!(!line.contains('\n'));
        assert!(line.ends_with("..."));
        assert_eq!(line.chars().count(), 123);
    }
}
