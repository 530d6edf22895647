use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "redthread",
    version = "0.1",
    about = "Reddit comment-thread client with lazy tree expansion."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Command to fetch a submission's comment tree, optionally expanding
    /// "more comments" stubs in place.
    Comments {
        /// Submission URL or bare permalink path.
        #[arg(help = "Submission URL or permalink", required = true)]
        url: String,

        /// Comment limit for the initial fetch.
        /// Defaults to REDTHREAD_COMMENT_LIMIT or 100.
        #[arg(long, short, help = "Comment limit for the initial fetch")]
        limit: Option<u32>,

        /// Expand eligible stubs until none remain.
        #[arg(long, short, help = "Expand eligible placeholders in place")]
        expand: bool,

        /// Expand stubs whose omitted-comment count is at most this value.
        /// Defaults to REDTHREAD_THRESHOLD or 0.
        #[arg(long, short, help = "Expansion threshold for stub counts")]
        threshold: Option<u32>,

        /// Compare counts strictly (<) instead of inclusively (<=).
        #[arg(long, help = "Use a strict threshold comparison")]
        strict: bool,
    },

    /// Command to fetch posts from a subreddit or the public frontpage.
    Posts {
        /// The number of posts to retrieve.
        #[arg(long, short, help = "Number of posts to retrieve", required = true)]
        count: i32,

        /// The name of the subreddit to fetch posts from.
        /// If not provided, posts from the public Reddit frontpage will be retrieved.
        #[arg(long, short, help = "Subreddit name (optional)", required = false)]
        subreddit: Option<String>,

        /// Display posts in a brief, one-line format.
        #[arg(
            long,
            short,
            help = "Show posts in a brief one-line format",
            required = false
        )]
        brief: bool,
    },
}
