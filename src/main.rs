use clap::Parser;
use log::error;
use redthread::cli::{Cli, Commands};
use redthread::config::AppConfig;
use redthread::operations::{comments, posts};
use redthread::tree::ThresholdRule;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = AppConfig::load();
    let cli = Cli::parse();

    match cli.command {
        Commands::Comments {
            url,
            limit,
            expand,
            threshold,
            strict,
        } => {
            let options = comments::CommentsOptions {
                url,
                limit: limit.unwrap_or(config.comment_limit),
                expand,
                threshold: threshold.unwrap_or(config.threshold),
                rule: if strict {
                    ThresholdRule::Strict
                } else {
                    ThresholdRule::Inclusive
                },
                user_agent: Some(config.user_agent.clone()),
            };

            if let Err(err) = comments::handle_comments_command(options).await {
                error!("Error fetching comments: {:?}", err);
            }
        }
        Commands::Posts {
            count,
            subreddit,
            brief,
        } => {
            let options = posts::PostsOptions {
                count,
                subreddit,
                brief,
                user_agent: Some(config.user_agent.clone()),
            };

            if let Err(err) = posts::handle_posts_command(options).await {
                error!("Error fetching posts: {:?}", err);
            }
        }
    }
}
