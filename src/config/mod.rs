//! Configuration module for handling environment variables and .env files

use dotenv::dotenv;
use log::info;
use std::env;

/// Application configuration derived from environment variables and .env file
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// User agent sent with every request
    pub user_agent: String,
    /// Default comment limit for the initial submission fetch
    pub comment_limit: u32,
    /// Default expansion threshold for "more comments" stubs
    pub threshold: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "redthread/0.1 (comment thread client)".to_string(),
            comment_limit: 100,
            threshold: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn load() -> Self {
        // Try to load .env file, but continue even if it doesn't exist
        match dotenv() {
            Ok(_) => info!("Loaded environment from .env file"),
            Err(_) => info!("No .env file found, using system environment variables only"),
        }

        let mut config = Self::default();

        if let Ok(user_agent) = env::var("REDTHREAD_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(limit) = env::var("REDTHREAD_COMMENT_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.comment_limit = limit;
            }
        }

        if let Ok(threshold) = env::var("REDTHREAD_THRESHOLD") {
            if let Ok(threshold) = threshold.parse() {
                config.threshold = threshold;
            }
        }

        info!(
            "Configuration loaded: user_agent={}, comment_limit={}, threshold={}",
            config.user_agent, config.comment_limit, config.threshold
        );

        config
    }
}
