//! redthread: a Reddit client focused on comment-thread pagination and lazy
//! expansion of "more comments" placeholders.

pub mod cli;
pub mod client;
pub mod config;
pub mod models;
pub mod operations;
pub mod tree;

pub use tree::{
    CommentEntry, CommentNode, CommentTree, FetchError, FetchedComment, FetchedEntry, FlatEntry,
    MoreComments, ThresholdRule, TreeError,
};
