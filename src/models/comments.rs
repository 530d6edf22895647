//! Wire models for Reddit comment listings and the decoder that turns them
//! into the variant sequence consumed by [`crate::tree`].
//!
//! Reddit tags every entry in a comment forest with a `kind`: `t1` for a
//! materialized comment, `more` for a continuation stub carrying the ids of
//! omitted children. Parent linkage on the wire uses fullnames ("t1_" or
//! "t3_" prefixed); the decoder strips the prefix and maps submission-level
//! parents to None.

use serde::Deserialize;

use crate::models::RedditPostData;
use crate::tree::{CommentTree, FetchedComment, FetchedEntry, MoreComments, TreeError};

/// Listing envelope around a sequence of comment things.
#[derive(Deserialize, Debug)]
pub struct CommentListing {
    pub kind: String,
    pub data: CommentListingData,
}

#[derive(Deserialize, Debug)]
pub struct CommentListingData {
    pub after: Option<String>,
    pub before: Option<String>,
    pub children: Vec<CommentThing>,
}

/// The `t1`/`more` tagged union, matched explicitly everywhere it is
/// consumed.
#[derive(Deserialize, Debug)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
    #[serde(rename = "t1")]
    Comment(CommentData),
    #[serde(rename = "more")]
    More(MoreData),
}

/// A materialized comment as it appears on the wire.
#[derive(Deserialize, Debug)]
pub struct CommentData {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    /// Fullname of the parent thing: "t1_..." for a comment, "t3_..." for
    /// the submission itself.
    pub parent_id: String,
    #[serde(default)]
    pub replies: Replies,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub created_utc: f64,
}

/// Reddit sends an empty string instead of a listing when a comment has no
/// replies.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Replies {
    Listing(Box<CommentListing>),
    Empty(String),
}

impl Default for Replies {
    fn default() -> Self {
        Replies::Empty(String::new())
    }
}

/// A continuation stub as it appears on the wire.
#[derive(Deserialize, Debug)]
pub struct MoreData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub parent_id: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Envelope of `/api/morechildren.json?api_type=json`.
#[derive(Deserialize, Debug)]
pub struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Deserialize, Debug)]
pub struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    pub data: Option<MoreChildrenData>,
}

#[derive(Deserialize, Debug)]
pub struct MoreChildrenData {
    pub things: Vec<CommentThing>,
}

/// The decoded halves of a `{permalink}.json` response: the submission plus
/// its comment forest.
#[derive(Debug)]
pub struct SubmissionComments {
    pub submission: RedditPostData,
    pub comments: CommentListing,
}

/// Strip the type prefix from a fullname ("t1_abc" -> "abc").
fn local_id(fullname: &str) -> &str {
    fullname.splitn(2, '_').nth(1).unwrap_or(fullname)
}

/// Map a wire parent fullname to a tree parent id. Top-level things hang off
/// the submission ("t3_" parent), which is the tree root.
fn tree_parent(parent_fullname: &str) -> Option<String> {
    if parent_fullname.starts_with("t1_") {
        Some(local_id(parent_fullname).to_string())
    } else {
        None
    }
}

fn to_more(more: &MoreData) -> MoreComments {
    MoreComments {
        id: more.id.clone(),
        parent_id: tree_parent(&more.parent_id),
        count: more.count,
        children: more.children.clone(),
    }
}

fn push_thing(thing: &CommentThing, out: &mut Vec<FetchedEntry>) {
    match thing {
        CommentThing::Comment(comment) => {
            out.push(FetchedEntry::Comment(FetchedComment {
                id: comment.id.clone(),
                author: comment.author.clone(),
                body: comment.body.clone(),
                parent_id: tree_parent(&comment.parent_id),
            }));
            if let Replies::Listing(replies) = &comment.replies {
                for child in &replies.data.children {
                    push_thing(child, out);
                }
            }
        }
        CommentThing::More(more) => out.push(FetchedEntry::More(to_more(more))),
    }
}

/// Flatten a nested comment listing into pre-order fetched entries, parents
/// before children, exactly the order [`CommentTree::build`] expects.
pub fn listing_entries(listing: &CommentListing) -> Vec<FetchedEntry> {
    let mut out = Vec::new();
    for thing in &listing.data.children {
        push_thing(thing, &mut out);
    }
    out
}

/// Decode a flat `morechildren` thing sequence into fetched entries ready
/// for splicing.
pub fn things_entries(things: &[CommentThing]) -> Vec<FetchedEntry> {
    let mut out = Vec::new();
    for thing in things {
        push_thing(thing, &mut out);
    }
    out
}

/// Build a comment tree from a decoded listing.
pub fn build_tree(listing: &CommentListing) -> Result<CommentTree, TreeError> {
    CommentTree::build(listing_entries(listing))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREST: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": null,
            "before": null,
            "children": [
                {
                    "kind": "t1",
                    "data": {
                        "id": "c1",
                        "author": "alice",
                        "body": "top comment",
                        "parent_id": "t3_link1",
                        "replies": {
                            "kind": "Listing",
                            "data": {
                                "after": null,
                                "before": null,
                                "children": [
                                    {
                                        "kind": "t1",
                                        "data": {
                                            "id": "c2",
                                            "author": "bob",
                                            "body": "reply",
                                            "parent_id": "t1_c1",
                                            "replies": ""
                                        }
                                    },
                                    {
                                        "kind": "more",
                                        "data": {
                                            "id": "m1",
                                            "name": "t1_m1",
                                            "parent_id": "t1_c1",
                                            "count": 4,
                                            "children": ["c3", "c4"]
                                        }
                                    }
                                ]
                            }
                        }
                    }
                },
                {
                    "kind": "more",
                    "data": {
                        "id": "m2",
                        "name": "t1_m2",
                        "parent_id": "t3_link1",
                        "count": 0,
                        "children": []
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn decodes_tagged_things_and_empty_replies() {
        let listing: CommentListing = serde_json::from_str(FOREST).unwrap();
        assert_eq!(listing.data.children.len(), 2);

        match &listing.data.children[0] {
            CommentThing::Comment(comment) => {
                assert_eq!(comment.id, "c1");
                match &comment.replies {
                    Replies::Listing(replies) => assert_eq!(replies.data.children.len(), 2),
                    Replies::Empty(_) => panic!("expected nested replies"),
                }
            }
            CommentThing::More(_) => panic!("expected a comment first"),
        }

        match &listing.data.children[1] {
            CommentThing::More(more) => {
                assert_eq!(more.id, "m2");
                assert_eq!(more.count, 0);
            }
            CommentThing::Comment(_) => panic!("expected a stub second"),
        }
    }

    #[test]
    fn listing_entries_are_preorder_with_resolved_parents() {
        let listing: CommentListing = serde_json::from_str(FOREST).unwrap();
        let entries = listing_entries(&listing);

        let ids: Vec<&str> = entries
            .iter()
            .map(|entry| match entry {
                FetchedEntry::Comment(c) => c.id.as_str(),
                FetchedEntry::More(m) => m.id.as_str(),
            })
            .collect();
        assert_eq!(ids, vec!["c1", "c2", "m1", "m2"]);

        match &entries[0] {
            FetchedEntry::Comment(c) => assert_eq!(c.parent_id, None),
            other => panic!("expected comment, got {:?}", other),
        }
        match &entries[1] {
            FetchedEntry::Comment(c) => assert_eq!(c.parent_id.as_deref(), Some("c1")),
            other => panic!("expected comment, got {:?}", other),
        }
        match &entries[2] {
            FetchedEntry::More(m) => {
                assert_eq!(m.parent_id.as_deref(), Some("c1"));
                assert_eq!(m.count, 4);
                assert_eq!(m.children, vec!["c3".to_string(), "c4".to_string()]);
            }
            other => panic!("expected stub, got {:?}", other),
        }
    }

    #[test]
    fn build_tree_indexes_materialized_comments_only() {
        let listing: CommentListing = serde_json::from_str(FOREST).unwrap();
        let tree = build_tree(&listing).unwrap();

        assert_eq!(tree.materialized_len(), 2);
        assert!(tree.get("c1").is_some());
        assert!(tree.get("c2").is_some());
        assert!(tree.get("m1").is_none());

        let flat: Vec<String> = tree.flatten().map(|e| e.id().to_string()).collect();
        assert_eq!(flat, vec!["c1", "c2", "m1", "m2"]);
    }

    #[test]
    fn decodes_morechildren_envelope() {
        let raw = r#"{
            "json": {
                "errors": [],
                "data": {
                    "things": [
                        {
                            "kind": "t1",
                            "data": {
                                "id": "c3",
                                "author": "carol",
                                "body": "late reply",
                                "parent_id": "t1_c1",
                                "replies": ""
                            }
                        }
                    ]
                }
            }
        }"#;

        let parsed: MoreChildrenResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.json.errors.is_empty());
        let things = parsed.json.data.unwrap().things;
        let entries = things_entries(&things);
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            FetchedEntry::Comment(c) => {
                assert_eq!(c.id, "c3");
                assert_eq!(c.parent_id.as_deref(), Some("c1"));
            }
            other => panic!("expected comment, got {:?}", other),
        }
    }
}
