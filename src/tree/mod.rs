//! Comment tree with lazy expansion of "more comments" placeholders.
//!
//! Reddit returns a submission's comment forest partially materialized:
//! wherever the listing was truncated there is a `more` stub carrying the ids
//! of the omitted children. This module holds that forest as an arena of
//! nodes keyed by comment id, with parent/child relationships stored as id
//! references so the graph has no ownership cycles. Placeholders are spliced
//! out and replaced by their fetched content on expansion.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How a placeholder's omitted-children count is compared against the
/// expansion threshold. A count of zero ("continue this thread", exact count
/// unknown) is eligible under either rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdRule {
    /// Expand placeholders with `count <= threshold`.
    Inclusive,
    /// Expand placeholders with `count < threshold`.
    Strict,
}

impl ThresholdRule {
    /// Whether a placeholder with `count` omitted children is eligible for
    /// expansion at the given threshold.
    pub fn admits(self, count: u32, threshold: u32) -> bool {
        count == 0
            || match self {
                ThresholdRule::Inclusive => count <= threshold,
                ThresholdRule::Strict => count < threshold,
            }
    }
}

impl Default for ThresholdRule {
    fn default() -> Self {
        ThresholdRule::Inclusive
    }
}

/// A stub standing in for an unfetched batch of descendant comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreComments {
    /// Identifier of the stub itself.
    pub id: String,
    /// Id of the comment this stub hangs under, or None at top level.
    pub parent_id: Option<String>,
    /// Number of comments the stub represents. Zero means the count is
    /// unknown ("continue this thread").
    pub count: u32,
    /// Reference tokens (child comment ids) used to fetch the omitted
    /// subtree.
    pub children: Vec<String>,
}

/// A materialized comment. Owned by the tree's arena; `children` holds id
/// references and inline placeholders, never owned subtrees.
#[derive(Debug, Clone)]
pub struct CommentNode {
    pub id: String,
    pub author: String,
    pub body: String,
    /// None for a top-level comment.
    pub parent_id: Option<String>,
    pub children: Vec<CommentEntry>,
}

/// One slot in a node's (or the root's) ordered child sequence.
#[derive(Debug, Clone)]
pub enum CommentEntry {
    /// A materialized comment, by arena key.
    Comment(String),
    /// An unexpanded continuation stub, stored inline.
    More(MoreComments),
}

/// A comment as produced by the response decoder, before it is attached to a
/// tree. Parent linkage is by id; the decoder emits batches in an order where
/// every parent precedes its children.
#[derive(Debug, Clone)]
pub struct FetchedComment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub parent_id: Option<String>,
}

/// Decoder output: the variant sequence consumed when building a tree or
/// splicing an expansion result.
#[derive(Debug, Clone)]
pub enum FetchedEntry {
    Comment(FetchedComment),
    More(MoreComments),
}

impl FetchedEntry {
    fn id(&self) -> &str {
        match self {
            FetchedEntry::Comment(c) => &c.id,
            FetchedEntry::More(m) => &m.id,
        }
    }

    fn parent_id(&self) -> Option<&str> {
        match self {
            FetchedEntry::Comment(c) => c.parent_id.as_deref(),
            FetchedEntry::More(m) => m.parent_id.as_deref(),
        }
    }
}

/// Failure to resolve a single placeholder's reference tokens. Recovered per
/// placeholder: the stub stays in the tree and the expansion pass moves on.
#[derive(Debug)]
pub enum FetchError {
    /// The reference tokens were rejected as invalid or expired.
    InvalidToken(String),
    /// The upstream collaborator reported an error.
    Upstream(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::InvalidToken(msg) => write!(f, "invalid continuation token: {}", msg),
            FetchError::Upstream(msg) => write!(f, "upstream fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Fatal tree-consistency violations. Unlike `FetchError` these are not
/// recovered; they signal a broken collaborator contract.
#[derive(Debug, PartialEq, Eq)]
pub enum TreeError {
    /// No placeholder with the given id is present in the tree.
    MoreNotFound(String),
    /// A fetched entry references a parent that is neither in the tree nor
    /// earlier in the same batch.
    InconsistentTree { child: String, parent: String },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TreeError::MoreNotFound(id) => {
                write!(f, "no placeholder with id '{}' in tree", id)
            }
            TreeError::InconsistentTree { child, parent } => {
                write!(
                    f,
                    "fetched entry '{}' references unknown parent '{}'",
                    child, parent
                )
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// An item yielded by [`CommentTree::flatten`].
#[derive(Debug, Clone, Copy)]
pub enum FlatEntry<'a> {
    Comment(&'a CommentNode),
    More(&'a MoreComments),
}

impl<'a> FlatEntry<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            FlatEntry::Comment(node) => &node.id,
            FlatEntry::More(more) => &more.id,
        }
    }

    pub fn is_more(&self) -> bool {
        matches!(self, FlatEntry::More(_))
    }
}

/// A submission's comment forest: top-level entry sequence plus an arena
/// indexing every materialized comment by id.
///
/// Invariant: every id in the arena corresponds to exactly one node reachable
/// from the root, so `materialized_len()` always equals the number of
/// comment entries in the flattened sequence.
#[derive(Debug, Default)]
pub struct CommentTree {
    root: Vec<CommentEntry>,
    nodes: HashMap<String, CommentNode>,
}

impl CommentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a decoded comment listing. Entries must arrive in
    /// pre-order (parents before children), which is how the decoder emits
    /// them; an entry whose parent is unknown is a contract violation.
    pub fn build(entries: Vec<FetchedEntry>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        let slot = tree.root.len();
        tree.merge(entries, None, slot)?;
        Ok(tree)
    }

    /// O(1) lookup of a materialized comment.
    pub fn get(&self, id: &str) -> Option<&CommentNode> {
        self.nodes.get(id)
    }

    /// Number of materialized comments in the arena.
    pub fn materialized_len(&self) -> usize {
        self.nodes.len()
    }

    /// The top-level entry sequence.
    pub fn root(&self) -> &[CommentEntry] {
        &self.root
    }

    /// Whether a placeholder with this id is still present in the tree.
    pub fn contains_more(&self, more_id: &str) -> bool {
        self.locate_more(more_id).is_some()
    }

    /// Lazy depth-first pre-order traversal of every entry, comments and
    /// placeholders alike. Children are visited in stored order before the
    /// next sibling. Restartable: repeated calls over an unmodified tree
    /// yield the same sequence.
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten {
            tree: self,
            stack: vec![self.root.iter()],
        }
    }

    /// Pre-order snapshot of the placeholders currently eligible for
    /// expansion at the given threshold.
    pub fn pending_more(&self, threshold: u32, rule: ThresholdRule) -> Vec<MoreComments> {
        self.flatten()
            .filter_map(|entry| match entry {
                FlatEntry::More(more) if rule.admits(more.count, threshold) => Some(more.clone()),
                _ => None,
            })
            .collect()
    }

    /// Expand every eligible placeholder with the supplied fetch callback.
    ///
    /// Placeholders are processed sequentially in flattened pre-order; each
    /// result is spliced before the next placeholder is attempted, so the
    /// tree is consistent at every step. A `FetchError` for one placeholder
    /// leaves that stub untouched and the pass continues. Returns whether at
    /// least one placeholder was expanded.
    pub fn replace_more<F>(
        &mut self,
        threshold: u32,
        rule: ThresholdRule,
        mut fetch: F,
    ) -> Result<bool, TreeError>
    where
        F: FnMut(&MoreComments) -> Result<Vec<FetchedEntry>, FetchError>,
    {
        let mut expanded = false;
        for more in self.pending_more(threshold, rule) {
            // An earlier splice in this pass may have consumed the stub.
            if self.locate_more(&more.id).is_none() {
                continue;
            }
            match fetch(&more) {
                Ok(entries) => {
                    self.splice_more(&more.id, entries)?;
                    expanded = true;
                }
                Err(err) => {
                    warn!("leaving placeholder '{}' unresolved: {}", more.id, err);
                }
            }
        }
        Ok(expanded)
    }

    /// Replace the placeholder `more_id` with a fetched entry batch.
    ///
    /// Entries whose parent is the placeholder's parent take the
    /// placeholder's position, in batch order; deeper entries are appended to
    /// their named parent's child sequence. Every parent reference is
    /// validated before the tree is touched, so a failing splice leaves the
    /// tree unmodified. A fetched comment whose id is already materialized is
    /// dropped rather than re-inserted.
    pub fn splice_more(
        &mut self,
        more_id: &str,
        entries: Vec<FetchedEntry>,
    ) -> Result<(), TreeError> {
        let (slot_parent, slot_index) = self
            .locate_more(more_id)
            .ok_or_else(|| TreeError::MoreNotFound(more_id.to_string()))?;
        self.merge_checked(entries, slot_parent, slot_index, true)
    }

    fn merge(
        &mut self,
        entries: Vec<FetchedEntry>,
        slot_parent: Option<String>,
        slot_index: usize,
    ) -> Result<(), TreeError> {
        self.merge_checked(entries, slot_parent, slot_index, false)
    }

    fn merge_checked(
        &mut self,
        entries: Vec<FetchedEntry>,
        slot_parent: Option<String>,
        slot_index: usize,
        remove_slot: bool,
    ) -> Result<(), TreeError> {
        // Validate every parent reference before mutating anything.
        {
            let mut batch_ids: HashSet<&str> = HashSet::new();
            for entry in &entries {
                if let Some(parent) = entry.parent_id() {
                    if !self.nodes.contains_key(parent) && !batch_ids.contains(parent) {
                        return Err(TreeError::InconsistentTree {
                            child: entry.id().to_string(),
                            parent: parent.to_string(),
                        });
                    }
                }
                if let FetchedEntry::Comment(c) = entry {
                    batch_ids.insert(&c.id);
                }
            }
        }

        let mut slot_index = slot_index;
        if remove_slot {
            self.children_mut(slot_parent.as_deref()).remove(slot_index);
        }

        for entry in entries {
            let in_slot = entry.parent_id() == slot_parent.as_deref();
            match entry {
                FetchedEntry::Comment(fetched) => {
                    if self.nodes.contains_key(&fetched.id) {
                        debug!("dropping already-materialized comment '{}'", fetched.id);
                        continue;
                    }
                    let node = CommentNode {
                        id: fetched.id.clone(),
                        author: fetched.author,
                        body: fetched.body,
                        parent_id: fetched.parent_id.clone(),
                        children: Vec::new(),
                    };
                    let slot = CommentEntry::Comment(fetched.id);
                    self.nodes.insert(node.id.clone(), node);
                    if in_slot {
                        self.children_mut(slot_parent.as_deref())
                            .insert(slot_index, slot);
                        slot_index += 1;
                    } else if let Some(parent) = entry_parent(&self.nodes, &slot) {
                        self.children_mut(Some(&parent)).push(slot);
                    } else {
                        self.root.push(slot);
                    }
                }
                FetchedEntry::More(more) => {
                    let parent = more.parent_id.clone();
                    let slot = CommentEntry::More(more);
                    if in_slot {
                        self.children_mut(slot_parent.as_deref())
                            .insert(slot_index, slot);
                        slot_index += 1;
                    } else if let Some(parent) = parent {
                        self.children_mut(Some(&parent)).push(slot);
                    } else {
                        self.root.push(slot);
                    }
                }
            }
        }
        Ok(())
    }

    /// Find a placeholder's slot: the id of the node owning it (None for the
    /// root sequence) and its index in that sequence.
    fn locate_more(&self, more_id: &str) -> Option<(Option<String>, usize)> {
        if let Some(idx) = find_more(&self.root, more_id) {
            return Some((None, idx));
        }
        for (id, node) in &self.nodes {
            if let Some(idx) = find_more(&node.children, more_id) {
                return Some((Some(id.clone()), idx));
            }
        }
        None
    }

    fn children_mut(&mut self, parent: Option<&str>) -> &mut Vec<CommentEntry> {
        match parent {
            // Parent presence was validated before mutation started.
            Some(id) => {
                &mut self
                    .nodes
                    .get_mut(id)
                    .unwrap_or_else(|| panic!("validated parent '{}' missing from arena", id))
                    .children
            }
            None => &mut self.root,
        }
    }
}

fn find_more(entries: &[CommentEntry], more_id: &str) -> Option<usize> {
    entries.iter().position(|entry| match entry {
        CommentEntry::More(more) => more.id == more_id,
        CommentEntry::Comment(_) => false,
    })
}

fn entry_parent(nodes: &HashMap<String, CommentNode>, entry: &CommentEntry) -> Option<String> {
    match entry {
        CommentEntry::Comment(id) => nodes.get(id).and_then(|node| node.parent_id.clone()),
        CommentEntry::More(more) => more.parent_id.clone(),
    }
}

/// Iterator behind [`CommentTree::flatten`].
pub struct Flatten<'a> {
    tree: &'a CommentTree,
    stack: Vec<std::slice::Iter<'a, CommentEntry>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = FlatEntry<'a>;

    fn next(&mut self) -> Option<FlatEntry<'a>> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(CommentEntry::Comment(id)) => {
                    // Arena invariant: every referenced id resolves.
                    let node = self.tree.nodes.get(id)?;
                    self.stack.push(node.children.iter());
                    return Some(FlatEntry::Comment(node));
                }
                Some(CommentEntry::More(more)) => return Some(FlatEntry::More(more)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
