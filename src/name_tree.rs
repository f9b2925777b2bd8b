//! Outer index: an AVL tree keyed by name.
//!
//! Every node owns exactly one [`TagTree`] holding the records for its name.
//! Tag-level operations locate the node and delegate; only the first insert of
//! a new name, or the removal of a name's last live record, changes the shape
//! of this tree.

use std::cmp::Ordering;

use crate::config::Config;
use crate::record::{Record, Tag};
use crate::tag_tree::{self, TagTree};

pub(crate) type NameLink = Option<Box<NameNode>>;

#[derive(Clone)]
pub(crate) struct NameNode {
    pub(crate) name: String,
    pub(crate) tags: TagTree,
    pub(crate) left: NameLink,
    pub(crate) right: NameLink,
    /// Edges on the longest downward path; a leaf is 0.
    pub(crate) height: i32,
}

impl NameNode {
    fn new(name: String, config: Config) -> Box<Self> {
        Box::new(Self {
            name,
            tags: TagTree::with_config(config),
            left: None,
            right: None,
            height: 0,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    #[inline]
    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

/// Cached height of a link; an absent child counts as -1.
#[inline]
pub(crate) fn height(link: &NameLink) -> i32 {
    link.as_ref().map_or(-1, |n| n.height)
}

//              node                      left
//              /  \                      /  \
//           left   r       ->          ll    node
//           /  \                             /  \
//          ll   lr                          lr    r
fn rotate_right(mut node: Box<NameNode>) -> Box<NameNode> {
    let Some(mut left) = node.left.take() else {
        return node;
    };
    node.left = left.right.take();
    node.update_height();
    left.right = Some(node);
    left.update_height();
    left
}

//              node                      right
//              /  \                      /  \
//             l   right      ->       node   rr
//                 /  \                /  \
//                rl   rr             l    rl
fn rotate_left(mut node: Box<NameNode>) -> Box<NameNode> {
    let Some(mut right) = node.right.take() else {
        return node;
    };
    node.right = right.left.take();
    node.update_height();
    right.left = Some(node);
    right.update_height();
    right
}

/// Refreshes the height of `node` and restores the AVL condition with at most
/// two rotations.
fn balance(mut node: Box<NameNode>) -> Box<NameNode> {
    node.update_height();
    let factor = node.balance_factor();

    if factor > 1 {
        if let Some(left) = node.left.take() {
            let left = if left.balance_factor() < 0 {
                tracing::trace!(name = %node.name, "left-right rotation");
                rotate_left(left)
            } else {
                tracing::trace!(name = %node.name, "right rotation");
                left
            };
            node.left = Some(left);
        }
        return rotate_right(node);
    }

    if factor < -1 {
        if let Some(right) = node.right.take() {
            let right = if right.balance_factor() > 0 {
                tracing::trace!(name = %node.name, "right-left rotation");
                rotate_right(right)
            } else {
                tracing::trace!(name = %node.name, "left rotation");
                right
            };
            node.right = Some(right);
        }
        return rotate_left(node);
    }

    node
}

/// Splices a fresh node for `record.name()` below `link`.
///
/// The caller guarantees the name is not present yet.
fn insert_name(link: NameLink, record: Record, config: Config) -> Box<NameNode> {
    let mut node = match link {
        None => {
            let mut node = NameNode::new(record.name().to_owned(), config);
            tracing::debug!(name = %node.name, "new name");
            node.tags.insert(record);
            return node;
        }
        Some(node) => node,
    };

    match record.name().cmp(node.name.as_str()) {
        Ordering::Less => node.left = Some(insert_name(node.left.take(), record, config)),
        Ordering::Greater => node.right = Some(insert_name(node.right.take(), record, config)),
        Ordering::Equal => {
            node.tags.insert(record);
            return node;
        }
    }
    balance(node)
}

/// Detaches the leftmost node of the subtree, returning it together with what
/// remains of the subtree.
fn take_min(mut node: Box<NameNode>) -> (Box<NameNode>, NameLink) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (node, rest)
        }
        Some(left) => {
            let (min, rest) = take_min(left);
            node.left = rest;
            (min, Some(balance(node)))
        }
    }
}

/// Unlinks the node for `name`, if any, rebalancing on the way back up.
fn remove_name(link: NameLink, name: &str) -> NameLink {
    let mut node = link?;
    match name.cmp(node.name.as_str()) {
        Ordering::Less => node.left = remove_name(node.left.take(), name),
        Ordering::Greater => node.right = remove_name(node.right.take(), name),
        Ordering::Equal => {
            tracing::debug!(name = %node.name, "name dropped");
            let left = node.left.take();
            return match (left, node.right.take()) {
                (None, right) => right,
                (left, None) => left,
                (left, Some(right)) => {
                    let (mut successor, rest) = take_min(right);
                    successor.left = left;
                    successor.right = rest;
                    Some(balance(successor))
                }
            };
        }
    }
    Some(balance(node))
}

/// Two-level `name#tag` index.
///
/// A name exists in the index exactly as long as it has at least one live
/// record: removing the last record under a name removes the name too.
#[derive(Clone)]
pub struct NameTree {
    root: NameLink,
    names: usize,
    records: usize,
    config: Config,
}

impl NameTree {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty index whose tag trees all use `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            root: None,
            names: 0,
            records: 0,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Total live records across all names.
    #[inline]
    pub fn len(&self) -> usize {
        self.records
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Number of distinct names.
    #[inline]
    pub fn name_count(&self) -> usize {
        self.names
    }

    /// Height of the name tree; -1 when empty, 0 for a single name.
    #[inline]
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    /// Tag index for `name`.
    pub fn get(&self, name: &str) -> Option<&TagTree> {
        self.find(name).map(|node| &node.tags)
    }

    pub fn get_record(&self, name: &str, tag: Tag) -> Option<&Record> {
        self.get(name)?.get(tag)
    }

    pub fn contains(&self, name: &str, tag: Tag) -> bool {
        self.get_record(name, tag).is_some()
    }

    /// Live records under `name`; zero for an unknown name.
    pub fn count_for_name(&self, name: &str) -> usize {
        self.get(name).map_or(0, TagTree::len)
    }

    /// Inserts `record`, returning `false` if `name#tag` is already live.
    pub fn insert(&mut self, record: Record) -> bool {
        if let Some(node) = self.find_mut(record.name()) {
            let inserted = node.tags.insert(record);
            if inserted {
                self.records += 1;
            }
            return inserted;
        }

        self.root = Some(insert_name(self.root.take(), record, self.config));
        self.names += 1;
        self.records += 1;
        true
    }

    /// Removes the live record `name#tag`, returning it.
    pub fn remove(&mut self, name: &str, tag: Tag) -> Option<Record> {
        let node = self.find_mut(name)?;
        let removed = node.tags.remove(tag)?;
        let emptied = node.tags.is_empty();

        self.records -= 1;
        if emptied {
            self.root = remove_name(self.root.take(), name);
            self.names -= 1;
        }
        Some(removed)
    }

    /// Compacts every tag tree, returning the total vacant slots reclaimed.
    pub fn rebalance(&mut self) -> usize {
        fn walk(link: &mut NameLink) -> usize {
            match link {
                None => 0,
                Some(node) => node.tags.rebalance() + walk(&mut node.left) + walk(&mut node.right),
            }
        }
        walk(&mut self.root)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.names = 0;
        self.records = 0;
    }

    /// Names in ascending order.
    pub fn names(&self) -> Names<'_> {
        let mut names = Names { stack: Vec::new() };
        names.push_left(self.root.as_deref());
        names
    }

    /// Every live record, ordered by name and then by tag.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            names: self.names(),
            tags: None,
        }
    }

    #[inline]
    pub(crate) fn root(&self) -> Option<&NameNode> {
        self.root.as_deref()
    }

    fn find(&self, name: &str) -> Option<&NameNode> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match name.cmp(node.name.as_str()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut NameNode> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match name.cmp(node.name.as_str()) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }
}

impl Default for NameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NameTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Extend<Record> for NameTree {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<Record> for NameTree {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a> IntoIterator for &'a NameTree {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order walk over the name nodes.
pub struct Names<'a> {
    stack: Vec<&'a NameNode>,
}

impl<'a> Names<'a> {
    fn push_left(&mut self, mut node: Option<&'a NameNode>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }

    fn next_node(&mut self) -> Option<&'a NameNode> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(node)
    }
}

impl<'a> Iterator for Names<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().map(|node| node.name.as_str())
    }
}

pub struct Iter<'a> {
    names: Names<'a>,
    tags: Option<tag_tree::Iter<'a>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.tags.as_mut().and_then(Iterator::next) {
                return Some(record);
            }
            let node = self.names.next_node()?;
            self.tags = Some(node.tags.iter());
        }
    }
}
