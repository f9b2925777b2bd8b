//! Per-name tag index.
//!
//! An ordered binary tree keyed by [`Tag`]. Deletion is lazy: removing a
//! record from an interior node only marks the node *vacant*, and the node
//! keeps its place as an ordering placeholder. A later insert may take over a
//! vacant slot in place when the new tag fits between the slot's left and
//! right subtrees.
//!
//! Balance is tracked by subtree *size* rather than height. When an insert
//! leaves a node whose children differ too much in size (see
//! [`Config::is_imbalanced`]), the whole subtree is flattened into its live
//! records and rebuilt as a minimum-height tree. The rebuild also drops every
//! vacant slot it passes over.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::config::Config;
use crate::record::{Record, Tag};

/// Records buffered inline during a subtree rebuild before spilling to heap.
const REBUILD_INLINE: usize = 16;

pub(crate) type Link = Option<Box<Node>>;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) record: Record,
    pub(crate) left: Link,
    pub(crate) right: Link,
    /// Nodes in this subtree, vacant ones included.
    pub(crate) size: usize,
    /// Vacant nodes in this subtree.
    pub(crate) vacant_count: usize,
    pub(crate) vacant: bool,
}

impl Node {
    fn leaf(record: Record) -> Box<Self> {
        Box::new(Self {
            record,
            left: None,
            right: None,
            size: 1,
            vacant_count: 0,
            vacant: false,
        })
    }

    #[inline]
    pub(crate) fn tag(&self) -> Tag {
        self.record.tag()
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    fn update(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
        self.vacant_count =
            usize::from(self.vacant) + vacant_count(&self.left) + vacant_count(&self.right);
    }

    /// Whether `tag` can take over this slot without disturbing the order:
    /// everything on the left must sort below it and everything on the right
    /// above it.
    fn can_host(&self, tag: Tag) -> bool {
        let above_left = self.left.as_deref().map_or(true, |l| l.max_tag() < tag);
        let below_right = self.right.as_deref().map_or(true, |r| tag < r.min_tag());
        above_left && below_right
    }

    fn min_tag(&self) -> Tag {
        let mut node = self;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        node.tag()
    }

    fn max_tag(&self) -> Tag {
        let mut node = self;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        node.tag()
    }
}

#[inline]
fn size(link: &Link) -> usize {
    link.as_ref().map_or(0, |n| n.size)
}

#[inline]
fn vacant_count(link: &Link) -> usize {
    link.as_ref().map_or(0, |n| n.vacant_count)
}

fn height(link: &Link) -> usize {
    match link {
        None => 0,
        Some(node) => 1 + height(&node.left).max(height(&node.right)),
    }
}

/// Inserts below `link` and hands back the (possibly replaced) subtree.
///
/// The caller guarantees that no live node carries `record.tag()`.
fn insert_at(link: Link, record: Record, config: &Config) -> Link {
    let mut node = match link {
        None => return Some(Node::leaf(record)),
        Some(node) => node,
    };

    if node.vacant && node.can_host(record.tag()) {
        node.record = record;
        node.vacant = false;
        node.update();
        return Some(node);
    }

    match record.tag().cmp(&node.tag()) {
        Ordering::Less => node.left = insert_at(node.left.take(), record, config),
        Ordering::Greater => node.right = insert_at(node.right.take(), record, config),
        // Live duplicate, rejected by `TagTree::insert` before descending.
        Ordering::Equal => return Some(node),
    }

    node.update();
    if config.is_imbalanced(size(&node.left), size(&node.right)) {
        return rebuild(node);
    }
    Some(node)
}

/// Removes the live record with `tag` from the subtree rooted at `node`.
///
/// Leaves are unlinked; interior nodes turn vacant. A vacant node left with no
/// children is pruned on the way back up.
fn remove_at(mut node: Box<Node>, tag: Tag, removed: &mut Option<Record>) -> Link {
    match tag.cmp(&node.tag()) {
        Ordering::Less => {
            node.left = node.left.take().and_then(|l| remove_at(l, tag, removed));
        }
        Ordering::Greater => {
            node.right = node.right.take().and_then(|r| remove_at(r, tag, removed));
        }
        Ordering::Equal => {
            if node.vacant {
                return Some(node);
            }
            if node.is_leaf() {
                let Node { record, .. } = *node;
                *removed = Some(record);
                return None;
            }
            node.vacant = true;
            *removed = Some(node.record.clone());
        }
    }

    if node.vacant && node.is_leaf() {
        return None;
    }
    node.update();
    Some(node)
}

/// Flattens the live records of `node` and rebuilds them as a
/// minimum-height subtree. Vacant slots are discarded.
fn rebuild(node: Box<Node>) -> Link {
    let reclaimed = node.vacant_count;
    let mut live: SmallVec<[Record; REBUILD_INLINE]> =
        SmallVec::with_capacity(node.size - node.vacant_count);
    drain_live(node, &mut live);

    tracing::trace!(live = live.len(), reclaimed, "rebuilding tag subtree");

    let len = live.len();
    build_balanced(len, &mut live.into_iter())
}

/// In-order move of every live record into `out`, dropping the nodes.
fn drain_live(node: Box<Node>, out: &mut SmallVec<[Record; REBUILD_INLINE]>) {
    let Node {
        record,
        left,
        right,
        vacant,
        ..
    } = *node;
    if let Some(left) = left {
        drain_live(left, out);
    }
    if !vacant {
        out.push(record);
    }
    if let Some(right) = right {
        drain_live(right, out);
    }
}

/// Builds a subtree from the next `len` records of an ascending iterator,
/// placing the midpoint at the root of every level.
fn build_balanced<I>(len: usize, records: &mut I) -> Link
where
    I: Iterator<Item = Record>,
{
    if len == 0 {
        return None;
    }
    let left_len = len / 2;
    let left = build_balanced(left_len, records);
    let record = records.next()?;
    let right = build_balanced(len - left_len - 1, records);

    let mut node = Node::leaf(record);
    node.left = left;
    node.right = right;
    node.update();
    Some(node)
}

/// Ordered index of the records sharing one name, keyed by tag.
#[derive(Clone)]
pub struct TagTree {
    root: Link,
    config: Config,
}

impl TagTree {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self { root: None, config }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        size(&self.root) - vacant_count(&self.root)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated nodes, vacant placeholders included.
    #[inline]
    pub fn node_count(&self) -> usize {
        size(&self.root)
    }

    #[inline]
    pub fn vacant_count(&self) -> usize {
        vacant_count(&self.root)
    }

    /// Levels on the longest root-to-leaf path. Zero when empty.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn get(&self, tag: Tag) -> Option<&Record> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match tag.cmp(&node.tag()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return (!node.vacant).then_some(&node.record),
            };
        }
        None
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.get(tag).is_some()
    }

    /// Inserts `record`, returning `false` if its tag is already live.
    pub fn insert(&mut self, record: Record) -> bool {
        if self.contains(record.tag()) {
            return false;
        }
        self.root = insert_at(self.root.take(), record, &self.config);
        true
    }

    /// Removes the live record with `tag`, returning it.
    pub fn remove(&mut self, tag: Tag) -> Option<Record> {
        if !self.contains(tag) {
            return None;
        }
        let mut removed = None;
        self.root = self
            .root
            .take()
            .and_then(|root| remove_at(root, tag, &mut removed));
        removed
    }

    /// Rebuilds the whole tree as a minimum-height tree over the live records.
    ///
    /// Returns the number of vacant slots reclaimed.
    pub fn rebalance(&mut self) -> usize {
        let reclaimed = self.vacant_count();
        if let Some(root) = self.root.take() {
            self.root = rebuild(root);
        }
        tracing::debug!(reclaimed, live = self.len(), "tag tree rebalanced");
        reclaimed
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Live records in ascending tag order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    #[inline]
    pub(crate) fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }
}

impl Default for TagTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TagTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a TagTree {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut node: Option<&'a Node>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.push_left(node.right.as_deref());
            if !node.vacant {
                return Some(&node.record);
            }
        }
        None
    }
}
