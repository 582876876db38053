//! Ordered index
//!
//! Left-leaning red-black tree keyed by raw bytes. Each node owns its two
//! children, so the tree is a plain ownership hierarchy with no back
//! pointers. Every node also tracks the size of its subtree.

use std::cmp::Ordering;

/// A key with either a live value or a tombstone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: Vec<u8>,
    /// Empty for tombstones
    pub value: Vec<u8>,
    /// `true` = live value, `false` = tombstone
    pub live: bool,
}

impl Pair {
    /// A live key-value pair
    pub fn live(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            key,
            value,
            live: true,
        }
    }

    /// A tombstone for `key`
    pub fn tombstone(key: Vec<u8>) -> Self {
        Self {
            key,
            value: Vec::new(),
            live: false,
        }
    }

    /// Size of this pair as a tagged record: tag + key length prefix + key,
    /// plus value length prefix + value for live pairs
    pub fn encoded_len(&self) -> usize {
        let key_part = 1 + 2 + self.key.len();
        if self.live {
            key_part + 2 + self.value.len()
        } else {
            key_part
        }
    }
}

/// Byte offset, relative to the start of a record body, at which the record
/// for the last (maximum) key begins. `pairs` must be in key order.
pub fn max_offset(pairs: &[Pair]) -> usize {
    match pairs.split_last() {
        Some((_, before)) => before.iter().map(Pair::encoded_len).sum(),
        None => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

type Link = Option<Box<Node>>;

#[derive(Debug)]
struct Node {
    pair: Pair,
    color: Color,
    left: Link,
    right: Link,
    /// Nodes in the subtree rooted here
    size: usize,
}

impl Node {
    fn new(pair: Pair) -> Self {
        Self {
            pair,
            color: Color::Red,
            left: None,
            right: None,
            size: 1,
        }
    }
}

/// Balanced binary search tree mapping keys to [`Pair`]s
#[derive(Debug, Default)]
pub struct RedBlackTree {
    root: Link,
}

impl RedBlackTree {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Number of distinct keys (live and tombstoned)
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert or overwrite by key.
    ///
    /// Returns the change in stored bytes: `key + value` for a new key, or
    /// `new value - old value` when an existing key is overwritten.
    pub fn insert(&mut self, pair: Pair) -> isize {
        let (mut root, delta) = insert_rb(self.root.take(), pair);
        root.color = Color::Black;
        self.root = Some(root);
        delta
    }

    /// O(log n) point lookup
    pub fn search(&self, key: &[u8]) -> Option<&Pair> {
        let mut node = self.root.as_deref();
        while let Some(n) = node {
            match key.cmp(n.pair.key.as_slice()) {
                Ordering::Less => node = n.left.as_deref(),
                Ordering::Greater => node = n.right.as_deref(),
                Ordering::Equal => return Some(&n.pair),
            }
        }
        None
    }

    /// In-order (ascending key) iterator
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_deref())
    }

    /// Every pair in ascending key order
    pub fn traverse(&self) -> Vec<Pair> {
        self.iter().cloned().collect()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.root = None;
    }
}

/// Lazy in-order walk over a [`RedBlackTree`]
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Pair;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.pair)
    }
}

// =============================================================================
// Balancing
// =============================================================================

fn insert_rb(link: Link, pair: Pair) -> (Box<Node>, isize) {
    let mut node = match link {
        Some(node) => node,
        None => {
            let added = (pair.key.len() + pair.value.len()) as isize;
            return (Box::new(Node::new(pair)), added);
        }
    };

    let delta = match pair.key.as_slice().cmp(node.pair.key.as_slice()) {
        Ordering::Equal => {
            let delta = pair.value.len() as isize - node.pair.value.len() as isize;
            node.pair = pair;
            return (node, delta);
        }
        Ordering::Less => {
            let (child, delta) = insert_rb(node.left.take(), pair);
            node.left = Some(child);
            delta
        }
        Ordering::Greater => {
            let (child, delta) = insert_rb(node.right.take(), pair);
            node.right = Some(child);
            delta
        }
    };

    if is_red(&node.right) && !is_red(&node.left) {
        node = rotate_left(node);
    }
    if is_red(&node.left) && node.left.as_ref().is_some_and(|l| is_red(&l.left)) {
        node = rotate_right(node);
    }
    if is_red(&node.left) && is_red(&node.right) {
        flip_colors(&mut node);
    }

    node.size = size(&node.left) + size(&node.right) + 1;
    (node, delta)
}

fn is_red(link: &Link) -> bool {
    link.as_ref().is_some_and(|n| n.color == Color::Red)
}

fn size(link: &Link) -> usize {
    link.as_ref().map_or(0, |n| n.size)
}

fn rotate_left(mut h: Box<Node>) -> Box<Node> {
    let Some(mut x) = h.right.take() else {
        return h;
    };
    h.right = x.left.take();
    x.color = h.color;
    h.color = Color::Red;
    x.size = h.size;
    h.size = size(&h.left) + size(&h.right) + 1;
    x.left = Some(h);
    x
}

fn rotate_right(mut h: Box<Node>) -> Box<Node> {
    let Some(mut x) = h.left.take() else {
        return h;
    };
    h.left = x.right.take();
    x.color = h.color;
    h.color = Color::Red;
    x.size = h.size;
    h.size = size(&h.left) + size(&h.right) + 1;
    x.right = Some(h);
    x
}

fn flip_colors(h: &mut Node) {
    h.color = Color::Red;
    if let Some(left) = h.left.as_mut() {
        left.color = Color::Black;
    }
    if let Some(right) = h.right.as_mut() {
        right.color = Color::Black;
    }
}
