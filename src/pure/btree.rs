// B-Tree Engine
// Classic multi-way balanced search tree of minimum degree `t`, keyed by
// the records' derived keys. Insertion splits full nodes preemptively on
// the way down; deletion refills deficient children before descending, so
// both are single-pass top-down with no backtracking.

use anyhow::{bail, ensure, Result};

use crate::contracts::{Catalog, Record, RemoveOutcome};
use crate::types::MinDegree;

/// A tree node.
///
/// A single type serves both leaf and internal nodes, distinguished by the
/// `leaf` flag. Records are kept in non-decreasing key order; an internal
/// node owns exactly one more child than it has records. Children are held
/// by `Box`: every node has exactly one owner and the structure is acyclic
/// by construction.
#[derive(Debug, Clone)]
pub struct Node {
    records: Vec<Record>,
    children: Vec<Box<Node>>,
    leaf: bool,
}

impl Node {
    fn new_leaf() -> Self {
        Self {
            records: Vec::new(),
            children: Vec::new(),
            leaf: true,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Number of records in this node alone.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Keys of this node in order, for structural inspection in tests.
    pub fn keys(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.key().as_str()).collect()
    }

    /// Child nodes in order (empty for a leaf).
    pub fn children(&self) -> &[Box<Node>] {
        &self.children
    }

    /// First position whose record key is `>= key`.
    fn find_key(&self, key: &str) -> usize {
        self.records.partition_point(|r| r.key().as_str() < key)
    }

    fn search(&self, key: &str) -> Option<&Record> {
        let idx = self.find_key(key);
        if idx < self.records.len() && self.records[idx].key() == key {
            return Some(&self.records[idx]);
        }
        if self.leaf {
            None
        } else {
            self.children[idx].search(key)
        }
    }

    /// Insert into a node known to have fewer than `2t - 1` records.
    ///
    /// Internal nodes split a full target child before descending, which is
    /// what keeps the descent single-pass: the child recursed into is never
    /// full, so the promotion a split produces always has room here.
    fn insert_non_full(&mut self, record: Record, t: usize) {
        // Insert after any equal keys so duplicates keep arrival order.
        let mut idx = self
            .records
            .partition_point(|r| r.key() <= record.key());
        if self.leaf {
            self.records.insert(idx, record);
        } else {
            if self.children[idx].records.len() == 2 * t - 1 {
                self.split_child(idx, t);
                // The promoted median may shift the target one slot right.
                if self.records[idx].key() < record.key() {
                    idx += 1;
                }
            }
            self.children[idx].insert_non_full(record, t);
        }
    }

    /// Split the full child at `i`.
    ///
    /// The child keeps its lower `t - 1` records, a new sibling of the same
    /// leaf-ness takes the upper `t - 1` (plus the upper `t` children if
    /// internal), and the median record is promoted into this node. This is
    /// the only way a node gains a record without an explicit insertion.
    fn split_child(&mut self, i: usize, t: usize) {
        let child = &mut self.children[i];
        let mut upper = child.records.split_off(t - 1);
        let median = upper.remove(0);
        let sibling = Node {
            records: upper,
            children: if child.leaf {
                Vec::new()
            } else {
                child.children.split_off(t)
            },
            leaf: child.leaf,
        };
        self.records.insert(i, median);
        self.children.insert(i + 1, Box::new(sibling));
    }

    /// Top-down removal. Returns whether a matching record was removed.
    ///
    /// Mirrors insertion's preemptive split: before descending into a child
    /// with only `t - 1` records, `fill` brings it up to at least `t`, so
    /// the removal deeper down can never leave a node deficient.
    fn remove(&mut self, key: &str, t: usize) -> bool {
        let idx = self.find_key(key);

        if idx < self.records.len() && self.records[idx].key() == key {
            if self.leaf {
                self.remove_from_leaf(idx);
                true
            } else {
                self.remove_from_non_leaf(idx, t)
            }
        } else {
            if self.leaf {
                // Key absent; no structural change.
                return false;
            }

            let at_last = idx == self.records.len();
            if self.children[idx].records.len() < t {
                self.fill(idx, t);
            }
            // A merge in fill() can fold the target child into its left
            // sibling, shifting the descent index one slot left.
            if at_last && idx > self.records.len() {
                self.children[idx - 1].remove(key, t)
            } else {
                self.children[idx].remove(key, t)
            }
        }
    }

    fn remove_from_leaf(&mut self, idx: usize) {
        self.records.remove(idx);
    }

    /// Remove the record at `idx` of an internal node.
    ///
    /// Replaces it with its in-order predecessor or successor when the
    /// flanking child has records to spare, otherwise merges the two
    /// flanking children around it and recurses into the merge product.
    fn remove_from_non_leaf(&mut self, idx: usize, t: usize) -> bool {
        if self.children[idx].records.len() >= t {
            let pred = self.children[idx].max_record().clone();
            let pred_key = pred.key().clone();
            self.children[idx].remove(pred_key.as_str(), t);
            self.records[idx] = pred;
            true
        } else if self.children[idx + 1].records.len() >= t {
            let succ = self.children[idx + 1].min_record().clone();
            let succ_key = succ.key().clone();
            self.children[idx + 1].remove(succ_key.as_str(), t);
            self.records[idx] = succ;
            true
        } else {
            let key = self.records[idx].key().clone();
            self.merge(idx);
            self.children[idx].remove(key.as_str(), t)
        }
    }

    /// Rightmost record of the rightmost leaf under this node.
    fn max_record(&self) -> &Record {
        let mut node = self;
        while !node.leaf {
            node = &node.children[node.children.len() - 1];
        }
        &node.records[node.records.len() - 1]
    }

    /// Leftmost record of the leftmost leaf under this node.
    fn min_record(&self) -> &Record {
        let mut node = self;
        while !node.leaf {
            node = &node.children[0];
        }
        &node.records[0]
    }

    /// Bring the child at `idx` up to at least `t` records.
    ///
    /// Borrows from a sibling with spare capacity, preferring the left one;
    /// when neither has any, merges with the right sibling (or the left one
    /// when `idx` is the last child).
    fn fill(&mut self, idx: usize, t: usize) {
        if idx != 0 && self.children[idx - 1].records.len() >= t {
            self.borrow_from_prev(idx);
        } else if idx != self.records.len() && self.children[idx + 1].records.len() >= t {
            self.borrow_from_next(idx);
        } else if idx != self.records.len() {
            self.merge(idx);
        } else {
            self.merge(idx - 1);
        }
    }

    /// Rotate one record from the left sibling through this node's
    /// separating record into the child at `idx`.
    fn borrow_from_prev(&mut self, idx: usize) {
        let (left, right) = self.children.split_at_mut(idx);
        let sibling = &mut left[idx - 1];
        let child = &mut right[0];

        if let Some(donated) = sibling.records.pop() {
            let separator = std::mem::replace(&mut self.records[idx - 1], donated);
            child.records.insert(0, separator);
        }
        if !child.leaf {
            if let Some(moved) = sibling.children.pop() {
                child.children.insert(0, moved);
            }
        }
    }

    /// Mirror image of `borrow_from_prev`, donating from the right sibling.
    fn borrow_from_next(&mut self, idx: usize) {
        let (left, right) = self.children.split_at_mut(idx + 1);
        let child = &mut left[idx];
        let sibling = &mut right[0];

        let donated = sibling.records.remove(0);
        let separator = std::mem::replace(&mut self.records[idx], donated);
        child.records.push(separator);
        if !child.leaf {
            child.children.push(sibling.children.remove(0));
        }
    }

    /// Fold the child at `idx + 1` and the separating record at `idx` into
    /// the child at `idx`. The emptied sibling is dropped here, which is
    /// the only way a non-root node is destroyed.
    fn merge(&mut self, idx: usize) {
        let separator = self.records.remove(idx);
        let mut sibling = self.children.remove(idx + 1);
        let child = &mut self.children[idx];
        child.records.push(separator);
        child.records.append(&mut sibling.records);
        child.children.append(&mut sibling.children);
    }

    fn traverse<'a>(&'a self, out: &mut Vec<&'a Record>) {
        for (i, record) in self.records.iter().enumerate() {
            if !self.leaf {
                self.children[i].traverse(out);
            }
            out.push(record);
        }
        if !self.leaf {
            if let Some(last) = self.children.last() {
                last.traverse(out);
            }
        }
    }

    fn count(&self) -> usize {
        self.records.len() + self.children.iter().map(|c| c.count()).sum::<usize>()
    }
}

/// The tree: an optional owned root plus the minimum degree.
///
/// The root is the one node allowed to hold fewer than `t - 1` records
/// (including zero, which is the empty tree). Its reference is replaced
/// on growth and shrink, never aliased.
#[derive(Debug, Clone)]
pub struct BTree {
    root: Option<Box<Node>>,
    degree: usize,
}

impl BTree {
    pub fn new(degree: MinDegree) -> Self {
        Self {
            root: None,
            degree: degree.get(),
        }
    }

    /// The minimum degree `t` this tree was created with.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Root node, for structural inspection in tests.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }
}

impl Catalog for BTree {
    fn insert(&mut self, record: Record) {
        let t = self.degree;
        match self.root.take() {
            None => {
                let mut root = Node::new_leaf();
                root.records.push(record);
                self.root = Some(Box::new(root));
            }
            Some(mut root) => {
                if root.records.len() == 2 * t - 1 {
                    // Grow at the root: the only path by which the tree
                    // gains height.
                    let mut new_root = Node {
                        records: Vec::new(),
                        children: vec![root],
                        leaf: false,
                    };
                    new_root.split_child(0, t);
                    let idx = usize::from(new_root.records[0].key() < record.key());
                    new_root.children[idx].insert_non_full(record, t);
                    self.root = Some(Box::new(new_root));
                } else {
                    root.insert_non_full(record, t);
                    self.root = Some(root);
                }
            }
        }
    }

    fn search(&self, key: &str) -> Option<&Record> {
        self.root.as_ref().and_then(|root| root.search(key))
    }

    fn remove(&mut self, key: &str) -> RemoveOutcome {
        let t = self.degree;
        let Some(mut root) = self.root.take() else {
            return RemoveOutcome::EmptyTree;
        };

        let found = root.remove(key, t);

        // Shrink at the root: the only path by which the tree loses
        // height. An emptied internal root collapses to its sole child;
        // an emptied leaf root leaves the tree empty.
        self.root = if root.records.is_empty() {
            if root.leaf {
                None
            } else {
                Some(root.children.remove(0))
            }
        } else {
            Some(root)
        };

        if found {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        }
    }

    fn edit(&mut self, old_key: &str, record: Record) -> RemoveOutcome {
        let outcome = self.remove(old_key);
        self.insert(record);
        outcome
    }

    fn traverse(&self) -> Vec<&Record> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.traverse(&mut out);
        }
        out
    }

    fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.count())
    }
}

/// Check every structural invariant of the tree.
///
/// - record counts within `[t - 1, 2t - 1]` for non-root nodes, `<= 2t - 1`
///   for the root
/// - records non-decreasing by key within each node and across the whole
///   in-order traversal
/// - internal child count is record count plus one
/// - all leaves at the same depth
pub fn check_invariants(tree: &BTree) -> Result<()> {
    let Some(root) = tree.root() else {
        return Ok(());
    };

    let mut leaf_depth = None;
    check_node(root, tree.degree(), true, 0, &mut leaf_depth)?;

    let records = tree.traverse();
    for pair in records.windows(2) {
        ensure!(
            pair[0].key() <= pair[1].key(),
            "Traversal out of order: {} after {}",
            pair[1].key(),
            pair[0].key()
        );
    }
    Ok(())
}

/// Convenience predicate over `check_invariants`.
pub fn is_valid_btree(tree: &BTree) -> bool {
    check_invariants(tree).is_ok()
}

/// Whether every leaf sits at the same depth from the root.
pub fn all_leaves_at_same_level(tree: &BTree) -> bool {
    let Some(root) = tree.root() else {
        return true;
    };
    let mut leaf_depth = None;
    check_leaf_depth(root, 0, &mut leaf_depth)
}

fn check_node(
    node: &Node,
    t: usize,
    is_root: bool,
    depth: usize,
    leaf_depth: &mut Option<usize>,
) -> Result<()> {
    let count = node.record_count();
    if !is_root {
        ensure!(
            count >= t - 1,
            "Non-root node has too few records: {} < {}",
            count,
            t - 1
        );
    }
    ensure!(
        count <= 2 * t - 1,
        "Node has too many records: {} > {}",
        count,
        2 * t - 1
    );

    let keys = node.keys();
    for pair in keys.windows(2) {
        ensure!(pair[0] <= pair[1], "Node records not in sorted order");
    }

    if node.is_leaf() {
        ensure!(node.children().is_empty(), "Leaf node has children");
        match leaf_depth {
            None => *leaf_depth = Some(depth),
            Some(expected) if *expected != depth => {
                bail!("Leaves at unequal depths: {} and {}", expected, depth)
            }
            Some(_) => {}
        }
    } else {
        ensure!(
            node.children().len() == count + 1,
            "Internal node has {} children for {} records",
            node.children().len(),
            count
        );
        for child in node.children() {
            check_node(child, t, false, depth + 1, leaf_depth)?;
        }
    }
    Ok(())
}

fn check_leaf_depth(node: &Node, depth: usize, leaf_depth: &mut Option<usize>) -> bool {
    if node.is_leaf() {
        match leaf_depth {
            None => {
                *leaf_depth = Some(depth);
                true
            }
            Some(expected) => *expected == depth,
        }
    } else {
        node.children()
            .iter()
            .all(|child| check_leaf_depth(child, depth + 1, leaf_depth))
    }
}
