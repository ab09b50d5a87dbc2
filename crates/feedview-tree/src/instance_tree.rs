//! Stage tree: flat `StageRecord`s linked by `previous_id` → one rooted tree.
//!
//! The builder indexes records by id, attaches every record to its parent's
//! child list, and materializes owned nodes leaves-first from an explicit
//! worklist. No step recurses, so arbitrarily deep or wide pipelines are fine.
//!
//! Children are ordered by ascending id regardless of input order.

use std::collections::HashMap;

use crate::error::TreeError;
use crate::records::{StageId, StageRecord};

/// A stage plus its downstream stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNode {
    pub record: StageRecord,
    pub children: Vec<StageNode>,
}

impl StageNode {
    pub fn id(&self) -> StageId {
        self.record.id
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a node counts itself.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pre-order traversal yielding `(depth, node)`; `self` has depth 0.
    pub fn iter(&self) -> StageIter<'_> {
        StageIter { stack: vec![(0, self)] }
    }

    pub fn find(&self, id: StageId) -> Option<&StageNode> {
        self.iter().map(|(_, node)| node).find(|node| node.id() == id)
    }

    /// Ids from this node down to `id` (inclusive), if `id` is in the subtree.
    pub fn path_to(&self, id: StageId) -> Option<Vec<StageId>> {
        let mut path: Vec<StageId> = Vec::new();
        for (depth, node) in self.iter() {
            path.truncate(depth);
            path.push(node.id());
            if node.id() == id {
                return Some(path);
            }
        }
        None
    }
}

impl Drop for StageNode {
    fn drop(&mut self) {
        // Unlink iteratively so long stage chains don't blow the stack.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

pub struct StageIter<'a> {
    stack: Vec<(usize, &'a StageNode)>,
}

impl<'a> Iterator for StageIter<'a> {
    type Item = (usize, &'a StageNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// Build the stage tree.
///
/// Fails with [`TreeError::NotFound`] unless exactly one record has no
/// `previous_id`, with [`TreeError::OrphanRecord`] when a parent id is
/// unknown, with [`TreeError::DuplicateId`] for repeated ids, and with
/// [`TreeError::Cycle`] for records whose parent chain never reaches the root.
pub fn build_instance_tree(records: &[StageRecord]) -> Result<StageNode, TreeError> {
    let mut index: HashMap<StageId, usize> = HashMap::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        if index.insert(record.id, pos).is_some() {
            return Err(TreeError::DuplicateId { id: record.id });
        }
    }

    let roots: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_root())
        .map(|(pos, _)| pos)
        .collect();
    let root = match roots.as_slice() {
        [root] => *root,
        _ => return Err(TreeError::NotFound { roots: roots.len() }),
    };

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for (pos, record) in records.iter().enumerate() {
        let Some(previous_id) = record.previous_id else {
            continue;
        };
        let parent = index.get(&previous_id).ok_or(TreeError::OrphanRecord {
            id: record.id,
            previous_id,
        })?;
        children[*parent].push(pos);
    }
    for list in &mut children {
        list.sort_unstable_by_key(|&pos| records[pos].id);
    }

    // Pre-order from the root: every parent precedes its children.
    let mut order: Vec<usize> = Vec::with_capacity(records.len());
    let mut worklist = vec![root];
    while let Some(pos) = worklist.pop() {
        order.push(pos);
        worklist.extend(children[pos].iter().rev().copied());
    }

    if order.len() != records.len() {
        let mut reached = vec![false; records.len()];
        for &pos in &order {
            reached[pos] = true;
        }
        let mut ids: Vec<StageId> = records
            .iter()
            .zip(&reached)
            .filter(|(_, reached)| !**reached)
            .map(|(record, _)| record.id)
            .collect();
        ids.sort_unstable();
        return Err(TreeError::Cycle { ids });
    }

    // Materialize leaves-first so each parent can take ownership of its children.
    let mut slots: Vec<Option<StageNode>> = vec![None; records.len()];
    for &pos in order.iter().rev() {
        let node_children: Vec<StageNode> = children[pos]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        slots[pos] = Some(StageNode {
            record: records[pos].clone(),
            children: node_children,
        });
    }

    tracing::debug!(stages = records.len(), root = records[root].id, "built stage tree");
    slots[root].take().ok_or(TreeError::NotFound { roots: 0 })
}
