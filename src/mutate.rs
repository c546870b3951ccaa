//! Structural operations over a criteria tree.
//!
//! Lookups borrow the tree; mutating operations are copy-on-write at the
//! boundary: the caller hands in a slice of roots and receives a structurally
//! independent tree with the mutation applied, or `None` when the target key
//! does not resolve. The input tree is never touched, so snapshots already
//! published to other observers keep their value.

use crate::node::{CriteriaKind, NodeKey, Operator, TreeNode};

/// Depth-first search for the node carrying `key`.
///
/// Every node is visited at most once. Behavior on a tree with duplicate
/// keys is out of contract; all constructors in this crate mint unique keys.
pub fn find_node_by_key<'tree>(roots: &'tree [TreeNode], key: &NodeKey) -> Option<&'tree TreeNode> {
    for node in roots {
        if node.key() == key {
            return Some(node);
        }
        if let Some(children) = node.children() {
            if let Some(found) = find_node_by_key(children, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Finds the group whose immediate children contain the node carrying `key`.
///
/// This is the addressing step behind "insert a sibling of X" and the
/// operator-change convention: the returned node is the *container* of the
/// referenced node. Returns `None` when `key` belongs to a root (roots have
/// no parent) or does not resolve at all.
pub fn find_parent_containing_key<'tree>(
    roots: &'tree [TreeNode],
    key: &NodeKey,
) -> Option<&'tree TreeNode> {
    for node in roots {
        if let Some(children) = node.children() {
            if children.iter().any(|child| child.key() == key) {
                return Some(node);
            }
            if let Some(found) = find_parent_containing_key(children, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Removes the node carrying `key` together with its entire subtree.
///
/// Roots themselves are never removed; a root key is treated as a miss.
/// Returns the new tree, or `None` when the key does not resolve.
pub fn delete_subtree_by_key(roots: &[TreeNode], key: &NodeKey) -> Option<Vec<TreeNode>> {
    apply(roots, |nodes| {
        remove_from_children(nodes, key)
    })
}

/// Appends a new leaf of the given criteria type as a sibling of the node
/// carrying `target`: the leaf lands in the children of `target`'s parent.
///
/// Returns `None` when `target` does not resolve to a parented node.
pub fn insert_leaf(
    roots: &[TreeNode],
    target: &NodeKey,
    kind: CriteriaKind,
) -> Option<Vec<TreeNode>> {
    apply(roots, |nodes| {
        let parent = find_parent_mut(nodes, target)?;
        parent.children_mut()?.push(TreeNode::leaf(kind));
        Some(())
    })
}

/// Appends a new leaf of the given criteria type under the group carrying
/// `target` itself.
///
/// Used when the caller already holds the exact group to extend. A leaf
/// target is a miss: leaves have no children to append to.
pub fn insert_leaf_under(
    roots: &[TreeNode],
    target: &NodeKey,
    kind: CriteriaKind,
) -> Option<Vec<TreeNode>> {
    apply(roots, |nodes| {
        let node = find_node_mut(nodes, target)?;
        node.children_mut()?.push(TreeNode::leaf(kind));
        Some(())
    })
}

/// Appends a new empty subgroup (default operator `And`) under the group
/// carrying `target`. A leaf target is a miss.
pub fn insert_subgroup(roots: &[TreeNode], target: &NodeKey) -> Option<Vec<TreeNode>> {
    apply(roots, |nodes| {
        let node = find_node_mut(nodes, target)?;
        node.children_mut()?.push(TreeNode::group(Operator::And));
        Some(())
    })
}

/// Sets the operator of the group *containing* the node carrying `key`.
///
/// The key addresses a child, not the group itself: callers submit the key
/// of the node whose menu was opened, and the label lands on its container.
/// Existing intent producers depend on this addressing, so it is part of the
/// contract.
pub fn relabel_group(
    roots: &[TreeNode],
    key: &NodeKey,
    operator: Operator,
) -> Option<Vec<TreeNode>> {
    apply(roots, |nodes| {
        let parent = find_parent_mut(nodes, key)?;
        parent.set_operator(operator).then_some(())
    })
}

/// Clones the tree and runs `mutation` against the clone, returning the
/// mutated clone only when the mutation applied.
fn apply<F>(roots: &[TreeNode], mutation: F) -> Option<Vec<TreeNode>>
where
    F: FnOnce(&mut Vec<TreeNode>) -> Option<()>,
{
    let mut fresh = roots.to_vec();
    mutation(&mut fresh)?;
    Some(fresh)
}

fn find_node_mut<'tree>(
    roots: &'tree mut [TreeNode],
    key: &NodeKey,
) -> Option<&'tree mut TreeNode> {
    for node in roots {
        if node.key() == key {
            return Some(node);
        }
        if let Some(children) = node.children_mut() {
            if let Some(found) = find_node_mut(children, key) {
                return Some(found);
            }
        }
    }
    None
}

fn find_parent_mut<'tree>(
    roots: &'tree mut [TreeNode],
    key: &NodeKey,
) -> Option<&'tree mut TreeNode> {
    for node in roots {
        if node
            .children()
            .is_some_and(|children| children.iter().any(|child| child.key() == key))
        {
            return Some(node);
        }
        if let Some(children) = node.children_mut() {
            if let Some(found) = find_parent_mut(children, key) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_from_children(nodes: &mut [TreeNode], key: &NodeKey) -> Option<()> {
    for node in nodes {
        if let Some(children) = node.children_mut() {
            if let Some(position) = children.iter().position(|child| child.key() == key) {
                children.remove(position);
                return Some(());
            }
            if remove_from_children(children, key).is_some() {
                return Some(());
            }
        }
    }
    None
}
