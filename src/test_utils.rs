use crate::node::{NodeKey, TreeNode};

pub mod nodes {
    macro_rules! group {
        ($operator:expr $(, $child:expr)* $(,)?) => {
            crate::node::TreeNode::group_with($operator, vec![$($child),*])
        };
    }

    macro_rules! clinical {
        () => {
            crate::node::TreeNode::leaf(crate::node::CriteriaKind::Clinical)
        };
    }

    macro_rules! genomic {
        () => {
            crate::node::TreeNode::leaf(crate::node::CriteriaKind::Genomic)
        };
    }

    pub(crate) use clinical;
    pub(crate) use genomic;
    pub(crate) use group;
}

/// Collects every key reachable from the given roots, depth-first.
pub fn collect_keys(roots: &[TreeNode]) -> Vec<NodeKey> {
    let mut keys = Vec::new();
    for node in roots {
        keys.push(node.key().clone());
        if let Some(children) = node.children() {
            keys.extend(collect_keys(children));
        }
    }
    keys
}
