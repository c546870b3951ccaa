//! A tree data structure for editing clinical trial matching criteria.
//!
//! Matching rules for a trial arm are a boolean combination (`and`/`or`) of
//! clinical and genomic predicates, exchanged with the trial data source as
//! a nested object format: `{"match": [{"and": [...]} | {"or": [...]} |
//! <leaf criteria>, ...]}`. This crate holds the in-memory tree those rules
//! are edited through: typed group and leaf nodes with unique keys, a total
//! bidirectional conversion to and from the external format, copy-on-write
//! structural mutation, and a controller that keeps every UI surface looking
//! at a consistent snapshot of the active arm.
//!
//! # Examples
//!
//! Loading an arm's rules and editing the tree:
//!
//! ```
//! use criteria_tree::{ArmState, CriteriaKind, MatchRules, Operator, TreeController};
//! use serde_json::json;
//!
//! let rules: MatchRules = serde_json::from_value(json!({
//!     "match": [
//!         {"and": [
//!             {"type": "clinical", "age_numerical": ">=18"},
//!             {"or": [{"type": "genomic", "hugo_symbol": "BRCA1"}]}
//!         ]}
//!     ]
//! }))
//! .unwrap();
//!
//! let mut controller = TreeController::new();
//!
//! // Activate the arm: the rules become a tree and the first leaf is selected.
//! let change = controller.activate_arm("arm_a", Some(&rules)).unwrap().unwrap();
//! let selected = change.selection.unwrap();
//!
//! // Add a genomic criteria next to the selected leaf, then flip the group
//! // operator. Each applied intent republishes both representations.
//! controller.request_add_criteria(selected.key.clone(), CriteriaKind::Genomic).unwrap();
//! controller.request_operator_change(selected.key, Operator::Or).unwrap();
//!
//! assert_eq!(ArmState::Editing, controller.arm_state(&"arm_a".into()));
//! let published = controller.store().match_model();
//! assert!(published.rules[0].get("or").is_some());
//! ```
//!
//! # Guarantees
//!
//! * Conversion is an order-preserving bijection for well-formed rules:
//!   converting to a tree and back returns the original object (node keys
//!   are internal and never reach the external format). Malformed elements
//!   fail the whole conversion with the offending path; nothing is dropped.
//! * Every node key is unique within a tree and mutation preserves that.
//! * Mutation is copy-on-write at the boundary: snapshots handed to other
//!   observers are never edited retroactively.
//! * A mutation intent referencing a stale key is logged and ignored rather
//!   than surfaced as an error.

mod controller;
mod convert;
mod error;
mod mutate;
mod node;
mod store;
#[cfg(test)]
mod test_utils;

pub use crate::{
    controller::{ArmState, Intent, Selection, Template, TreeChange, TreeController},
    convert::{to_match_rules, to_tree_nodes, ConvertError, MatchRules},
    error::TreeError,
    mutate::{
        delete_subtree_by_key, find_node_by_key, find_parent_containing_key, insert_leaf,
        insert_leaf_under, insert_subgroup, relabel_group,
    },
    node::{
        build_empty_group, build_root_nodes, ComponentType, Criteria, CriteriaError, CriteriaKind,
        NodeKey, NodeKind, Operator, TreeNode,
    },
    store::{ArmId, MatchStore},
};
