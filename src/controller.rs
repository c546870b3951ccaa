//! Reacts to mutation intents from independent UI surfaces.
//!
//! Surfaces submit [`Intent`]s; the controller resolves them against the
//! active arm's tree, applies the mutation, recomputes the external-format
//! counterpart and publishes both to the [`MatchStore`] in one step. Each
//! reaction runs to completion before the next begins (single-threaded,
//! event-driven), so no two mutations ever interleave on the same tree.
//!
//! An intent whose key no longer resolves (say, after a delete) is logged
//! and dropped; stale keys must never crash a surface.

use crate::convert::{to_match_rules, to_tree_nodes, MatchRules};
use crate::error::TreeError;
use crate::mutate;
use crate::node::{
    build_empty_group, build_root_nodes, ComponentType, CriteriaKind, NodeKey, Operator, TreeNode,
};
use crate::store::{ArmId, MatchStore};
use tracing::{debug, warn};

/// A mutation request submitted by a UI surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Append a new leaf as a sibling of the referenced node.
    AddCriteria { node_key: NodeKey, kind: CriteriaKind },
    /// Append a new leaf under the referenced group itself.
    AddCriteriaToGroup { node_key: NodeKey, kind: CriteriaKind },
    /// Append a new empty subgroup under the referenced group.
    AddSubgroup { node_key: NodeKey },
    /// Delete the referenced node and its whole subtree.
    DeleteCriteria { node_key: NodeKey },
    /// Relabel the group *containing* the referenced node.
    OperatorChange { node_key: NodeKey, operator: Operator },
}

/// An initial tree requested by a surface instead of loading match rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Template {
    EmptyGroup {
        operator: Operator,
    },
    RootWithChild {
        operator: Operator,
        first_child: CriteriaKind,
    },
}

/// Where one arm's store slot stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArmState {
    /// No tree exists for the arm.
    Uninitialized,
    /// A tree is present and the form has not been edited yet.
    Loaded,
    /// The form-change counter has moved past zero.
    Editing,
}

/// The node a surface should select after a tree change.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub key: NodeKey,
    pub component: ComponentType,
}

/// Notification pushed to surfaces after a tree changes.
///
/// `selection` is `None` when the change leaves the current selection alone.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeChange {
    pub roots: Vec<TreeNode>,
    pub selection: Option<Selection>,
}

/// The sole writer of the [`MatchStore`].
///
/// # Examples
///
/// ```rust
/// use criteria_tree::{CriteriaKind, MatchRules, TreeController};
/// use serde_json::json;
///
/// let rules: MatchRules = serde_json::from_value(json!({
///     "match": [{"and": [{"type": "clinical", "age_numerical": ">=18"}]}]
/// }))
/// .unwrap();
///
/// let mut controller = TreeController::new();
/// let change = controller.activate_arm("arm_a", Some(&rules)).unwrap().unwrap();
/// let selected = change.selection.unwrap();
///
/// // Add a genomic sibling next to the selected clinical leaf.
/// let change = controller
///     .request_add_criteria(selected.key, CriteriaKind::Genomic)
///     .unwrap();
/// assert_eq!(2, change.roots[0].children().unwrap().len());
/// ```
#[derive(Debug, Default)]
pub struct TreeController {
    store: MatchStore,
    active_arm: Option<ArmId>,
    roots: Vec<TreeNode>,
}

impl TreeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access for surfaces. All mutation goes through intents.
    #[inline]
    pub fn store(&self) -> &MatchStore {
        &self.store
    }

    #[inline]
    pub fn active_arm(&self) -> Option<&ArmId> {
        self.active_arm.as_ref()
    }

    /// The working tree for the active arm.
    #[inline]
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn arm_state(&self, arm: &ArmId) -> ArmState {
        if !self.store.contains_arm(arm) {
            ArmState::Uninitialized
        } else if self.store.form_change_counter() == 0 {
            ArmState::Loaded
        } else {
            ArmState::Editing
        }
    }

    /// Makes `arm` the active arm.
    ///
    /// A tree already stored for the arm wins and is loaded from a cloned
    /// snapshot; otherwise non-empty `rules` are converted into a fresh
    /// tree. With neither, the arm stays uninitialized. On a conversion
    /// error nothing is published.
    pub fn activate_arm(
        &mut self,
        arm: impl Into<ArmId>,
        rules: Option<&MatchRules>,
    ) -> Result<Option<TreeChange>, TreeError> {
        let arm = arm.into();
        self.store.reset_form_change_counter();
        self.roots.clear();

        if let Some(stored) = self.store.view_model(&arm) {
            self.active_arm = Some(arm);
            self.roots = stored;
            return Ok(Some(self.change_selecting_first_child()));
        }

        match rules {
            Some(rules) if !rules.is_empty() => {
                let roots = to_tree_nodes(rules)?;
                self.roots = roots;
                self.store
                    .publish(&arm, self.roots.clone(), rules.clone());
                self.active_arm = Some(arm);
                Ok(Some(self.change_selecting_first_child()))
            }
            _ => {
                debug!(arm = %arm, "no stored tree and no match rules; arm stays uninitialized");
                self.active_arm = Some(arm);
                Ok(None)
            }
        }
    }

    /// Builds a template tree for the active arm instead of converting match
    /// rules. The alternate load path for arms that have no rules yet.
    pub fn build_template(&mut self, template: Template) -> Option<TreeChange> {
        let Some(arm) = self.active_arm.clone() else {
            warn!("template build requested with no active arm");
            return None;
        };
        self.roots = match template {
            Template::EmptyGroup { operator } => build_empty_group(operator),
            Template::RootWithChild {
                operator,
                first_child,
            } => build_root_nodes(operator, first_child),
        };
        self.store
            .publish(&arm, self.roots.clone(), to_match_rules(&self.roots));
        match template {
            Template::EmptyGroup { .. } => {
                let root = &self.roots[0];
                Some(TreeChange {
                    roots: self.roots.clone(),
                    selection: Some(Selection {
                        key: root.key().clone(),
                        component: ComponentType::None,
                    }),
                })
            }
            Template::RootWithChild { .. } => Some(self.change_selecting_first_child()),
        }
    }

    /// Applies a mutation intent to the active arm's tree.
    ///
    /// On success the new tree and its external format are published
    /// together and the form-change counter moves. A resolution miss leaves
    /// the store exactly as it was and returns `None`.
    pub fn apply(&mut self, intent: Intent) -> Option<TreeChange> {
        let Some(arm) = self.active_arm.clone() else {
            warn!(intent = ?intent, "intent submitted with no active arm");
            return None;
        };

        let outcome = match &intent {
            Intent::AddCriteria { node_key, kind } => {
                mutate::insert_leaf(&self.roots, node_key, *kind).map(|roots| (roots, None))
            }
            Intent::AddCriteriaToGroup { node_key, kind } => {
                mutate::insert_leaf_under(&self.roots, node_key, *kind).map(|roots| (roots, None))
            }
            Intent::AddSubgroup { node_key } => {
                mutate::insert_subgroup(&self.roots, node_key).map(|roots| (roots, None))
            }
            Intent::DeleteCriteria { node_key } => {
                mutate::delete_subtree_by_key(&self.roots, node_key).map(|roots| {
                    // After a delete the selection falls back to the root
                    // with no form open.
                    let selection = roots.first().map(|root| Selection {
                        key: root.key().clone(),
                        component: ComponentType::None,
                    });
                    (roots, selection)
                })
            }
            Intent::OperatorChange { node_key, operator } => {
                mutate::relabel_group(&self.roots, node_key, *operator).map(|roots| (roots, None))
            }
        };

        let Some((roots, selection)) = outcome else {
            debug!(intent = ?intent, "intent key did not resolve; ignoring");
            return None;
        };

        self.roots = roots;
        self.store.bump_form_change_counter();
        self.store
            .publish(&arm, self.roots.clone(), to_match_rules(&self.roots));
        Some(TreeChange {
            roots: self.roots.clone(),
            selection,
        })
    }

    /// The "form changed" signal: bumps the counter and re-serializes the
    /// current tree back to the store.
    pub fn notify_form_changed(&mut self) -> Option<TreeChange> {
        self.store.bump_form_change_counter();
        let arm = self.active_arm.clone()?;
        if self.roots.is_empty() {
            return None;
        }
        self.store
            .publish(&arm, self.roots.clone(), to_match_rules(&self.roots));
        Some(TreeChange {
            roots: self.roots.clone(),
            selection: None,
        })
    }

    pub fn request_add_criteria(&mut self, node_key: NodeKey, kind: CriteriaKind) -> Option<TreeChange> {
        self.apply(Intent::AddCriteria { node_key, kind })
    }

    pub fn request_delete_criteria(&mut self, node_key: NodeKey) -> Option<TreeChange> {
        self.apply(Intent::DeleteCriteria { node_key })
    }

    pub fn request_operator_change(
        &mut self,
        node_key: NodeKey,
        operator: Operator,
    ) -> Option<TreeChange> {
        self.apply(Intent::OperatorChange { node_key, operator })
    }

    /// Drops an arm's stored tree. Clears the working tree too when the arm
    /// is the active one.
    pub fn remove_arm(&mut self, arm: &ArmId) -> Option<Vec<TreeNode>> {
        if self.active_arm.as_ref() == Some(arm) {
            self.active_arm = None;
            self.roots.clear();
        }
        self.store.remove_arm(arm)
    }

    /// Selects the first child of the first root, the default after a load
    /// or a root+child build.
    fn change_selecting_first_child(&self) -> TreeChange {
        let selection = self
            .roots
            .first()
            .and_then(TreeNode::children)
            .and_then(<[TreeNode]>::first)
            .map(|node| Selection {
                key: node.key().clone(),
                component: node.component(),
            });
        TreeChange {
            roots: self.roots.clone(),
            selection,
        }
    }
}
