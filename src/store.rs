//! The shared store UI surfaces read from.
//!
//! One slot per arm holds that arm's view model (the tree), next to the
//! current external-format match model and the form-change counter. The
//! [`TreeController`](crate::controller::TreeController) is the store's sole
//! writer; writer methods are crate-private so the single-writer convention
//! is enforced by the interface rather than by discipline. Readers always
//! receive cloned snapshots, never references into live state.

use crate::convert::MatchRules;
use crate::node::TreeNode;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Identifies one arm: a named variant of a trial's matching rule set.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ArmId(String);

impl ArmId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArmId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ArmId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ArmId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Arm-keyed view models plus the current match model and form-change
/// counter.
#[derive(Clone, Debug, Default)]
pub struct MatchStore {
    view_models: HashMap<ArmId, Vec<TreeNode>>,
    match_model: MatchRules,
    form_change_counter: u64,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cloned snapshot of the stored tree for `arm`, if one exists.
    ///
    /// Switching away from an arm does not discard its tree; it stays
    /// retrievable unchanged until the arm is removed.
    pub fn view_model(&self, arm: &ArmId) -> Option<Vec<TreeNode>> {
        self.view_models.get(arm).cloned()
    }

    #[inline]
    pub fn contains_arm(&self, arm: &ArmId) -> bool {
        self.view_models.contains_key(arm)
    }

    /// The current external-format match model ("ctml match model").
    #[inline]
    pub fn match_model(&self) -> &MatchRules {
        &self.match_model
    }

    /// Distinguishes "dialog just opened" (0) from "user edited the form"
    /// (> 0).
    #[inline]
    pub fn form_change_counter(&self) -> u64 {
        self.form_change_counter
    }

    /// Stores both representations for `arm` in one step, so no reader can
    /// observe a tree without its matching external format.
    pub(crate) fn publish(&mut self, arm: &ArmId, roots: Vec<TreeNode>, rules: MatchRules) {
        self.view_models.insert(arm.clone(), roots);
        self.match_model = rules;
    }

    pub(crate) fn bump_form_change_counter(&mut self) -> u64 {
        self.form_change_counter += 1;
        self.form_change_counter
    }

    pub(crate) fn reset_form_change_counter(&mut self) {
        self.form_change_counter = 0;
    }

    pub(crate) fn remove_arm(&mut self, arm: &ArmId) -> Option<Vec<TreeNode>> {
        self.view_models.remove(arm)
    }
}
