use crate::node::{Criteria, NodeKind, Operator, TreeNode};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The external matching-rule object exchanged with the trial data source:
/// `{ "match": [ {"and": [...]} | {"or": [...]} | <leaf criteria>, ... ] }`,
/// recursively nested. The format carries no node keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRules {
    #[serde(rename = "match")]
    pub rules: Vec<Value>,
}

impl MatchRules {
    pub fn new(rules: Vec<Value>) -> Self {
        Self { rules }
    }

    /// Whether there is anything to build a tree from. An arm with empty
    /// rules stays uninitialized rather than producing an empty tree.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum ConvertError {
    #[error("element at {path} is not an object")]
    NotAnObject { path: String },
    #[error("boolean key '{operator}' at {path} does not hold a sequence")]
    RulesNotASequence { path: String, operator: String },
    #[error("element at {path} is neither a boolean group nor a recognized criteria leaf: {element}")]
    UnrecognizedElement { path: String, element: Value },
}

/// Convert an external matching-rule object into a tree, assigning a fresh
/// unique key to every node.
///
/// Each element of a `match`/boolean sequence must be either an object with
/// a single boolean key (`and`/`or`) holding a nested sequence, or a leaf
/// object carrying a recognized `type` discriminator. Anything else fails
/// with a [`ConvertError`] naming the offending element; no partial tree is
/// produced and no element is silently dropped.
///
/// # Examples
///
/// ```rust
/// use criteria_tree::{to_tree_nodes, MatchRules};
/// use serde_json::json;
///
/// let rules: MatchRules =
///     serde_json::from_value(json!({"match": [{"and": [{"type": "clinical", "age_numerical": ">=18"}]}]}))
///         .unwrap();
/// let roots = to_tree_nodes(&rules).unwrap();
/// assert_eq!("And", roots[0].label());
/// assert_eq!("Clinical", roots[0].children().unwrap()[0].label());
/// ```
pub fn to_tree_nodes(rules: &MatchRules) -> Result<Vec<TreeNode>, ConvertError> {
    convert_sequence(&rules.rules, "match")
}

fn convert_sequence(elements: &[Value], path: &str) -> Result<Vec<TreeNode>, ConvertError> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| convert_element(element, &format!("{path}[{index}]")))
        .collect()
}

fn convert_element(element: &Value, path: &str) -> Result<TreeNode, ConvertError> {
    let object = element.as_object().ok_or_else(|| ConvertError::NotAnObject {
        path: path.to_string(),
    })?;

    // A group is an object with exactly one entry whose key is a boolean
    // operator. An object mixing a boolean key with other fields is
    // malformed and must fall through to the failure below rather than be
    // half-read.
    if let Ok((key, nested)) = object.iter().exactly_one() {
        if let Ok(operator) = key.parse::<Operator>() {
            let elements = nested
                .as_array()
                .ok_or_else(|| ConvertError::RulesNotASequence {
                    path: path.to_string(),
                    operator: key.clone(),
                })?;
            let children = convert_sequence(elements, &format!("{path}.{key}"))?;
            return Ok(TreeNode::group_with(operator, children));
        }
    }

    match Criteria::from_payload(object.clone()) {
        Ok(criteria) => Ok(TreeNode::leaf_with(criteria)),
        Err(_) => Err(ConvertError::UnrecognizedElement {
            path: path.to_string(),
            element: element.clone(),
        }),
    }
}

/// Convert a tree back into the external matching-rule object.
///
/// The inverse of [`to_tree_nodes`]: groups become single-key objects under
/// their lowercased operator, leaves emit their stored payload verbatim, and
/// child order is preserved exactly. Total for every tree this crate can
/// construct, so the round trip through both functions returns the original
/// object (keys are not part of the external format).
pub fn to_match_rules(roots: &[TreeNode]) -> MatchRules {
    MatchRules::new(roots.iter().map(node_to_value).collect())
}

fn node_to_value(node: &TreeNode) -> Value {
    match node.kind() {
        NodeKind::Group { operator, children } => {
            let nested = children.iter().map(node_to_value).collect();
            let mut object = Map::new();
            object.insert(operator.rule_key().to_string(), Value::Array(nested));
            Value::Object(object)
        }
        NodeKind::Leaf { criteria } => Value::Object(criteria.payload().clone()),
    }
}
