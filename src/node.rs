use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, PartialEq, Error)]
pub enum CriteriaError {
    #[error("'{0}' is not a boolean operator (expected 'and' or 'or')")]
    UnknownOperator(String),
    #[error("'{0}' is not a criteria type (expected 'clinical' or 'genomic')")]
    UnknownCriteriaType(String),
    #[error("leaf payload carries no 'type' discriminator")]
    MissingDiscriminator,
}

/// A key that uniquely identifies a node within a tree.
///
/// Keys are minted with [`NodeKey::generate()`] whenever a node is created;
/// the external matching-rule format does not carry them.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// The boolean operator carried by a group node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    /// The label shown on a group node ("And"/"Or").
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::And => "And",
            Self::Or => "Or",
        }
    }

    /// The lowercased key used by the external matching-rule format.
    #[inline]
    pub fn rule_key(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl FromStr for Operator {
    type Err = CriteriaError;

    /// Parses an operator name in any capitalization ("or", "OR", "Or", ...).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(CriteriaError::UnknownOperator(value.to_string())),
        }
    }
}

/// The type of criteria a leaf node holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CriteriaKind {
    Clinical,
    Genomic,
}

impl CriteriaKind {
    /// The label shown on a leaf node ("Clinical"/"Genomic").
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clinical => "Clinical",
            Self::Genomic => "Genomic",
        }
    }

    /// The value of the `type` discriminator in leaf payloads.
    #[inline]
    pub fn discriminator(self) -> &'static str {
        match self {
            Self::Clinical => "clinical",
            Self::Genomic => "genomic",
        }
    }

    /// The form component a surface should open for this criteria type.
    #[inline]
    pub fn component(self) -> ComponentType {
        match self {
            Self::Clinical => ComponentType::ClinicalForm,
            Self::Genomic => ComponentType::GenomicForm,
        }
    }
}

impl FromStr for CriteriaKind {
    type Err = CriteriaError;

    /// Parses a leaf payload discriminator, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "clinical" => Ok(Self::Clinical),
            "genomic" => Ok(Self::Genomic),
            _ => Err(CriteriaError::UnknownCriteriaType(value.to_string())),
        }
    }
}

/// The UI component associated with a selected node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComponentType {
    ClinicalForm,
    GenomicForm,
    None,
}

impl ComponentType {
    #[inline]
    fn as_str(self) -> &'static str {
        match self {
            Self::ClinicalForm => "ClinicalForm",
            Self::GenomicForm => "GenomicForm",
            Self::None => "None",
        }
    }
}

/// A single clinical or genomic matching predicate.
///
/// The payload is the verbatim leaf object from the external matching-rule
/// format. It is opaque pass-through data: the tree never interprets the
/// predicate fields and emits them unchanged on serialization.
#[derive(Clone, Debug, PartialEq)]
pub struct Criteria {
    kind: CriteriaKind,
    payload: Map<String, Value>,
}

impl Criteria {
    /// The discriminator field every leaf payload carries.
    pub const TYPE_FIELD: &'static str = "type";

    /// Create an empty criteria of the given kind, carrying only the
    /// discriminator. Used when a surface adds a fresh leaf before its form
    /// has been filled in.
    pub fn new(kind: CriteriaKind) -> Self {
        let mut payload = Map::new();
        payload.insert(
            Self::TYPE_FIELD.to_string(),
            Value::String(kind.discriminator().to_string()),
        );
        Self { kind, payload }
    }

    /// Create a criteria from a verbatim payload object.
    ///
    /// The payload must carry a recognized `type` discriminator.
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self, CriteriaError> {
        let discriminator = payload
            .get(Self::TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or(CriteriaError::MissingDiscriminator)?;
        let kind = discriminator.parse()?;
        Ok(Self { kind, payload })
    }

    #[inline]
    pub fn kind(&self) -> CriteriaKind {
        self.kind
    }

    #[inline]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group {
        operator: Operator,
        children: Vec<TreeNode>,
    },
    Leaf {
        criteria: Criteria,
    },
}

/// A node in the criteria tree.
///
/// A node is either a *group* (a boolean combination of its children) or a
/// *leaf* (a single clinical or genomic predicate); there is no third shape,
/// so a leaf can never grow children and a group label can never leave the
/// {And, Or} vocabulary.
///
/// # Examples
///
/// ```rust
/// use criteria_tree::{CriteriaKind, Operator, TreeNode};
///
/// let group = TreeNode::group(Operator::And);
/// let leaf = TreeNode::leaf(CriteriaKind::Clinical);
/// assert_eq!("And", group.label());
/// assert_eq!("Clinical", leaf.label());
/// assert_ne!(group.key(), leaf.key());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    key: NodeKey,
    kind: NodeKind,
}

impl TreeNode {
    /// Create an empty group node with a fresh key.
    pub fn group(operator: Operator) -> Self {
        Self::group_with(operator, Vec::new())
    }

    /// Create a group node with a fresh key and the given children.
    pub fn group_with(operator: Operator, children: Vec<TreeNode>) -> Self {
        Self {
            key: NodeKey::generate(),
            kind: NodeKind::Group { operator, children },
        }
    }

    /// Create an empty leaf node with a fresh key.
    pub fn leaf(kind: CriteriaKind) -> Self {
        Self::leaf_with(Criteria::new(kind))
    }

    /// Create a leaf node with a fresh key and the given criteria.
    pub fn leaf_with(criteria: Criteria) -> Self {
        Self {
            key: NodeKey::generate(),
            kind: NodeKind::Leaf { criteria },
        }
    }

    #[inline]
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    /// The label a surface renders for this node.
    pub fn label(&self) -> &'static str {
        match &self.kind {
            NodeKind::Group { operator, .. } => operator.label(),
            NodeKind::Leaf { criteria } => criteria.kind().label(),
        }
    }

    /// The form component a surface should open when this node is selected.
    pub fn component(&self) -> ComponentType {
        match &self.kind {
            NodeKind::Group { .. } => ComponentType::None,
            NodeKind::Leaf { criteria } => criteria.kind().component(),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match &self.kind {
            NodeKind::Group { operator, .. } => Some(*operator),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn criteria(&self) -> Option<&Criteria> {
        match &self.kind {
            NodeKind::Group { .. } => None,
            NodeKind::Leaf { criteria } => Some(criteria),
        }
    }

    pub fn children(&self) -> Option<&[TreeNode]> {
        match &self.kind {
            NodeKind::Group { children, .. } => Some(children),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<TreeNode>> {
        match &mut self.kind {
            NodeKind::Group { children, .. } => Some(children),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub(crate) fn set_operator(&mut self, new_operator: Operator) -> bool {
        match &mut self.kind {
            NodeKind::Group { operator, .. } => {
                *operator = new_operator;
                true
            }
            NodeKind::Leaf { .. } => false,
        }
    }
}

/// Serializes to the view shape surfaces consume:
/// `{key, label, data, children?}` where `data` carries the component type
/// and `children` is only present on groups.
impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = if self.is_group() { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(entries))?;
        map.serialize_entry("key", &self.key)?;
        map.serialize_entry("label", self.label())?;
        match &self.kind {
            NodeKind::Group { children, .. } => {
                map.serialize_entry("data", &Map::new())?;
                map.serialize_entry("children", children)?;
            }
            NodeKind::Leaf { criteria } => {
                let mut data = Map::new();
                data.insert(
                    "type".to_string(),
                    Value::String(criteria.kind().component().as_str().to_string()),
                );
                map.serialize_entry("data", &data)?;
            }
        }
        map.end()
    }
}

/// Build the initial tree for an arm: one group root holding a single empty
/// leaf of the given criteria type.
pub fn build_root_nodes(operator: Operator, first_child: CriteriaKind) -> Vec<TreeNode> {
    vec![TreeNode::group_with(
        operator,
        vec![TreeNode::leaf(first_child)],
    )]
}

/// Build the "empty group" template: one group root with no children.
pub fn build_empty_group(operator: Operator) -> Vec<TreeNode> {
    vec![TreeNode::group(operator)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_an_operator_in_any_capitalization() {
        assert_eq!(Ok(Operator::Or), "or".parse());
        assert_eq!(Ok(Operator::Or), "OR".parse());
        assert_eq!(Ok(Operator::And), "And".parse());
    }

    #[test]
    fn return_an_error_when_parsing_an_unknown_operator() {
        let result = "xor".parse::<Operator>();

        assert_eq!(Err(CriteriaError::UnknownOperator("xor".to_string())), result);
    }

    #[test]
    fn can_parse_a_criteria_discriminator_in_any_capitalization() {
        assert_eq!(Ok(CriteriaKind::Clinical), "Clinical".parse());
        assert_eq!(Ok(CriteriaKind::Genomic), "genomic".parse());
    }

    #[test]
    fn return_an_error_when_the_payload_has_no_discriminator() {
        let result = Criteria::from_payload(Map::new());

        assert_eq!(Err(CriteriaError::MissingDiscriminator), result);
    }

    #[test]
    fn generated_keys_are_unique() {
        let a_key = NodeKey::generate();
        let another_key = NodeKey::generate();

        assert_ne!(a_key, another_key);
    }

    #[test]
    fn build_root_nodes_yields_a_group_with_a_single_leaf() {
        let roots = build_root_nodes(Operator::And, CriteriaKind::Clinical);

        assert_eq!(1, roots.len());
        let root = &roots[0];
        assert_eq!("And", root.label());
        assert_eq!(ComponentType::None, root.component());
        let children = root.children().unwrap();
        assert_eq!(1, children.len());
        assert_eq!("Clinical", children[0].label());
        assert_eq!(ComponentType::ClinicalForm, children[0].component());
        assert!(children[0].children().is_none());
    }

    #[test]
    fn build_empty_group_yields_a_childless_group() {
        let roots = build_empty_group(Operator::And);

        assert_eq!(1, roots.len());
        assert!(roots[0].is_group());
        assert!(roots[0].children().unwrap().is_empty());
    }

    #[test]
    fn factories_never_alias_previously_built_nodes() {
        let first = build_root_nodes(Operator::And, CriteriaKind::Genomic);
        let second = build_root_nodes(Operator::And, CriteriaKind::Genomic);

        assert_ne!(first[0].key(), second[0].key());
        assert_ne!(
            first[0].children().unwrap()[0].key(),
            second[0].children().unwrap()[0].key()
        );
    }

    #[test]
    fn a_leaf_serializes_without_a_children_entry() {
        let leaf = TreeNode::leaf(CriteriaKind::Genomic);

        let value = serde_json::to_value(&leaf).unwrap();

        assert_eq!("Genomic", value["label"]);
        assert_eq!("GenomicForm", value["data"]["type"]);
        assert!(value.get("children").is_none());
    }

    #[test]
    fn a_group_serializes_with_its_children() {
        let roots = build_root_nodes(Operator::Or, CriteriaKind::Clinical);

        let value = serde_json::to_value(&roots[0]).unwrap();

        assert_eq!("Or", value["label"]);
        assert_eq!(1, value["children"].as_array().unwrap().len());
        assert_eq!("Clinical", value["children"][0]["label"]);
    }
}
