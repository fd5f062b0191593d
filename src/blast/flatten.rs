//! Domain-agnostic flattening of an element tree
//!
//! A fixed allow-list of element names is treated as containers and becomes
//! an ordered sequence of flattened children. Every other element collapses to
//! its first text leaf, or to nothing when it has none. No BLAST semantics
//! live here; the positional mapping happens in [`super::report`].

use super::xml::{XmlChild, XmlNode};
use serde::Serialize;

/// Elements whose children are kept as an ordered sequence.
pub const CONTAINER_TAGS: [&str; 10] = [
    "Parameters",
    "BlastOutput_param",
    "Iteration_stat",
    "Statistics",
    "Hsp",
    "Iteration_hits",
    "BlastOutput_iterations",
    "Iteration",
    "Hit",
    "Hit_hsps",
];

/// Tag given to raw text leaves that sit directly inside a container.
pub const TEXT_TAG: &str = "#text";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatNode {
    pub tag: String,
    pub value: FlatValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Scalar(Option<String>),
    Sequence(Vec<FlatNode>),
}

impl FlatNode {
    pub fn scalar(tag: impl Into<String>, text: Option<String>) -> Self {
        Self {
            tag: tag.into(),
            value: FlatValue::Scalar(text),
        }
    }

    pub fn sequence(tag: impl Into<String>, items: Vec<FlatNode>) -> Self {
        Self {
            tag: tag.into(),
            value: FlatValue::Sequence(items),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            FlatValue::Scalar(text) => text.as_deref(),
            FlatValue::Sequence(_) => None,
        }
    }

    pub fn items(&self) -> Option<&[FlatNode]> {
        match &self.value {
            FlatValue::Sequence(items) => Some(items),
            FlatValue::Scalar(_) => None,
        }
    }

    pub fn is_text_leaf(&self) -> bool {
        self.tag == TEXT_TAG
    }
}

pub fn is_container(tag: &str) -> bool {
    CONTAINER_TAGS.contains(&tag)
}

/// Flatten every child of `node`, in document order.
pub fn flatten_children(node: &XmlNode) -> Vec<FlatNode> {
    node.children
        .iter()
        .map(|child| match child {
            XmlChild::Text(text) => FlatNode::scalar(TEXT_TAG, Some(text.clone())),
            XmlChild::Element(element) => flatten_node(element),
        })
        .collect()
}

/// Flatten a single element: containers recurse, everything else resolves to
/// its first text leaf.
pub fn flatten_node(node: &XmlNode) -> FlatNode {
    if is_container(&node.name) {
        FlatNode::sequence(node.name.clone(), flatten_children(node))
    } else {
        FlatNode::scalar(node.name.clone(), node.first_text().map(str::to_string))
    }
}
