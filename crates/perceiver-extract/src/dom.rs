//! Serialized DOM snapshot captured from the live tab.
//!
//! The capture script runs inside the page and returns this tree as JSON;
//! the extraction strategies only ever see this detached copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ExtractError;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    /// Lower-case tag name.
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Text of the node's own text children, excluding descendants.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

impl DomNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attr("class", class)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DomNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Decode the JSON value returned by the capture script.
    pub fn from_value(value: Value) -> Result<Self, ExtractError> {
        if value.is_null() {
            return Err(ExtractError::InvalidSnapshot(
                "capture script returned null".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }

    pub fn is_heading(&self) -> bool {
        HEADING_TAGS.contains(&self.tag.as_str()) || self.attr("role") == Some("heading")
    }

    pub fn is_link(&self) -> bool {
        self.tag == "a" && self.has_attr("href")
    }

    pub fn href(&self) -> Option<&str> {
        if self.tag == "a" {
            self.attr("href")
        } else {
            None
        }
    }

    /// Pre-order iterator over this node and every descendant.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find_all<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a DomNode>
    where
        P: Fn(&DomNode) -> bool + 'a,
    {
        self.descendants().filter(move |node| predicate(node))
    }

    pub fn find_first<P>(&self, predicate: P) -> Option<&DomNode>
    where
        P: Fn(&DomNode) -> bool,
    {
        self.descendants().find(|node| predicate(node))
    }

    /// Whitespace-normalised text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        collect_text(self, &mut parts);
        normalize_whitespace(&parts.join(" "))
    }
}

fn collect_text<'a>(node: &'a DomNode, parts: &mut Vec<&'a str>) {
    if !node.text.trim().is_empty() {
        parts.push(node.text.as_str());
    }
    for child in &node.children {
        collect_text(child, parts);
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a DomNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DomNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DomNode {
        DomNode::element("div")
            .with_class("g result")
            .with_child(
                DomNode::element("a")
                    .with_attr("href", "https://example.com")
                    .with_child(DomNode::element("h3").with_text("Example  title")),
            )
            .with_child(DomNode::element("span").with_text("snippet\ntext"))
    }

    #[test]
    fn descendants_are_pre_order() {
        let root = sample();
        let tags: Vec<&str> = root.descendants().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["div", "a", "h3", "span"]);
    }

    #[test]
    fn text_content_normalizes_whitespace() {
        assert_eq!(sample().text_content(), "Example title snippet text");
    }

    #[test]
    fn class_matching_is_token_based() {
        let root = sample();
        assert!(root.has_class("g"));
        assert!(root.has_class("result"));
        assert!(!root.has_class("res"));
    }

    #[test]
    fn decodes_capture_script_payload() {
        let node = DomNode::from_value(json!({
            "tag": "body",
            "children": [{ "tag": "a", "attrs": { "href": "/x" }, "text": "x" }]
        }))
        .expect("decode");
        assert_eq!(node.children[0].href(), Some("/x"));
        assert!(DomNode::from_value(Value::Null).is_err());
    }
}
