//! Owned markup tree.
//!
//! The parser hands back a [`ParsedNode`] tree that owns all of its data, so
//! the rest of the crate never touches the reference-counted DOM that
//! html5ever builds internally.

use std::io;

use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{LocalName, Namespace, QualName};

use crate::error::{Error, Result};

/// Namespace URI of HTML elements.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Payload of a markup node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// The document root
    Document,

    /// A `<!DOCTYPE name>` declaration
    Doctype {
        /// Doctype name (usually `html`)
        name: String,
    },

    /// An element with its attributes in source order
    Element {
        /// Qualified element name
        name: QualName,
        /// Attributes as (name, value) pairs
        attrs: Vec<(QualName, String)>,
    },

    /// A text node
    Text(String),

    /// A comment
    Comment(String),
}

/// A node in a parsed markup tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    data: NodeData,
    children: Vec<ParsedNode>,
}

impl ParsedNode {
    /// Create a node from raw data with no children.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    /// Create an empty document root.
    pub fn document() -> Self {
        Self::new(NodeData::Document)
    }

    /// Create an HTML element.
    pub fn element(tag: &str) -> Self {
        Self::new(NodeData::Element {
            name: html_name(tag),
            attrs: Vec::new(),
        })
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeData::Text(text.into()))
    }

    /// Create a comment node.
    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(NodeData::Comment(text.into()))
    }

    /// Create a doctype node.
    pub fn doctype(name: impl Into<String>) -> Self {
        Self::new(NodeData::Doctype { name: name.into() })
    }

    /// Add an attribute and return self. No-op on non-element nodes.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a child and return self.
    pub fn with_child(mut self, child: ParsedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a text child and return self.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(ParsedNode::text(text))
    }

    /// Node payload.
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[ParsedNode] {
        &self.children
    }

    /// Mutable access to the child list.
    pub fn children_mut(&mut self) -> &mut Vec<ParsedNode> {
        &mut self.children
    }

    /// Append a child node.
    pub fn push_child(&mut self, child: ParsedNode) {
        self.children.push(child);
    }

    /// Lowercase tag name for elements, `None` for every other node.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { name, .. } => Some(&*name.local),
            _ => None,
        }
    }

    /// Check whether this node is an element with the given tag name.
    pub fn is_element(&self, tag: &str) -> bool {
        self.tag_name() == Some(tag)
    }

    /// Get an attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match &self.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| &*n.local == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set (or replace) an attribute. No-op on non-element nodes.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        if let NodeData::Element { attrs, .. } = &mut self.data {
            let value = value.into();
            match attrs.iter_mut().find(|(n, _)| &*n.local == name) {
                Some((_, existing)) => *existing = value,
                None => attrs.push((attr_name(name), value)),
            }
        }
    }

    /// Text of the direct text children only.
    pub fn direct_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match &c.data {
                NodeData::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Concatenation of every descendant text node in document order,
    /// untrimmed. Comments are not text.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        if let NodeData::Text(t) = &self.data {
            out.push_str(t);
        }
        for node in self.descendants() {
            if let NodeData::Text(t) = &node.data {
                out.push_str(t);
            }
        }
        out
    }

    /// Pre-order iterator over every descendant (excluding `self`).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Every descendant element in document order.
    pub fn elements(&self) -> impl Iterator<Item = &ParsedNode> {
        self.descendants().filter(|n| n.tag_name().is_some())
    }

    /// Every descendant element whose tag is one of `tags`, searched through
    /// the whole subtree rather than direct children only.
    pub fn find_all(&self, tags: &[&str]) -> Vec<&ParsedNode> {
        self.elements()
            .filter(|n| n.tag_name().is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    /// First descendant element with the given tag.
    pub fn find_first(&self, tag: &str) -> Option<&ParsedNode> {
        self.elements().find(|n| n.is_element(tag))
    }

    /// First descendant element with the given tag, mutably.
    pub fn find_first_mut(&mut self, tag: &str) -> Option<&mut ParsedNode> {
        for child in self.children.iter_mut() {
            if child.is_element(tag) {
                return Some(child);
            }
            if let Some(found) = child.find_first_mut(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Serialize the tree back to HTML.
    pub fn to_html(&self) -> Result<String> {
        let mut buf = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        serialize(&mut buf, self, opts)
            .map_err(|e| Error::Parse(format!("markup serialization failed: {}", e)))?;
        String::from_utf8(buf)
            .map_err(|e| Error::Parse(format!("serialized markup is not UTF-8: {}", e)))
    }
}

impl Serialize for ParsedNode {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let include_self = matches!(traversal_scope, TraversalScope::IncludeNode);

        match &self.data {
            NodeData::Element { name, attrs } if include_self => {
                serializer.start_elem(name.clone(), attrs.iter().map(|(n, v)| (n, v.as_str())))?;
                for child in &self.children {
                    child.serialize(serializer, TraversalScope::IncludeNode)?;
                }
                serializer.end_elem(name.clone())
            }
            NodeData::Text(text) if include_self => serializer.write_text(text),
            NodeData::Comment(text) if include_self => serializer.write_comment(text),
            NodeData::Doctype { name } if include_self => serializer.write_doctype(name),
            _ => {
                for child in &self.children {
                    child.serialize(serializer, TraversalScope::IncludeNode)?;
                }
                Ok(())
            }
        }
    }
}

/// Pre-order traversal over a subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a ParsedNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ParsedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Qualified name of an HTML element.
pub(crate) fn html_name(tag: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag))
}

/// Qualified name of an attribute in no namespace.
pub(crate) fn attr_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}
