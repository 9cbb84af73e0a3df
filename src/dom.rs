//! Capabilities the engine needs from a tree.
//!
//! The engine never touches a concrete DOM. It works through [`Tree`] for
//! structural edits and [`PathQuery`] for XPath-style selection, so any
//! backend that can hand out cheap, comparable node handles can be driven by
//! a script. [`crate::xml::XmlDocument`] is the bundled implementation.

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{DomError, QueryError};

/// Structural access to a mutable tree.
pub trait Tree {
    /// Handle to a node. Handles are compared for cursor de-duplication.
    type Node: Copy + Eq + Hash + Debug;

    /// The document node. It has no parent and holds at most one element.
    fn root(&self) -> Self::Node;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Element or attribute name; `None` for every other kind of node.
    fn name(&self, node: Self::Node) -> Option<String>;

    /// Element children in document order.
    fn element_children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Append a new element named `name` to `parent` and return it.
    fn add_element(&mut self, parent: Self::Node, name: &str) -> Result<Self::Node, DomError>;

    /// Detach `node` from its parent.
    fn remove(&mut self, node: Self::Node) -> Result<(), DomError>;

    /// Replace the whole text content of `node`.
    fn set_text(&mut self, node: Self::Node, text: &str) -> Result<(), DomError>;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    fn add_comment(&mut self, node: Self::Node, text: &str) -> Result<(), DomError>;

    fn add_cdata(&mut self, node: Self::Node, text: &str) -> Result<(), DomError>;

    fn add_processing_instruction(
        &mut self,
        node: Self::Node,
        target: &str,
        data: &str,
    ) -> Result<(), DomError>;

    /// Insert a processing instruction at document level, right before the
    /// document element, or last when there is none.
    fn insert_before_document_element(&mut self, target: &str, data: &str) -> Result<(), DomError>;

    /// Location of `node` as `/root/child[2]`.
    ///
    /// The position is only written when the parent has several elements of
    /// the same name. The document node is `/`.
    fn path(&self, node: Self::Node) -> String {
        let mut steps = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            let name = self.name(current).unwrap_or_else(|| "node()".to_string());
            let namesakes: Vec<Self::Node> = self
                .element_children(parent)
                .into_iter()
                .filter(|sibling| self.name(*sibling).as_deref() == Some(name.as_str()))
                .collect();
            let step = match namesakes.iter().position(|sibling| *sibling == current) {
                Some(index) if namesakes.len() > 1 => format!("{}[{}]", name, index + 1),
                Some(_) => name,
                None if self.is_attribute(current) => format!("@{}", name),
                None => name,
            };
            steps.push(step);
            current = parent;
        }
        steps.reverse();
        format!("/{}", steps.join("/"))
    }

    /// Whether `node` is an attribute, used only to prefix path steps.
    fn is_attribute(&self, _node: Self::Node) -> bool {
        false
    }
}

/// XPath-style evaluation over a [`Tree`].
pub trait PathQuery: Tree {
    /// Evaluate `expr` relative to `context`; it must yield a node-set,
    /// returned in document order.
    fn select(&self, expr: &str, context: Self::Node) -> Result<Vec<Self::Node>, QueryError>;

    /// Evaluate `expr` relative to `context` and convert the result to a
    /// string the way XPath's `string()` does.
    fn evaluate_string(&self, expr: &str, context: Self::Node) -> Result<String, QueryError>;
}
