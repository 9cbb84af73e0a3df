//! [`Tree`] and [`PathQuery`] over an `sxd_document` DOM.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Document, ParentOfChild, Text};
use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};

use crate::dom::{PathQuery, Tree};
use crate::error::{DomError, QueryError, RenderError};

/// The XML `Name` production.
static XML_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_:][\p{L}\p{M}\p{N}_:.\-\x{B7}]*$").unwrap()
});

fn check_name(name: &str) -> Result<(), DomError> {
    if XML_NAME.is_match(name) {
        Ok(())
    } else {
        Err(DomError::InvalidName(name.to_string()))
    }
}

/// Parse XML text into a fresh package.
pub fn parse_package(xml: &str) -> Result<Package, RenderError> {
    sxd_document::parser::parse(xml).map_err(|err| RenderError::Parse(format!("{:?}", err)))
}

/// A mutable document driven through node handles.
///
/// The document node is [`Node::Root`]; elements, text, comments, processing
/// instructions and attributes are all reachable as [`Node`]s, which is what
/// XPath selection hands back.
///
/// The DOM has no CDATA node, so character data is stored as text and the
/// text nodes created by `CDATA` are remembered for [`render`](crate::xml::render).
pub struct XmlDocument<'d> {
    document: Document<'d>,
    cdata: HashSet<Text<'d>>,
}

impl<'d> XmlDocument<'d> {
    pub fn new(document: Document<'d>) -> Self {
        Self {
            document,
            cdata: HashSet::new(),
        }
    }

    /// Whether `text` was added as character data.
    pub fn is_cdata(&self, text: Text<'d>) -> bool {
        self.cdata.contains(&text)
    }

    pub fn document(&self) -> &Document<'d> {
        &self.document
    }

    fn compile(&self, expr: &str) -> Result<XPath, QueryError> {
        let malformed = |reason: String| QueryError::Malformed {
            expr: expr.to_string(),
            reason,
        };
        Factory::new()
            .build(expr)
            .map_err(|err| malformed(err.to_string()))?
            .ok_or_else(|| malformed("empty expression".to_string()))
    }

    fn evaluate(&self, expr: &str, context: Node<'d>) -> Result<Value<'d>, QueryError> {
        let xpath = self.compile(expr)?;
        let functions = Context::new();
        xpath
            .evaluate(&functions, context)
            .map_err(|err| QueryError::Evaluation {
                expr: expr.to_string(),
                reason: err.to_string(),
            })
    }

    fn unsupported(&self, operation: &'static str, node: Node<'d>) -> DomError {
        DomError::Unsupported {
            operation,
            path: self.path(node),
        }
    }
}

fn from_parent(parent: ParentOfChild<'_>) -> Node<'_> {
    match parent {
        ParentOfChild::Root(root) => Node::Root(root),
        ParentOfChild::Element(element) => Node::Element(element),
    }
}

impl<'d> Tree for XmlDocument<'d> {
    type Node = Node<'d>;

    fn root(&self) -> Node<'d> {
        Node::Root(self.document.root())
    }

    fn parent(&self, node: Node<'d>) -> Option<Node<'d>> {
        match node {
            Node::Element(element) => element.parent().map(from_parent),
            Node::Attribute(attribute) => attribute.parent().map(Node::Element),
            Node::Text(text) => text.parent().map(Node::Element),
            Node::Comment(comment) => comment.parent().map(from_parent),
            Node::ProcessingInstruction(pi) => pi.parent().map(from_parent),
            _ => None,
        }
    }

    fn name(&self, node: Node<'d>) -> Option<String> {
        match node {
            Node::Element(element) => Some(element.name().local_part().to_string()),
            Node::Attribute(attribute) => Some(attribute.name().local_part().to_string()),
            _ => None,
        }
    }

    fn element_children(&self, node: Node<'d>) -> Vec<Node<'d>> {
        match node {
            Node::Root(root) => root
                .children()
                .into_iter()
                .filter_map(|child| match child {
                    ChildOfRoot::Element(element) => Some(Node::Element(element)),
                    _ => None,
                })
                .collect(),
            Node::Element(element) => element
                .children()
                .into_iter()
                .filter_map(|child| match child {
                    ChildOfElement::Element(element) => Some(Node::Element(element)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn add_element(&mut self, parent: Node<'d>, name: &str) -> Result<Node<'d>, DomError> {
        check_name(name)?;
        match parent {
            Node::Root(root) => {
                let existing = root.children().into_iter().find_map(|child| match child {
                    ChildOfRoot::Element(element) => Some(element),
                    _ => None,
                });
                if let Some(element) = existing {
                    return Err(DomError::DuplicateDocumentElement(
                        element.name().local_part().to_string(),
                    ));
                }
                let element = self.document.create_element(name);
                root.append_child(element);
                Ok(Node::Element(element))
            }
            Node::Element(parent) => {
                let element = self.document.create_element(name);
                parent.append_child(element);
                Ok(Node::Element(element))
            }
            other => Err(self.unsupported("add an element to", other)),
        }
    }

    fn remove(&mut self, node: Node<'d>) -> Result<(), DomError> {
        let parent = self
            .parent(node)
            .ok_or_else(|| DomError::Detached(self.path(node)))?;
        match (parent, node) {
            (Node::Root(root), Node::Element(element)) => {
                root.remove_child(element);
            }
            (Node::Root(root), Node::Comment(comment)) => {
                root.remove_child(comment);
            }
            (Node::Root(root), Node::ProcessingInstruction(pi)) => {
                root.remove_child(pi);
            }
            (Node::Element(parent), Node::Element(element)) => {
                parent.remove_child(element);
            }
            (Node::Element(parent), Node::Text(text)) => {
                parent.remove_child(text);
            }
            (Node::Element(parent), Node::Comment(comment)) => {
                parent.remove_child(comment);
            }
            (Node::Element(parent), Node::ProcessingInstruction(pi)) => {
                parent.remove_child(pi);
            }
            (Node::Element(parent), Node::Attribute(attribute)) => {
                parent.remove_attribute(attribute.name());
            }
            (_, other) => return Err(self.unsupported("remove", other)),
        }
        Ok(())
    }

    fn set_text(&mut self, node: Node<'d>, text: &str) -> Result<(), DomError> {
        match node {
            Node::Element(element) => {
                element.set_text(text);
            }
            Node::Text(text_node) => {
                text_node.set_text(text);
            }
            Node::Attribute(attribute) => match attribute.parent() {
                Some(parent) => {
                    parent.set_attribute_value(attribute.name(), text);
                }
                None => return Err(DomError::Detached(self.path(node))),
            },
            other => return Err(self.unsupported("set the text of", other)),
        }
        Ok(())
    }

    fn set_attribute(&mut self, node: Node<'d>, name: &str, value: &str) -> Result<(), DomError> {
        check_name(name)?;
        match node {
            Node::Element(element) => {
                element.set_attribute_value(name, value);
                Ok(())
            }
            other => Err(self.unsupported("set an attribute on", other)),
        }
    }

    fn add_comment(&mut self, node: Node<'d>, text: &str) -> Result<(), DomError> {
        let comment = self.document.create_comment(text);
        match node {
            Node::Root(root) => {
                root.append_child(comment);
            }
            Node::Element(element) => {
                element.append_child(comment);
            }
            other => return Err(self.unsupported("add a comment to", other)),
        }
        Ok(())
    }

    fn add_cdata(&mut self, node: Node<'d>, text: &str) -> Result<(), DomError> {
        match node {
            Node::Element(element) => {
                let section = self.document.create_text(text);
                element.append_child(section);
                self.cdata.insert(section);
                Ok(())
            }
            other => Err(self.unsupported("add character data to", other)),
        }
    }

    fn add_processing_instruction(
        &mut self,
        node: Node<'d>,
        target: &str,
        data: &str,
    ) -> Result<(), DomError> {
        check_name(target)?;
        let pi = self
            .document
            .create_processing_instruction(target, (!data.is_empty()).then_some(data));
        match node {
            Node::Root(root) => {
                root.append_child(pi);
            }
            Node::Element(element) => {
                element.append_child(pi);
            }
            other => return Err(self.unsupported("add a processing instruction to", other)),
        }
        Ok(())
    }

    fn insert_before_document_element(&mut self, target: &str, data: &str) -> Result<(), DomError> {
        check_name(target)?;
        let pi = self
            .document
            .create_processing_instruction(target, (!data.is_empty()).then_some(data));
        let root = self.document.root();
        let children = root.children();
        for child in &children {
            root.remove_child(*child);
        }
        let mut inserted = false;
        for child in children {
            if !inserted && matches!(child, ChildOfRoot::Element(_)) {
                root.append_child(pi);
                inserted = true;
            }
            root.append_child(child);
        }
        if !inserted {
            root.append_child(pi);
        }
        Ok(())
    }

    fn is_attribute(&self, node: Node<'d>) -> bool {
        matches!(node, Node::Attribute(_))
    }
}

impl<'d> PathQuery for XmlDocument<'d> {
    fn select(&self, expr: &str, context: Node<'d>) -> Result<Vec<Node<'d>>, QueryError> {
        match self.evaluate(expr, context)? {
            Value::Nodeset(nodes) => Ok(nodes.document_order()),
            _ => Err(QueryError::NotANodeSet {
                expr: expr.to_string(),
            }),
        }
    }

    fn evaluate_string(&self, expr: &str, context: Node<'d>) -> Result<String, QueryError> {
        Ok(self.evaluate(expr, context)?.string())
    }
}
