//! Directives that rebuild an existing subtree.

use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_xpath::nodeset::Node;

use crate::error::ContentError;
use crate::script::Directives;

/// Directives that recreate the content of `node` under the current cursor.
///
/// For an element this is its attributes and children, not the element
/// itself; for the document node it is the document element (wrapped in
/// `ADD`/`UP`) with its surrounding comments and processing instructions.
/// Other kinds of node have no content to copy. Running the result on an
/// empty element of the same name reproduces `node`.
pub fn copy_of(node: Node<'_>) -> Result<Directives, ContentError> {
    let directives = Directives::new();
    match node {
        Node::Root(root) => {
            for child in root.children() {
                match child {
                    ChildOfRoot::Element(element) => copy_element(&directives, element)?,
                    ChildOfRoot::Comment(comment) => {
                        directives.comment(comment.text())?;
                    }
                    ChildOfRoot::ProcessingInstruction(pi) => {
                        directives.pi(pi.target(), pi.value().unwrap_or(""))?;
                    }
                }
            }
        }
        Node::Element(element) => copy_contents(&directives, element)?,
        _ => {}
    }
    Ok(directives)
}

fn copy_element(directives: &Directives, element: Element<'_>) -> Result<(), ContentError> {
    directives.add(element.name().local_part())?;
    copy_contents(directives, element)?;
    directives.up();
    Ok(())
}

fn copy_contents(directives: &Directives, element: Element<'_>) -> Result<(), ContentError> {
    for attribute in element.attributes() {
        directives.attr(attribute.name().local_part(), attribute.value())?;
    }

    let children = element.children();
    // Text-only content is one SET; mixed content keeps its order by
    // appending each text run.
    if !children.is_empty()
        && children
            .iter()
            .all(|child| matches!(child, ChildOfElement::Text(_)))
    {
        let text: String = children
            .iter()
            .filter_map(|child| match child {
                ChildOfElement::Text(text) => Some(text.text()),
                _ => None,
            })
            .collect();
        directives.set(text)?;
        return Ok(());
    }

    for child in children {
        match child {
            ChildOfElement::Element(nested) => copy_element(directives, nested)?,
            ChildOfElement::Text(text) => {
                if !text.text().trim().is_empty() {
                    directives.cdata(text.text())?;
                }
            }
            ChildOfElement::Comment(comment) => {
                directives.comment(comment.text())?;
            }
            ChildOfElement::ProcessingInstruction(pi) => {
                directives.pi(pi.target(), pi.value().unwrap_or(""))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{PathQuery, Tree};
    use crate::xml::{parse_package, XmlDocument};

    #[test]
    fn test_copy_of_element() {
        let package = parse_package("<a x='1'><b>text</b><!--note--><c/></a>").unwrap();
        let doc = XmlDocument::new(package.as_document());
        let a = doc.select("/a", doc.root()).unwrap()[0];
        let directives = copy_of(a).unwrap();
        assert_eq!(
            directives.to_string(),
            "ATTR \"x\", \"1\";ADD \"b\";SET \"text\";UP;COMMENT \"note\";ADD \"c\";UP;"
        );
    }

    #[test]
    fn test_copy_of_document() {
        let package = parse_package("<a><b/></a>").unwrap();
        let doc = XmlDocument::new(package.as_document());
        let directives = copy_of(doc.root()).unwrap();
        assert_eq!(directives.to_string(), "ADD \"a\";ADD \"b\";UP;UP;");
    }

    #[test]
    fn test_mixed_content_keeps_order() {
        let package = parse_package("<p>one<b/>two</p>").unwrap();
        let doc = XmlDocument::new(package.as_document());
        let p = doc.select("/p", doc.root()).unwrap()[0];
        assert_eq!(
            copy_of(p).unwrap().to_string(),
            "CDATA \"one\";ADD \"b\";UP;CDATA \"two\";"
        );
    }
}
