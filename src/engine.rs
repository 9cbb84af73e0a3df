//! Directive execution.
//!
//! The engine folds directives over a [`Cursor`]: each one takes the current
//! node set and returns the next. The [`Stack`] of saved cursors lives as long
//! as the engine, which is one run of a script.

pub mod cursor;
pub mod stack;

pub use cursor::Cursor;
pub use stack::Stack;

use crate::directive::Directive;
use crate::dom::PathQuery;
use crate::error::ModificationError;

/// Executes directives against one tree.
pub struct Engine<'t, T: PathQuery> {
    tree: &'t mut T,
    stack: Stack<T::Node>,
}

impl<'t, T: PathQuery> Engine<'t, T> {
    pub fn new(tree: &'t mut T) -> Self {
        Self {
            tree,
            stack: Stack::new(),
        }
    }

    pub fn tree(&self) -> &T {
        &*self.tree
    }

    pub fn stack(&self) -> &Stack<T::Node> {
        &self.stack
    }

    /// Apply `directive` to every node of `cursor` and return the new cursor.
    ///
    /// A failure may leave the tree partially modified.
    pub fn execute(
        &mut self,
        directive: &Directive,
        cursor: Cursor<T::Node>,
    ) -> Result<Cursor<T::Node>, ModificationError> {
        match directive {
            Directive::Add(name) => self.add(&cursor, name.raw()),
            Directive::AddIfAbsent(name) => self.add_if_absent(&cursor, name.raw()),
            Directive::Remove => self.remove(&cursor),
            Directive::SetText(text) => {
                for node in cursor.iter() {
                    self.tree.set_text(node, text.raw())?;
                }
                Ok(cursor)
            }
            Directive::SetAttr { name, value } => {
                for node in cursor.iter() {
                    self.tree.set_attribute(node, name.raw(), value.raw())?;
                }
                Ok(cursor)
            }
            Directive::SetComputedAttr { name, query } => {
                for (node, value) in self.evaluate_each(&cursor, query.raw())? {
                    self.tree.set_attribute(node, name.raw(), &value)?;
                }
                Ok(cursor)
            }
            Directive::SetComputedText(query) => {
                for (node, value) in self.evaluate_each(&cursor, query.raw())? {
                    self.tree.set_text(node, &value)?;
                }
                Ok(cursor)
            }
            Directive::AddComment(text) => {
                for node in cursor.iter() {
                    self.tree.add_comment(node, text.raw())?;
                }
                Ok(cursor)
            }
            Directive::AddCData(text) => {
                for node in cursor.iter() {
                    self.tree.add_cdata(node, text.raw())?;
                }
                Ok(cursor)
            }
            Directive::AddProcessingInstruction { target, data } => {
                if cursor.is_empty() {
                    self.tree
                        .insert_before_document_element(target.raw(), data.raw())?;
                }
                for node in cursor.iter() {
                    self.tree
                        .add_processing_instruction(node, target.raw(), data.raw())?;
                }
                Ok(cursor)
            }
            Directive::AddNamespace(uri) => {
                for node in cursor.iter() {
                    self.tree.set_attribute(node, "xmlns", uri.raw())?;
                }
                Ok(cursor)
            }
            Directive::Up => self.parents(&cursor, "go UP"),
            Directive::NavigateTo(query) => {
                let root = self.tree.root();
                Ok(self.tree.select(query.raw(), root)?.into_iter().collect())
            }
            Directive::AssertCount(expected) => {
                self.assert_count(&cursor, *expected)?;
                Ok(cursor)
            }
            Directive::Push => {
                self.stack.push(&cursor);
                Ok(cursor)
            }
            Directive::Pop => self.stack.pop(),
        }
    }

    fn add(&mut self, cursor: &Cursor<T::Node>, name: &str) -> Result<Cursor<T::Node>, ModificationError> {
        let mut created = Vec::with_capacity(cursor.len());
        for node in cursor.iter() {
            created.push(self.tree.add_element(node, name)?);
        }
        Ok(created.into_iter().collect())
    }

    fn add_if_absent(
        &mut self,
        cursor: &Cursor<T::Node>,
        name: &str,
    ) -> Result<Cursor<T::Node>, ModificationError> {
        let mut targets = Vec::with_capacity(cursor.len());
        for node in cursor.iter() {
            let existing = self.tree.element_children(node).into_iter().find(|child| {
                self.tree
                    .name(*child)
                    .is_some_and(|found| found.eq_ignore_ascii_case(name))
            });
            let target = match existing {
                Some(child) => child,
                None => self.tree.add_element(node, name)?,
            };
            targets.push(target);
        }
        Ok(targets.into_iter().collect())
    }

    fn remove(&mut self, cursor: &Cursor<T::Node>) -> Result<Cursor<T::Node>, ModificationError> {
        let parents = self.parents(cursor, "REMOVE")?;
        for node in cursor.iter() {
            self.tree.remove(node)?;
        }
        Ok(parents)
    }

    /// Distinct parents of the cursor, failing on the first node without one.
    fn parents(
        &self,
        cursor: &Cursor<T::Node>,
        action: &'static str,
    ) -> Result<Cursor<T::Node>, ModificationError> {
        let mut parents = Vec::with_capacity(cursor.len());
        for node in cursor.iter() {
            match self.tree.parent(node) {
                Some(parent) => parents.push(parent),
                None => {
                    return Err(ModificationError::NoParent {
                        path: self.tree.path(node),
                        action,
                    })
                }
            }
        }
        Ok(parents.into_iter().collect())
    }

    /// Evaluate `query` against every node before anything is changed, so no
    /// evaluation sees the result of another.
    fn evaluate_each(
        &self,
        cursor: &Cursor<T::Node>,
        query: &str,
    ) -> Result<Vec<(T::Node, String)>, ModificationError> {
        let mut values = Vec::with_capacity(cursor.len());
        for node in cursor.iter() {
            values.push((node, self.tree.evaluate_string(query, node)?));
        }
        Ok(values)
    }

    fn assert_count(&self, cursor: &Cursor<T::Node>, expected: usize) -> Result<(), ModificationError> {
        if cursor.len() == expected {
            return Ok(());
        }
        let message = match cursor.nodes() {
            [] => format!("no current nodes while {} expected", expected),
            [node] => format!(
                "1 current node '{}' while strictly {} expected",
                self.tree.path(*node),
                expected
            ),
            nodes => format!(
                "{} current nodes while strictly {} expected",
                nodes.len(),
                expected
            ),
        };
        Err(ModificationError::Cardinality {
            expected,
            actual: cursor.len(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Tree;
    use crate::xml::XmlDocument;
    use sxd_document::Package;

    fn run<'d>(
        engine: &mut Engine<'_, XmlDocument<'d>>,
        directives: &[Directive],
        mut cursor: Cursor<<XmlDocument<'d> as Tree>::Node>,
    ) -> Result<Cursor<<XmlDocument<'d> as Tree>::Node>, ModificationError> {
        for directive in directives {
            cursor = engine.execute(directive, cursor)?;
        }
        Ok(cursor)
    }

    #[test]
    fn test_add_keeps_cardinality() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let cursor = run(
            &mut engine,
            &[
                Directive::add("r").unwrap(),
                Directive::add("a").unwrap(),
                Directive::Up,
                Directive::add("a").unwrap(),
                Directive::Up,
                Directive::xpath("/r/a").unwrap(),
                Directive::add("b").unwrap(),
            ],
            Cursor::single(root),
        )
        .unwrap();
        assert_eq!(cursor.len(), 2);
    }

    #[test]
    fn test_up_collapses_to_distinct_parents() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let cursor = run(
            &mut engine,
            &[
                Directive::add("r").unwrap(),
                Directive::add("a").unwrap(),
                Directive::Up,
                Directive::add("a").unwrap(),
                Directive::xpath("/r/a").unwrap(),
                Directive::Up,
            ],
            Cursor::single(root),
        )
        .unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(engine.tree().path(cursor.nodes()[0]), "/r");
    }

    #[test]
    fn test_up_from_document_fails() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let error = engine.execute(&Directive::Up, Cursor::single(root)).unwrap_err();
        assert_eq!(error.to_string(), "there is no parent node at /, can't go UP");
    }

    #[test]
    fn test_remove_returns_parents() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let cursor = run(
            &mut engine,
            &[
                Directive::add("r").unwrap(),
                Directive::add("a").unwrap(),
                Directive::Up,
                Directive::add("b").unwrap(),
                Directive::xpath("/r/*").unwrap(),
                Directive::Remove,
            ],
            Cursor::single(root),
        )
        .unwrap();
        assert_eq!(cursor.len(), 1);
        let parent = cursor.nodes()[0];
        assert!(engine.tree().element_children(parent).is_empty());
    }

    #[test]
    fn test_add_if_absent_ignores_case() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let cursor = run(
            &mut engine,
            &[
                Directive::add("r").unwrap(),
                Directive::add("Node").unwrap(),
                Directive::Up,
                Directive::add_if_absent("node").unwrap(),
                Directive::Up,
            ],
            Cursor::single(root),
        )
        .unwrap();
        assert_eq!(engine.tree().element_children(cursor.nodes()[0]).len(), 1);
    }

    #[test]
    fn test_computed_attribute_reads_before_writing() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        run(
            &mut engine,
            &[
                Directive::add("r").unwrap(),
                Directive::add("i").unwrap(),
                Directive::Up,
                Directive::add("i").unwrap(),
                Directive::Up,
                Directive::xpath("/r/i").unwrap(),
                Directive::xattr("n", "count(/r/i[@n])").unwrap(),
            ],
            Cursor::single(root),
        )
        .unwrap();
        let values: Vec<String> = engine
            .tree()
            .select("/r/i/@n", root)
            .unwrap()
            .into_iter()
            .map(|node| engine.tree().evaluate_string("string(.)", node).unwrap())
            .collect();
        assert_eq!(values, vec!["0", "0"]);
    }

    #[test]
    fn test_strict_messages() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let single = run(&mut engine, &[Directive::add("r").unwrap()], Cursor::single(root)).unwrap();

        let error = engine
            .execute(&Directive::strict(2), single.clone())
            .unwrap_err();
        assert_eq!(error.to_string(), "1 current node '/r' while strictly 2 expected");

        let error = engine
            .execute(&Directive::strict(1), Cursor::empty())
            .unwrap_err();
        assert_eq!(error.to_string(), "no current nodes while 1 expected");

        let same = engine.execute(&Directive::strict(1), single.clone()).unwrap();
        assert_eq!(same, single);
    }

    #[test]
    fn test_push_pop_restores_cursor() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let start = run(&mut engine, &[Directive::add("r").unwrap()], Cursor::single(root)).unwrap();
        let end = run(
            &mut engine,
            &[
                Directive::Push,
                Directive::add("deep").unwrap(),
                Directive::add("deeper").unwrap(),
                Directive::Pop,
            ],
            start.clone(),
        )
        .unwrap();
        assert_eq!(end, start);
        assert!(engine.stack().is_empty());
        assert_eq!(
            engine.execute(&Directive::Pop, end),
            Err(ModificationError::EmptyStack)
        );
    }

    #[test]
    fn test_navigate_to_empty_result_is_fine() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let cursor = run(
            &mut engine,
            &[
                Directive::add("r").unwrap(),
                Directive::xpath("/r/missing").unwrap(),
                Directive::add("ignored").unwrap(),
            ],
            Cursor::single(root),
        )
        .unwrap();
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_navigate_to_scalar_fails() {
        let package = Package::new();
        let mut doc = XmlDocument::new(package.as_document());
        let root = doc.root();
        let mut engine = Engine::new(&mut doc);
        let error = engine
            .execute(&Directive::xpath("1 + 1").unwrap(), Cursor::single(root))
            .unwrap_err();
        assert!(matches!(error, ModificationError::Query(_)));
    }
}
