//! Running scripts against trees.

use sxd_document::Package;
use tracing::{debug, warn};

use crate::dom::{PathQuery, Tree};
use crate::engine::{Cursor, Engine};
use crate::error::{ApplyError, XdResult};
use crate::script::Script;
use crate::xml::{render, RenderOptions, XmlDocument};

/// Apply `script` to `tree`, starting with the document node selected.
///
/// Stops at the first failing directive. Whatever the earlier directives did
/// to the tree stays done.
pub fn apply<T: PathQuery>(tree: &mut T, script: &Script) -> Result<(), ApplyError> {
    let mut engine = Engine::new(tree);
    let mut cursor = Cursor::single(engine.tree().root());
    for (index, directive) in script.iter().enumerate() {
        let position = index + 1;
        debug!(position, %directive, nodes = cursor.len(), "executing directive");
        cursor = engine
            .execute(directive, cursor)
            .map_err(|cause| ApplyError {
                position,
                directive: directive.to_string(),
                cause,
            })?;
    }
    debug!(directives = script.len(), nodes = cursor.len(), "script applied");
    Ok(())
}

/// A script bundled with the conveniences for running it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Runner {
    script: Script,
}

impl Runner {
    pub fn new(script: impl Into<Script>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn apply<T: PathQuery>(&self, tree: &mut T) -> Result<(), ApplyError> {
        apply(tree, &self.script)
    }

    /// Like [`Runner::apply`], but the failure is logged and dropped.
    /// Returns whether the script ran to the end.
    pub fn apply_quietly<T: PathQuery>(&self, tree: &mut T) -> bool {
        match self.apply(tree) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "ignoring failed script");
                false
            }
        }
    }

    /// Build a fresh document and render it with default options.
    pub fn xml(&self) -> XdResult<String> {
        self.xml_with(&RenderOptions::default())
    }

    /// Build a fresh document and render it with `options`.
    pub fn xml_with(&self, options: &RenderOptions) -> XdResult<String> {
        let package = Package::new();
        let mut document = XmlDocument::new(package.as_document());
        self.apply(&mut document)?;
        Ok(render(&document, options)?)
    }
}

impl From<Script> for Runner {
    fn from(script: Script) -> Self {
        Self::new(script)
    }
}
