//! XML backend built on `sxd-document` and `sxd-xpath`.
//!
//! [`XmlDocument`] implements the tree capabilities the engine runs against,
//! [`render`] turns a document back into text and [`copy_of`] goes the other
//! way, from an existing subtree to the directives that rebuild it.

pub mod copy;
pub mod document;
pub mod render;

pub use copy::copy_of;
pub use document::{parse_package, XmlDocument};
pub use render::{render, RenderOptions};
