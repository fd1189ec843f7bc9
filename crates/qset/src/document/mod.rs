//! Hierarchical document projection of a row cursor.
//!
//! [`DocumentReader`] turns rows into a lazily produced element tree:
//!
//! ```text
//! <table>                      root (DocumentOptions::root_name)
//!   <row>                      one per row
//!     <A><B>1</B></A>          column "A$B"
//!     <D>x</D>                 column "D"
//!   </row>
//! </table>
//! ```
//!
//! Nodes are pulled one at a time with [`DocumentReader::read`] (or the
//! `Iterator` impl); [`writer`] renders them as XML text.

mod node;
mod options;
mod reader;
pub mod text;
pub mod writer;

#[cfg(test)]
mod tests;

pub use node::{DocumentNode, XS_NAMESPACE, XSI_NAMESPACE};
pub use options::{DocumentOptions, NullHandling, TypeAnnotation};
pub use reader::{DocumentReader, ReaderState};
pub use writer::{to_xml_string, write_document};
