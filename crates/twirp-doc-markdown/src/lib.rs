//! Composable markdown node tree with streaming serialization.
//!
//! Documents are assembled from [`Node`] values (text, emphasis, headers,
//! lists, fenced code blocks, tables, ...) and written to any
//! [`std::io::Write`] sink. Nothing is buffered beyond what a single node
//! needs: table cells are rendered to scratch strings to measure their width,
//! everything else streams straight to the sink.
//!
//! # Block spacing
//!
//! A [`Node::Group`] separates consecutive block-level children with one
//! blank line. The group only remembers the last two bytes it has written,
//! so spacing decisions never require holding rendered output in memory.
//!
//! # Example
//!
//! ```
//! use twirp_doc_markdown::{Align, Document, Node, Table};
//!
//! let mut table = Table::new();
//! table.add_column("Field", Align::Left);
//! table.append_text_row(&["name"]);
//!
//! let mut doc = Document::new();
//! doc.append(Node::h1(Node::text("Users")));
//! doc.append(Node::text_paragraph("Manages users."));
//! doc.append(table);
//!
//! let mut out = Vec::new();
//! doc.generate(&mut out).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "# Users\n\nManages users.\n\n| Field |\n|:------|\n| name  |\n"
//! );
//! ```

mod document;
mod error;
mod node;
mod table;
mod util;

pub use document::Document;
pub use error::MarkdownError;
pub use node::Node;
pub use table::{Align, Column, Table};
pub use util::{char_width, heading_anchor};
