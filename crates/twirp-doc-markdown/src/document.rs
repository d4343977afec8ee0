//! Top-level document builder.

use std::io::{self, Write};

use crate::node::{Node, render_group};

/// A markdown document under construction.
///
/// Nodes are appended in document order and the whole document is written
/// once with [`Document::generate`], using the same block spacing as
/// [`Node::Group`].
#[derive(Debug, Default)]
pub struct Document {
    root: Vec<Node>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node at the end of the document.
    pub fn append(&mut self, node: impl Into<Node>) {
        self.root.push(node.into());
    }

    /// Append an optional node, skipping `None`.
    pub fn append_opt(&mut self, node: Option<Node>) {
        if let Some(node) = node {
            self.root.push(node);
        }
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Serialize the document to `w`, consuming it.
    pub fn generate(self, w: &mut dyn Write) -> io::Result<()> {
        render_group(&self.root, w)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::table::{Align, Table};

    fn generate(doc: Document) -> String {
        let mut out = Vec::new();
        doc.generate(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(generate(doc), "");
    }

    #[test]
    fn test_document_spacing() {
        let mut table = Table::new();
        table.add_column("Value", Align::Left);
        table.append_row(vec![Node::code("ONE")]);

        let mut doc = Document::new();
        doc.append(Node::h1(Node::text("Title")));
        doc.append(Node::paragraph(Node::code("acme.Service")));
        doc.append(Node::unordered_list(vec![Node::link("#a", "A")]));
        doc.append(Node::rule());
        doc.append(Node::h2(Node::text("Section")));
        doc.append(Node::code_block("{}", Some("json")));
        doc.append(table);
        assert_eq!(doc.len(), 7);

        assert_eq!(
            generate(doc),
            "# Title\n\n\
             `acme.Service`\n\n\
             * [A](#a)\n\n\
             ---\n\n\
             ## Section\n\n\
             ```json\n{}\n```\n\n\
             | Value |\n|:------|\n| `ONE` |\n"
        );
    }

    #[test]
    fn test_append_opt() {
        let mut doc = Document::new();
        doc.append_opt(None);
        doc.append_opt(Some(Node::text_paragraph("kept")));
        assert_eq!(doc.len(), 1);
        assert_eq!(generate(doc), "kept\n");
    }
}
