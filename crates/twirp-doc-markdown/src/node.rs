//! Markdown node tree and its serialization.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::error::MarkdownError;
use crate::table::Table;
use crate::util::heading_anchor;

const NEWLINE: &[u8] = b"\n";
const HEADER_MARKS: &str = "######";
const FENCE: &str = "```";
const RULE: &[u8] = b"---\n";
const CELL_BREAK: &str = "<br/>";

/// A unit of a markdown document.
///
/// Nodes form a tree: composite variants own their children exclusively and
/// insertion order defines document order. Every variant knows how to write
/// itself to a byte sink via [`Node::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Renders nothing.
    Empty,
    /// Verbatim text.
    Text(String),
    /// `*...*`
    Italic(Box<Node>),
    /// `**...**`
    Bold(Box<Node>),
    /// Inline code span.
    Code(String),
    /// `#`-prefixed header line, level 1 to 6.
    Header { level: u8, content: Box<Node> },
    /// Inline content terminated by a newline.
    Paragraph(Box<Node>),
    /// `[label](href)`
    Link { href: String, label: String },
    /// One item per line, `N. ` or `* ` prefixed.
    List { ordered: bool, items: Vec<Node> },
    /// Fenced code block with an optional syntax tag.
    CodeBlock {
        content: String,
        syntax: Option<String>,
    },
    /// Aligned pipe table.
    Table(Table),
    /// Horizontal rule.
    Rule,
    /// Ordered sequence of nodes with block spacing.
    Group(Vec<Node>),
    /// Prefix and suffix bytes around a nested node.
    Wrap {
        prefix: Cow<'static, str>,
        suffix: Cow<'static, str>,
        content: Box<Node>,
    },
}

impl Node {
    /// Plain text.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Italic text around `content`.
    pub fn italic(content: Node) -> Self {
        Self::Italic(Box::new(content))
    }

    /// Italic plain text.
    pub fn text_italic(s: impl Into<String>) -> Self {
        Self::italic(Self::text(s))
    }

    /// Bold text around `content`.
    pub fn bold(content: Node) -> Self {
        Self::Bold(Box::new(content))
    }

    /// Bold plain text.
    pub fn text_bold(s: impl Into<String>) -> Self {
        Self::bold(Self::text(s))
    }

    /// Inline code span.
    pub fn code(s: impl Into<String>) -> Self {
        Self::Code(s.into())
    }

    /// Header of the given level.
    ///
    /// # Errors
    ///
    /// Returns [`MarkdownError::InvalidHeaderLevel`] unless `level` is in `1..=6`.
    pub fn header(level: u8, content: Node) -> Result<Self, MarkdownError> {
        if !(1..=6).contains(&level) {
            return Err(MarkdownError::InvalidHeaderLevel(level));
        }
        Ok(Self::Header {
            level,
            content: Box::new(content),
        })
    }

    /// Level 1 header (`# `).
    pub fn h1(content: Node) -> Self {
        Self::header_unchecked(1, content)
    }

    /// Level 2 header (`## `).
    pub fn h2(content: Node) -> Self {
        Self::header_unchecked(2, content)
    }

    /// Level 3 header (`### `).
    pub fn h3(content: Node) -> Self {
        Self::header_unchecked(3, content)
    }

    /// Level 4 header (`#### `).
    pub fn h4(content: Node) -> Self {
        Self::header_unchecked(4, content)
    }

    /// Level 5 header (`##### `).
    pub fn h5(content: Node) -> Self {
        Self::header_unchecked(5, content)
    }

    /// Level 6 header (`###### `).
    pub fn h6(content: Node) -> Self {
        Self::header_unchecked(6, content)
    }

    fn header_unchecked(level: u8, content: Node) -> Self {
        Self::Header {
            level,
            content: Box::new(content),
        }
    }

    /// Paragraph around `content`.
    pub fn paragraph(content: Node) -> Self {
        Self::Paragraph(Box::new(content))
    }

    /// Paragraph of plain text.
    pub fn text_paragraph(s: impl Into<String>) -> Self {
        Self::paragraph(Self::text(s))
    }

    /// Link to an arbitrary target.
    pub fn link(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Link {
            href: href.into(),
            label: label.into(),
        }
    }

    /// Link to the heading whose text is `heading` in the same document.
    pub fn link_to_header(heading: &str, label: impl Into<String>) -> Self {
        Self::link(format!("#{}", heading_anchor(heading)), label)
    }

    /// Bulleted list.
    pub fn unordered_list(items: Vec<Node>) -> Self {
        Self::List {
            ordered: false,
            items,
        }
    }

    /// Numbered list starting at 1.
    pub fn ordered_list(items: Vec<Node>) -> Self {
        Self::List {
            ordered: true,
            items,
        }
    }

    /// Fenced code block.
    pub fn code_block(content: impl Into<String>, syntax: Option<&str>) -> Self {
        Self::CodeBlock {
            content: content.into(),
            syntax: syntax.map(ToOwned::to_owned),
        }
    }

    /// Horizontal rule.
    pub fn rule() -> Self {
        Self::Rule
    }

    /// Group of nodes.
    ///
    /// An empty group is [`Node::Empty`] and a single node is returned as is.
    pub fn group(mut nodes: Vec<Node>) -> Self {
        match nodes.len() {
            0 => Self::Empty,
            1 => nodes.swap_remove(0),
            _ => Self::Group(nodes),
        }
    }

    /// Wrap a group of nodes with prefix and suffix text.
    pub fn wrap(
        prefix: impl Into<Cow<'static, str>>,
        suffix: impl Into<Cow<'static, str>>,
        nodes: Vec<Node>,
    ) -> Self {
        Self::Wrap {
            prefix: prefix.into(),
            suffix: suffix.into(),
            content: Box::new(Self::group(nodes)),
        }
    }

    /// Paragraph inside a table cell, terminated by an inline break.
    pub fn cell_paragraph(nodes: Vec<Node>) -> Self {
        Self::wrap("", CELL_BREAK, nodes)
    }

    /// Whether the rendered output of this node ends with a newline.
    ///
    /// Determined from the node's structure without rendering it.
    pub fn ends_with_newline(&self) -> bool {
        match self {
            Self::Empty
            | Self::Italic(_)
            | Self::Bold(_)
            | Self::Code(_)
            | Self::Link { .. } => false,
            Self::Text(s) => s.ends_with('\n'),
            Self::Header { .. }
            | Self::Paragraph(_)
            | Self::CodeBlock { .. }
            | Self::Table(_)
            | Self::Rule => true,
            Self::List { items, .. } => !items.is_empty(),
            Self::Group(nodes) => nodes.last().is_some_and(Self::ends_with_newline),
            Self::Wrap {
                suffix, content, ..
            } => {
                if suffix.is_empty() {
                    content.ends_with_newline()
                } else {
                    suffix.ends_with('\n')
                }
            }
        }
    }

    /// Write this node to `w`.
    ///
    /// Any write error aborts rendering and is returned unchanged.
    pub fn render(&self, w: &mut dyn Write) -> io::Result<()> {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => w.write_all(s.as_bytes()),
            Self::Italic(content) => write_wrapped(w, "*", content, "*"),
            Self::Bold(content) => write_wrapped(w, "**", content, "**"),
            Self::Code(s) => {
                w.write_all(b"`")?;
                w.write_all(s.as_bytes())?;
                w.write_all(b"`")
            }
            Self::Header { level, content } => {
                let marks = HEADER_MARKS
                    .get(..usize::from(*level))
                    .filter(|marks| !marks.is_empty())
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::InvalidInput,
                            MarkdownError::InvalidHeaderLevel(*level),
                        )
                    })?;
                w.write_all(marks.as_bytes())?;
                write_wrapped(w, " ", content, "\n")
            }
            Self::Paragraph(content) => write_wrapped(w, "", content, "\n"),
            Self::Link { href, label } => write!(w, "[{label}]({href})"),
            Self::List { ordered, items } => {
                for (i, item) in items.iter().enumerate() {
                    if *ordered {
                        write!(w, "{}. ", i + 1)?;
                    } else {
                        w.write_all(b"* ")?;
                    }
                    item.render(w)?;
                    w.write_all(NEWLINE)?;
                }
                Ok(())
            }
            Self::CodeBlock { content, syntax } => {
                w.write_all(FENCE.as_bytes())?;
                if let Some(syntax) = syntax {
                    w.write_all(syntax.as_bytes())?;
                }
                w.write_all(NEWLINE)?;
                w.write_all(content.as_bytes())?;
                w.write_all(NEWLINE)?;
                w.write_all(FENCE.as_bytes())?;
                w.write_all(NEWLINE)
            }
            Self::Table(table) => table.render(w),
            Self::Rule => w.write_all(RULE),
            Self::Group(nodes) => render_group(nodes, w),
            Self::Wrap {
                prefix,
                suffix,
                content,
            } => write_wrapped(w, prefix, content, suffix),
        }
    }

    /// Render this node into a string.
    pub fn render_to_string(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.render(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl From<Table> for Node {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

fn write_wrapped(w: &mut dyn Write, prefix: &str, content: &Node, suffix: &str) -> io::Result<()> {
    w.write_all(prefix.as_bytes())?;
    content.render(w)?;
    w.write_all(suffix.as_bytes())
}

/// Render sibling nodes, separating newline-terminated blocks by a blank line.
pub(crate) fn render_group(nodes: &[Node], w: &mut dyn Write) -> io::Result<()> {
    let mut tail = SuffixTracker::new(w);
    for node in nodes {
        if tail.ends_with_single_newline() && node.ends_with_newline() {
            tail.write_all(NEWLINE)?;
        }
        node.render(&mut tail)?;
    }
    Ok(())
}

/// Pass-through writer remembering the last two bytes written.
struct SuffixTracker<'a> {
    inner: &'a mut dyn Write,
    tail: [u8; 2],
    seen: usize,
}

impl<'a> SuffixTracker<'a> {
    fn new(inner: &'a mut dyn Write) -> Self {
        Self {
            inner,
            tail: [0; 2],
            seen: 0,
        }
    }

    fn remember(&mut self, bytes: &[u8]) {
        let start = bytes.len().saturating_sub(2);
        for &b in &bytes[start..] {
            self.tail = [self.tail[1], b];
        }
        self.seen = (self.seen + bytes.len()).min(2);
    }

    fn ends_with_single_newline(&self) -> bool {
        match self.seen {
            0 => false,
            1 => self.tail[1] == b'\n',
            _ => self.tail[1] == b'\n' && self.tail[0] != b'\n',
        }
    }
}

impl Write for SuffixTracker<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.remember(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
