//! Schema comments as markdown.

use twirp_doc_markdown::Node;

/// Leading comment as italic paragraphs, one per blank-line separated block.
///
/// Returns `None` for a missing or blank comment.
pub(crate) fn description_block(comment: Option<&str>) -> Option<Node> {
    let comment = comment?.trim();
    if comment.is_empty() {
        return None;
    }

    let paragraphs = comment
        .split("\n\n")
        .map(|part| Node::paragraph(Node::text_italic(part.trim().replace("\n ", "\n"))))
        .collect();
    Some(Node::group(paragraphs))
}

/// Comment flattened to a single table-cell line.
///
/// Blank lines become `<br/>` breaks and remaining newlines become spaces.
pub(crate) fn description_cell_text(comment: Option<&str>) -> Option<Node> {
    let comment = comment.filter(|c| !c.is_empty())?;
    let text = comment.replace("\n\n", "<br/>").replace('\n', " ");
    Some(Node::text(text.trim()))
}
