//! Reference table of Twirp error codes.

use twirp_doc_markdown::{Align, Node, Table};

const DOCUMENTATION_URL: &str = "https://twitchtv.github.io/twirp/docs/spec_v7.html#error-codes";

/// Twirp error code with its HTTP status and meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: &'static str,
    pub http_status: u16,
    pub description: &'static str,
}

const fn code(code: &'static str, http_status: u16, description: &'static str) -> ErrorCode {
    ErrorCode {
        code,
        http_status,
        description,
    }
}

/// Every standard error code, ordered by HTTP status.
pub const ERROR_CODES: &[ErrorCode] = &[
    code(
        "invalid_argument",
        400,
        "The client specified an invalid argument. This indicates arguments that are invalid \
         regardless of the state of the system (i.e. a malformed file name, required argument, \
         number out of range, etc.).",
    ),
    code(
        "malformed",
        400,
        "The client sent a message which could not be decoded. This may mean that the message \
         was encoded improperly or that the client and server have incompatible message \
         definitions.",
    ),
    code(
        "out_of_range",
        400,
        "The operation was attempted past the valid range. For example, seeking or reading past \
         end of a paginated collection. Unlike \"invalid_argument\", this error indicates a \
         problem that may be fixed if the system state changes (i.e. adding more items to the \
         collection). There is a fair bit of overlap between \"failed_precondition\" and \
         \"out_of_range\". We recommend using \"out_of_range\" (the more specific error) when it \
         applies so that callers who are iterating through a space can easily look for an \
         \"out_of_range\" error to detect when they are done.",
    ),
    code(
        "unauthenticated",
        401,
        "The request does not have valid authentication credentials for the operation.",
    ),
    code(
        "permission_denied",
        403,
        "The caller does not have permission to execute the specified operation. It must not be \
         used if the caller cannot be identified (use \"unauthenticated\" instead).",
    ),
    code(
        "bad_route",
        404,
        "The requested URL path wasn't routable to a Twirp service and method. This is returned \
         by generated server code and should not be returned by application code (use \
         \"not_found\" or \"unimplemented\" instead).",
    ),
    code("not_found", 404, "Some requested entity was not found."),
    code("canceled", 408, "The operation was cancelled."),
    code(
        "deadline_exceeded",
        408,
        "Operation expired before completion. For operations that change the state of the \
         system, this error may be returned even if the operation has completed successfully \
         (timeout).",
    ),
    code(
        "already_exists",
        409,
        "An attempt to create an entity failed because one already exists.",
    ),
    code(
        "aborted",
        409,
        "The operation was aborted, typically due to a concurrency issue like sequencer check \
         failures, transaction aborts, etc.",
    ),
    code(
        "failed_precondition",
        412,
        "The operation was rejected because the system is not in a state required for the \
         operation's execution. For example, doing an rmdir operation on a directory that is \
         non-empty, or on a non-directory object, or when having conflicting read-modify-write \
         on the same resource.",
    ),
    code(
        "resource_exhausted",
        429,
        "Some resource has been exhausted or rate-limited, perhaps a per-user quota, or perhaps \
         the entire file system is out of space.",
    ),
    code(
        "unknown",
        500,
        "An unknown error occurred. For example, this can be used when handling errors raised by \
         APIs that do not return any error information.",
    ),
    code(
        "internal",
        500,
        "When some invariants expected by the underlying system have been broken. In other \
         words, something bad happened in the library or backend service. Twirp specific issues \
         like wire and serialization problems are also reported as \"internal\" errors.",
    ),
    code(
        "unavailable",
        500,
        "The service is currently unavailable. This is most likely a transient condition and \
         may be corrected by retrying with a backoff.",
    ),
    code(
        "unimplemented",
        501,
        "The operation is not implemented or not supported/enabled in this service.",
    ),
    code(
        "dataloss",
        503,
        "The operation resulted in unrecoverable data loss or corruption.",
    ),
];

/// Link to the official documentation followed by the error code table.
pub(crate) fn error_codes_section() -> Node {
    let mut table = Table::new();
    table.add_column("Twirp Error Code", Align::Left);
    table.add_column("HTTP Status", Align::Center);
    table.add_column("Description", Align::Left);

    for entry in ERROR_CODES {
        table.append_row(vec![
            Node::code(entry.code),
            Node::code(entry.http_status.to_string()),
            Node::text(entry.description),
        ]);
    }

    Node::group(vec![
        Node::paragraph(Node::link(DOCUMENTATION_URL, "Official documentation")),
        table.into(),
    ])
}
