//! Result annotations.
//!
//! Renders an evaluated value beneath the code that produced it, as a comment
//! block that stays valid code when pasted back into a session:
//!
//! ```text
//! user.attributes
//! # => {
//! #      "name": "ada"
//! #    }
//! ```

/// Marker for the first line of a result ("evaluates to").
pub const RESULT_MARKER: &str = "# => ";

/// Marker for every following line; same width as [`RESULT_MARKER`].
pub const CONTINUATION_MARKER: &str = "#    ";

/// Formats `result` as a newline-terminated comment block.
///
/// An empty result renders as a single marker line.
pub fn annotate(result: &str) -> String {
    let body = result.strip_suffix('\n').unwrap_or(result);
    let mut block = String::with_capacity(body.len() + RESULT_MARKER.len() * 2);

    for (index, line) in body.split('\n').enumerate() {
        block.push_str(if index == 0 {
            RESULT_MARKER
        } else {
            CONTINUATION_MARKER
        });
        block.push_str(line.strip_suffix('\r').unwrap_or(line));
        block.push('\n');
    }

    block
}
