//! Content composition.
//!
//! Turns a request into the single text payload that gets exported:
//!
//! - collected code (a file, stdin) passes through as is;
//! - input history is replayed range by range, each expression followed by an
//!   annotated result unless the expression ends with the terminator;
//! - output history is rendered value by value.
//!
//! Whatever the mode, a blank payload is rejected with
//! [`ComposeError::EmptyContent`] before anything is exported.

use std::fmt;

use tracing::debug;

use crate::annotate::annotate;
use crate::history::{HistoryRing, Inspect};
use crate::range::RangeSpec;

/// Statement terminator that suppresses result display in most REPLs.
pub const DEFAULT_TERMINATOR: char = ';';

/// The payload handed to an export sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedContent {
    pub text: String,
    /// Suggested filename; the dispatcher falls back to a default.
    pub filename: Option<String>,
}

/// Composition errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// The composed text is empty or whitespace only.
    EmptyContent,
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::EmptyContent => write!(f, "Found no code to paste."),
        }
    }
}

impl std::error::Error for ComposeError {}

/// Ordered list of ranges; order is kept and overlaps are not merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<RangeSpec>);

impl Selection {
    /// A selection of `ranges`, or the recent window when there are none.
    pub fn new(ranges: Vec<RangeSpec>) -> Self {
        if ranges.is_empty() {
            Self::default()
        } else {
            Self(ranges)
        }
    }

    pub fn ranges(&self) -> &[RangeSpec] {
        &self.0
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self(vec![RangeSpec::recent_window()])
    }
}

impl FromIterator<RangeSpec> for Selection {
    fn from_iter<I: IntoIterator<Item = RangeSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Builds export payloads from collected code or session history.
#[derive(Debug, Clone, Copy)]
pub struct Composer {
    terminator: char,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINATOR)
    }
}

impl Composer {
    pub fn new(terminator: char) -> Self {
        Self { terminator }
    }

    /// Wraps already collected code, rejecting blank text.
    pub fn collected(
        &self,
        text: String,
        filename: Option<String>,
    ) -> Result<ComposedContent, ComposeError> {
        if text.trim().is_empty() {
            return Err(ComposeError::EmptyContent);
        }
        Ok(ComposedContent { text, filename })
    }

    /// Composes input history with annotated results.
    pub fn input_history<I, O>(
        &self,
        selection: &Selection,
        inputs: &I,
        outputs: &O,
    ) -> Result<ComposedContent, ComposeError>
    where
        I: HistoryRing<Entry = String> + ?Sized,
        O: HistoryRing + ?Sized,
        O::Entry: Inspect,
    {
        self.collected(self.render_input_history(selection, inputs, outputs), None)
    }

    /// Composes output history values, one per line.
    pub fn output_history<O>(
        &self,
        selection: &Selection,
        outputs: &O,
    ) -> Result<ComposedContent, ComposeError>
    where
        O: HistoryRing + ?Sized,
        O::Entry: Inspect,
    {
        self.collected(self.render_output_history(selection, outputs), None)
    }

    /// Input history text without the blank check.
    ///
    /// Blank or evicted inputs are skipped. A result is annotated beneath its
    /// input unless the input ends with the terminator or no result was
    /// recorded at the same index.
    pub fn render_input_history<I, O>(
        &self,
        selection: &Selection,
        inputs: &I,
        outputs: &O,
    ) -> String
    where
        I: HistoryRing<Entry = String> + ?Sized,
        O: HistoryRing + ?Sized,
        O::Entry: Inspect,
    {
        let mut content = String::new();
        let length = inputs.len();

        for spec in selection.ranges() {
            let range = spec.resolve(length);
            debug!(%spec, length, first = range.first(), last = range.last(), "resolved input range");

            for index in range.indices() {
                let Some(code) = inputs.entry_at(index).filter(|code| !code.is_empty()) else {
                    continue;
                };
                content.push_str(code);

                if self.suppresses_result(code) {
                    continue;
                }
                let Some(result) = outputs.entry_at(index) else {
                    continue;
                };
                if !content.ends_with('\n') {
                    content.push('\n');
                }
                content.push_str(&annotate(&result.inspect()));
            }
        }

        content
    }

    /// Output history text without the blank check.
    pub fn render_output_history<O>(&self, selection: &Selection, outputs: &O) -> String
    where
        O: HistoryRing + ?Sized,
        O::Entry: Inspect,
    {
        let mut content = String::new();
        let length = outputs.len();

        for spec in selection.ranges() {
            let range = spec.resolve(length);
            debug!(%spec, length, first = range.first(), last = range.last(), "resolved output range");

            for value in range.indices().filter_map(|index| outputs.entry_at(index)) {
                content.push_str(&value.inspect());
                if !content.ends_with('\n') {
                    content.push('\n');
                }
            }
        }

        content
    }

    /// True when `code` ends with the terminator, ignoring one final line break.
    fn suppresses_result(&self, code: &str) -> bool {
        let code = code.strip_suffix('\n').unwrap_or(code);
        let code = code.strip_suffix('\r').unwrap_or(code);
        code.ends_with(self.terminator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Bound;

    fn spec(start: i64, end: i64) -> RangeSpec {
        RangeSpec::new(Bound::from(start), Bound::from(end))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_annotates_each_expression() {
        let inputs = strings(&["a = 1\n", "a + 1\n"]);
        let outputs = strings(&["1", "2"]);

        let content = Composer::default()
            .input_history(&Selection::new(vec![spec(0, 1)]), &inputs, &outputs)
            .unwrap();

        assert_eq!(content.text, "a = 1\n# => 1\na + 1\n# => 2\n");
        assert_eq!(content.filename, None);
    }

    #[test]
    fn test_terminator_suppresses_annotation() {
        let inputs = strings(&["x = load;\n", "x.size\n", "y = 2;"]);
        let outputs = strings(&["<big>", "3", "2"]);

        let content = Composer::default()
            .input_history(&Selection::new(vec![spec(0, -1)]), &inputs, &outputs)
            .unwrap();

        assert_eq!(content.text, "x = load;\nx.size\n# => 3\ny = 2;");
    }

    #[test]
    fn test_custom_terminator() {
        let inputs = strings(&["quiet\\\n", "loud\n"]);
        let outputs = strings(&["1", "2"]);

        let content = Composer::new('\\')
            .input_history(&Selection::new(vec![spec(0, 1)]), &inputs, &outputs)
            .unwrap();

        assert_eq!(content.text, "quiet\\\nloud\n# => 2\n");
    }

    #[test]
    fn test_overlapping_ranges_repeat_entries() {
        let inputs = strings(&["e0;", "e1;", "e2;", "e3;"]);
        let outputs: Vec<String> = Vec::new();

        let content = Composer::default()
            .input_history(
                &Selection::new(vec![spec(0, 2), spec(1, 3)]),
                &inputs,
                &outputs,
            )
            .unwrap();

        assert_eq!(content.text, "e0;e1;e2;e1;e2;e3;");
    }

    #[test]
    fn test_ranges_keep_request_order() {
        let inputs = strings(&["a;", "b;", "c;"]);
        let outputs: Vec<String> = Vec::new();

        let content = Composer::default()
            .input_history(&Selection::new(vec![spec(2, 2), spec(0, 0)]), &inputs, &outputs)
            .unwrap();

        assert_eq!(content.text, "c;a;");
    }

    #[test]
    fn test_negative_ranges_share_one_ring_length() {
        let inputs = strings(&["e0;", "e1;", "e2;", "e3;"]);
        let outputs: Vec<String> = Vec::new();
        let selection = Selection::new(vec![spec(-1, -1), spec(0, -3), spec(-2, -1)]);

        let content = Composer::default()
            .input_history(&selection, &inputs, &outputs)
            .unwrap();
        assert_eq!(content.text, "e3;e0;e1;e2;e2;e3;");

        let rendered = Composer::default().render_output_history(&selection, &inputs);
        assert_eq!(rendered, "e3;\ne0;\ne1;\ne2;\ne2;\ne3;\n");
    }

    #[test]
    fn test_blank_and_missing_inputs_are_skipped() {
        let inputs = strings(&["one\n", "", "three\n"]);
        let outputs = strings(&["1"]);

        let content = Composer::default()
            .input_history(&Selection::new(vec![spec(0, 10)]), &inputs, &outputs)
            .unwrap();

        // "three" has no recorded result, so it gets no annotation.
        assert_eq!(content.text, "one\n# => 1\nthree\n");
    }

    #[test]
    fn test_separator_added_before_annotation() {
        let inputs = strings(&["1 + 1"]);
        let outputs = strings(&["2"]);

        let content = Composer::default()
            .input_history(&Selection::default(), &inputs, &outputs)
            .unwrap();

        assert_eq!(content.text, "1 + 1\n# => 2\n");
    }

    #[test]
    fn test_multi_line_result_block() {
        let inputs = strings(&["config\n"]);
        let outputs = strings(&["{\n  debug: true\n}"]);

        let content = Composer::default()
            .input_history(&Selection::default(), &inputs, &outputs)
            .unwrap();

        assert_eq!(content.text, "config\n# => {\n#      debug: true\n#    }\n");
    }

    #[test]
    fn test_default_selection_is_recent_window() {
        let inputs: Vec<String> = (0..8).map(|n| format!("e{n};")).collect();
        let outputs: Vec<String> = Vec::new();
        let composer = Composer::default();

        let implicit = composer
            .render_input_history(&Selection::new(Vec::new()), &inputs, &outputs);
        let explicit =
            composer.render_input_history(&Selection::new(vec![spec(-5, -1)]), &inputs, &outputs);

        assert_eq!(implicit, explicit);
        assert_eq!(implicit, "e3;e4;e5;e6;e7;");
    }

    #[test]
    fn test_composition_is_repeatable() {
        let inputs = strings(&["a\n", "b;\n", "c\n"]);
        let outputs = strings(&["1", "2", "3\n4"]);
        let selection = Selection::new(vec![spec(-3, -1), spec(0, 0)]);
        let composer = Composer::default();

        let first = composer.input_history(&selection, &inputs, &outputs).unwrap();
        let second = composer.input_history(&selection, &inputs, &outputs).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_ring_is_empty_content() {
        let inputs: Vec<String> = Vec::new();
        let outputs: Vec<String> = Vec::new();

        let err = Composer::default()
            .input_history(&Selection::default(), &inputs, &outputs)
            .unwrap_err();

        assert_eq!(err, ComposeError::EmptyContent);
        assert_eq!(err.to_string(), "Found no code to paste.");
    }

    #[test]
    fn test_blank_entries_only_is_empty_content() {
        let inputs = strings(&["", "  \n", "\t"]);
        let outputs: Vec<String> = Vec::new();

        let result = Composer::default().input_history(
            &Selection::new(vec![spec(0, -1)]),
            &inputs,
            &outputs,
        );

        assert_eq!(result, Err(ComposeError::EmptyContent));
    }

    #[test]
    fn test_out_of_range_selection_is_empty_content() {
        let inputs = strings(&["a\n"]);
        let outputs = strings(&["1"]);

        let result = Composer::default().input_history(
            &Selection::new(vec![spec(5, 9), spec(3, 1)]),
            &inputs,
            &outputs,
        );

        assert_eq!(result, Err(ComposeError::EmptyContent));
    }

    #[test]
    fn test_collected_code_passes_through() {
        let content = Composer::default()
            .collected("def hi; end\n".to_string(), Some("hi.rb".to_string()))
            .unwrap();
        assert_eq!(content.text, "def hi; end\n");
        assert_eq!(content.filename.as_deref(), Some("hi.rb"));
    }

    #[test]
    fn test_collected_blank_is_rejected() {
        let result = Composer::default().collected(" \n\t".to_string(), None);
        assert_eq!(result, Err(ComposeError::EmptyContent));
    }

    #[test]
    fn test_output_history_one_value_per_line() {
        let outputs = strings(&["1", "two\nlines\n", "3"]);

        let content = Composer::default()
            .output_history(&Selection::new(vec![spec(0, 1), spec(-1, -1)]), &outputs)
            .unwrap();

        assert_eq!(content.text, "1\ntwo\nlines\n3\n");
    }
}
