//! Structured output for the pjdump stream dissector.
//!
//! Provides [`Row`], [`RowKind`], and [`RowSink`] — the append-only output
//! channel every scanner writes to — plus offset display formatting and the
//! diagnostic code constants in [`codes`]. Rows are immutable once created
//! and carry absolute file offsets; how an offset is rendered is a pure
//! display concern handled by [`format_offset`].

#![warn(missing_docs)]

/// Diagnostic code constants with compile-time typo detection.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

// ── Offset formatting ────────────────────────────────────────────────────

/// Radix used when rendering absolute file offsets for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetRadix {
    /// Plain decimal (`123456`).
    #[default]
    Decimal,
    /// Zero-padded uppercase hexadecimal (`0001E240`).
    Hex,
}

/// Render an absolute file offset in the given radix.
pub fn format_offset(offset: u64, radix: OffsetRadix) -> String {
    match radix {
        OffsetRadix::Decimal => offset.to_string(),
        OffsetRadix::Hex => format!("{offset:08X}"),
    }
}

// ── Spans ────────────────────────────────────────────────────────────────

/// A half-open `[start, end)` range of absolute file offsets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ByteSpan {
    /// Absolute offset of the first byte (0-based).
    pub start: u64,
    /// Absolute offset one past the last byte.
    pub end: u64,
}

impl ByteSpan {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(end >= start, "ByteSpan end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: u64) -> Self {
        Self { start: pos, end: pos }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ── Rows ─────────────────────────────────────────────────────────────────

/// Category of a description row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// A tolerated malformation or anomaly worth flagging.
    Warning,
    /// A decoded command or payload description.
    Data,
    /// Raw pass-through bytes rendered through the substitution policy.
    PlainText,
}

/// A single description row appended to a [`RowSink`].
///
/// `primary` is the prefix column (e.g. `@PJL COMMENT` for the first row of
/// a wrapped command); continuation rows carry an empty `primary` and an
/// empty `label`. Concatenating the `text` of a command's first row and its
/// continuation rows in order reproduces the raw parameter text exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Row category.
    pub kind: RowKind,
    /// Absolute file offset of the first byte this row describes.
    pub offset: u64,
    /// Short classification label (e.g. `"PJL Command"`, `"Warning"`).
    pub label: Cow<'static, str>,
    /// Prefix column; empty on continuation rows.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub primary: String,
    /// Row text: a wrapped display chunk or a warning message.
    pub text: String,
    /// Diagnostic code, present on `Warning` rows only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<Cow<'static, str>>,
}

impl Row {
    /// A `Warning` row with a diagnostic code.
    pub fn warning(offset: u64, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: RowKind::Warning,
            offset,
            label: Cow::Borrowed("Warning"),
            primary: String::new(),
            text: message.into(),
            code: Some(Cow::Borrowed(code)),
        }
    }

    /// A `Data` row carrying a prefix column.
    pub fn data(
        offset: u64,
        label: impl Into<Cow<'static, str>>,
        primary: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: RowKind::Data,
            offset,
            label: label.into(),
            primary: primary.into(),
            text: text.into(),
            code: None,
        }
    }

    /// A continuation row: the next wrapped chunk of a preceding `Data` row.
    pub fn continuation(offset: u64, text: impl Into<String>) -> Self {
        Self {
            kind: RowKind::Data,
            offset,
            label: Cow::Borrowed(""),
            primary: String::new(),
            text: text.into(),
            code: None,
        }
    }

    /// A `PlainText` row for pass-through data.
    pub fn plain(offset: u64, label: impl Into<Cow<'static, str>>, text: impl Into<String>) -> Self {
        Self {
            kind: RowKind::PlainText,
            offset,
            label: label.into(),
            primary: String::new(),
            text: text.into(),
            code: None,
        }
    }

    /// Returns the human-readable explanation for this row's diagnostic
    /// code, if it has one.
    pub fn explain(&self) -> Option<&'static str> {
        self.code.as_deref().and_then(explain)
    }
}

/// An append-only consumer of description rows.
///
/// Scanners only ever push; a sink never feeds back into parsing. `Vec<Row>`
/// implements this for collection, tests, and JSON output.
pub trait RowSink {
    /// Append one row.
    fn push_row(&mut self, row: Row);
}

impl RowSink for Vec<Row> {
    fn push_row(&mut self, row: Row) {
        self.push(row);
    }
}

// ── Explanations ─────────────────────────────────────────────────────────

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    Some(match id {
        codes::SCAN_UNEXPECTED_SEQUENCE => {
            "While PJL was the active language, a line began with '@' but the \
             four-byte '@PJL' introducer did not match. The bytes up to the \
             next escape character are shown as plain data and scanning \
             continues."
        }
        codes::SCAN_UNKNOWN_COMMAND => {
            "The command name is not in the PJL command-name table. The \
             command is still decoded and displayed; printers ignore PJL \
             lines they do not recognize."
        }
        codes::SCAN_MISSING_WHITESPACE => {
            "PJL requires whitespace between the command name and the '=' of \
             a modifier or option. The command was decoded anyway."
        }
        codes::SCAN_TERMINATOR_CAP => {
            "No line feed or escape character was found within the 1024-byte \
             command scan cap. The command was decoded from exactly the \
             capped bytes; the capture is likely truncated or corrupt."
        }
        codes::SCAN_INVALID_PML => {
            "The ASCIIHEX payload embedded in a DMCMD/DMINFO command is not \
             well-formed hex (odd length or a non-hex digit). The enclosing \
             command is unaffected."
        }
        codes::SCAN_UNKNOWN_LANGUAGE => {
            "The value of ENTER LANGUAGE= matched none of the recognized \
             personality names. The active language becomes Unknown and \
             subsequent bytes are scanned as opaque data."
        }
        codes::SCAN_CONTINUATION_MISMATCH => {
            "The driver re-presented a continuation window that does not \
             begin with the bytes recorded in the continuation ledger, \
             violating the input contract. Scanning resynchronizes on the \
             window as given."
        }
        codes::SCAN_TRUNCATED_DOWNLOAD => {
            "The stream ended before the byte count declared by a \
             FSDOWNLOAD/FSAPPEND SIZE= option was reached."
        }
        codes::SCAN_TRUNCATED_STREAM => {
            "The stream ended while a command was still incomplete. The \
             trailing bytes were not decoded; the capture is likely cut \
             short."
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_offset_decimal() {
        assert_eq!(format_offset(0, OffsetRadix::Decimal), "0");
        assert_eq!(format_offset(123_456, OffsetRadix::Decimal), "123456");
    }

    #[test]
    fn format_offset_hex_is_zero_padded() {
        assert_eq!(format_offset(0x1E240, OffsetRadix::Hex), "0001E240");
        assert_eq!(format_offset(0, OffsetRadix::Hex), "00000000");
    }

    #[test]
    fn warning_rows_carry_codes() {
        let row = Row::warning(10, codes::SCAN_UNKNOWN_COMMAND, "unknown command FROB");
        assert_eq!(row.kind, RowKind::Warning);
        assert_eq!(row.code.as_deref(), Some(codes::SCAN_UNKNOWN_COMMAND));
        assert!(row.explain().is_some());
    }

    #[test]
    fn continuation_rows_have_no_prefix() {
        let row = Row::continuation(60, "more text");
        assert!(row.primary.is_empty());
        assert!(row.label.is_empty());
        assert_eq!(row.kind, RowKind::Data);
    }

    #[test]
    fn every_code_has_an_explanation() {
        for code in [
            codes::SCAN_UNEXPECTED_SEQUENCE,
            codes::SCAN_UNKNOWN_COMMAND,
            codes::SCAN_MISSING_WHITESPACE,
            codes::SCAN_TERMINATOR_CAP,
            codes::SCAN_INVALID_PML,
            codes::SCAN_UNKNOWN_LANGUAGE,
            codes::SCAN_CONTINUATION_MISMATCH,
            codes::SCAN_TRUNCATED_DOWNLOAD,
            codes::SCAN_TRUNCATED_STREAM,
        ] {
            assert!(explain(code).is_some(), "missing explanation for {code}");
        }
        assert!(explain("PJD9999").is_none());
    }

    #[test]
    fn row_json_omits_empty_fields() {
        let row = Row::plain(5, "Data", "abc");
        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("\"primary\""));
        assert!(!json.contains("\"code\""));
    }
}
