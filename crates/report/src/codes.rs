//! Diagnostic code constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. Each code has a human-readable explanation
//! retrievable via [`crate::explain`].

/// A sequence started like a PJL line but the `@PJL` introducer did not match.
pub const SCAN_UNEXPECTED_SEQUENCE: &str = "PJD1201";

/// Command name not present in the PJL command-name table.
pub const SCAN_UNKNOWN_COMMAND: &str = "PJD1202";

/// `=` followed the command name with no intervening whitespace.
pub const SCAN_MISSING_WHITESPACE: &str = "PJD1203";

/// No terminator found within the 1024-byte command scan cap.
pub const SCAN_TERMINATOR_CAP: &str = "PJD1204";

/// Embedded PML ASCII-hex payload failed to decode.
pub const SCAN_INVALID_PML: &str = "PJD1205";

/// `ENTER LANGUAGE=` value matched no recognized personality name.
pub const SCAN_UNKNOWN_LANGUAGE: &str = "PJD1206";

/// A continuation window did not begin with the bytes the ledger expected.
pub const SCAN_CONTINUATION_MISMATCH: &str = "PJD1207";

/// Input ended before a declared download payload was complete.
pub const SCAN_TRUNCATED_DOWNLOAD: &str = "PJD1208";

/// Input ended mid-command; the trailing bytes were not decoded.
pub const SCAN_TRUNCATED_STREAM: &str = "PJD1209";
