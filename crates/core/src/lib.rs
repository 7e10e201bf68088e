//! pjdump core library.
//!
//! The streaming, language-switching scanner at the heart of the pjdump
//! stream dissector. Given bounded [`ByteWindow`]s over a captured printer
//! job stream, a [`Session`] decodes every PJL command it finds, detects
//! transitions between embedded printer languages, and reconstructs
//! commands that straddle window boundaries via the continuation ledger —
//! all without ever losing synchronization on malformed input.
//!
//! The main entry points are [`Session::scan`] for chunked input and
//! [`scan_bytes`] for whole-buffer convenience.

#![warn(missing_docs)]

/// Per-pass scan configuration.
pub mod options;
/// ASCII-hex decoding of embedded PML payloads.
pub mod pml;
/// Scanner core: window, continuation ledger, dispatcher, language grammars.
pub mod scan;
/// Character substitution for display text.
pub mod subst;

// ── Convenience re-exports ──────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Scanner
pub use scan::dispatch::{ScanStatus, ScanStep, Session, scan_bytes};
pub use scan::window::ByteWindow;

// Continuation ledger
pub use scan::cont::{ContKind, ContinuationLedger, ContinuationState};

// Configuration
pub use options::Options;
pub use subst::SubstPolicy;

// Output contract (re-exported from the report crate)
pub use pjdump_report::{ByteSpan, OffsetRadix, Row, RowKind, RowSink, codes, format_offset};

// Lookup tables (re-exported from the tables crate)
pub use pjdump_tables::{ActiveLanguage, CommandTable, match_language};
