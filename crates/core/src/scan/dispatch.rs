//! The dispatcher: per-session scan state and the top-level scan loop.
//!
//! A [`Session`] owns everything one analysis pass needs — options, the
//! active language, the continuation ledger, and the command table — so
//! independent analyses never share state. The driver repeatedly hands
//! [`Session::scan`] a [`ByteWindow`]; the session routes bytes to the
//! active language's scanner, reacts to switch signals in place, and
//! returns a [`ScanStep`] telling the driver how to shape the next window.

use super::binary::BinaryScanner;
use super::cont::{ContKind, ContinuationLedger, ContinuationState};
use super::pjl::{PjlScanner, scan_plain_data};
use super::window::ByteWindow;
use crate::options::Options;
use pjdump_report::{ByteSpan, Row, RowSink, codes};
use pjdump_tables::{ActiveLanguage, CommandTable};

// ─── Scanner strategy seam ──────────────────────────────────────────────

/// Read-only context shared with language scanners for one invocation.
pub(crate) struct ScanContext<'a> {
    /// Per-pass options.
    pub(crate) opts: &'a Options,
    /// PJL command-name table.
    pub(crate) table: &'a CommandTable,
    /// Language the dispatcher routed this invocation for.
    pub(crate) language: ActiveLanguage,
}

/// Outcome of one scanner invocation segment.
///
/// Exactly one of {progress, switch, continuation} holds; a scanner never
/// fails any other way.
pub(crate) enum Step {
    /// Consumed `consumed` bytes; the dispatcher may invoke again.
    Progress {
        /// Bytes consumed by this unit.
        consumed: usize,
    },
    /// The active language changed. `consumed` bytes belong to the old
    /// language; the new language starts at the next offset.
    Switch {
        /// Bytes consumed before the switch point.
        consumed: usize,
        /// The new active language.
        to: ActiveLanguage,
    },
    /// The window ended mid-token; retry with a corrected window.
    NeedMore {
        /// Bytes consumed before the backtrack point.
        consumed: usize,
        /// Continuation state for the ledger.
        cont: ContinuationState,
    },
}

/// A per-language command scanner (strategy object).
///
/// Implementations consume at most one logical unit per call — a command,
/// a data run, or a switch decision — so the dispatcher can enforce the
/// end-of-range check at every command boundary.
pub(crate) trait LanguageScanner {
    /// Scan one unit starting at window index `at`.
    fn scan_unit(
        &self,
        win: &ByteWindow<'_>,
        at: usize,
        cx: &ScanContext<'_>,
        sink: &mut dyn RowSink,
    ) -> Step;
}

// ─── Driver-facing results ──────────────────────────────────────────────

/// Why a call to [`Session::scan`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Every byte of the window was consumed.
    Exhausted,
    /// More input is needed. The driver must re-present the last
    /// `|backtrack|` bytes of this window before any newly read bytes.
    NeedMore {
        /// Non-positive re-present count.
        backtrack: i64,
    },
    /// The configured end-of-range offset was reached; stop scanning.
    EndOfRange,
}

/// Result of one [`Session::scan`] call.
#[derive(Debug, Clone, Copy)]
pub struct ScanStep {
    /// Bytes of the window consumed this call.
    pub consumed: usize,
    /// Why the call returned.
    pub status: ScanStatus,
    /// Absolute span scanned this call. Auxiliary bookkeeping for a
    /// pass-through overlay; not needed for parsing correctness.
    pub scanned: ByteSpan,
}

// ─── Session ────────────────────────────────────────────────────────────

/// Per-analysis scan state: options, active language, continuation ledger.
#[derive(Debug)]
pub struct Session<'t> {
    opts: Options,
    table: &'t CommandTable,
    language: ActiveLanguage,
    ledger: ContinuationLedger,
}

impl Session<'static> {
    /// A session over the builtin PJL command table, starting in PJL.
    pub fn new(opts: Options) -> Self {
        Self::with_table(opts, CommandTable::builtin())
    }
}

impl<'t> Session<'t> {
    /// A session over a caller-supplied command table, starting in PJL.
    pub fn with_table(opts: Options, table: &'t CommandTable) -> Self {
        Self {
            opts,
            table,
            language: ActiveLanguage::Pjl,
            ledger: ContinuationLedger::default(),
        }
    }

    /// The language the session currently believes it is interpreting.
    pub fn language(&self) -> ActiveLanguage {
        self.language
    }

    /// Override the active language (e.g. a capture known to start in PCL).
    pub fn set_language(&mut self, language: ActiveLanguage) {
        self.language = language;
    }

    /// The pending continuation, for driver inspection.
    pub fn continuation(&self) -> ContinuationState {
        self.ledger.get()
    }

    /// Scan one window, appending rows to `sink`.
    ///
    /// Language switches are handled internally: the dispatcher re-routes
    /// at the same offset and keeps going. The call returns only on window
    /// exhaustion, a continuation request, or the end-of-range offset.
    pub fn scan(&mut self, win: &ByteWindow<'_>, sink: &mut dyn RowSink) -> ScanStep {
        let mut at = 0usize;
        let pending = self.ledger.take();

        // Input-contract check: a re-presented window must start with the
        // prefix bytes recorded when the continuation was requested.
        if pending.kind == ContKind::PrefixPending && pending.prefix_len > 0 {
            let n = pending.prefix_len.min(pending.prefix.len()).min(win.len());
            if win.data()[..n] != pending.prefix[..n] {
                sink.push_row(Row::warning(
                    win.abs(0),
                    codes::SCAN_CONTINUATION_MISMATCH,
                    "continuation window does not begin with the expected bytes",
                ));
            }
        }

        // An in-progress download owns the front of the window.
        if pending.download_remaining > 0 {
            let take = (win.len() as u64).min(pending.download_remaining) as usize;
            if take > 0 {
                sink.push_row(Row::plain(
                    win.abs(0),
                    "Download Data",
                    format!("<{take} bytes of binary file data>"),
                ));
            }
            let left = pending.download_remaining - take as u64;
            if left > 0 {
                self.ledger
                    .record(ContinuationState::download(left, pending.partial_data_len + take));
                return ScanStep {
                    consumed: take,
                    status: ScanStatus::NeedMore { backtrack: 0 },
                    scanned: ByteSpan::new(win.abs(0), win.abs(take)),
                };
            }
            at = take;
        }

        // A recovery run interrupted at the previous window end resumes
        // directly: no introducer check, no second warning.
        let mut resume_unknown = pending.kind == ContKind::UnknownSequence;

        loop {
            if at >= win.len() {
                return self.done(win, at, ScanStatus::Exhausted);
            }
            if let Some(end) = self.opts.end_of_range
                && win.abs(at) > end
            {
                return self.done(win, at, ScanStatus::EndOfRange);
            }

            let cx = ScanContext {
                opts: &self.opts,
                table: self.table,
                language: self.language,
            };
            let step = if resume_unknown {
                resume_unknown = false;
                scan_plain_data(win, at, &cx, sink)
            } else {
                match self.language {
                    ActiveLanguage::Pjl => PjlScanner.scan_unit(win, at, &cx, sink),
                    _ => BinaryScanner.scan_unit(win, at, &cx, sink),
                }
            };
            match step {
                Step::Progress { consumed } => at += consumed,
                Step::Switch { consumed, to } => {
                    at += consumed;
                    self.language = to;
                }
                Step::NeedMore { consumed, cont } => {
                    at += consumed;
                    debug_assert_eq!(
                        at as i64 - cont.backtrack,
                        win.len() as i64,
                        "consumed + |backtrack| must cover the window"
                    );
                    let backtrack = cont.backtrack;
                    self.ledger.record(cont);
                    return self.done(win, at, ScanStatus::NeedMore { backtrack });
                }
            }
        }
    }

    /// Flush state at end of input: a leftover continuation means the
    /// capture was cut short, which is worth a warning row.
    pub fn finish(&mut self, eof_offset: u64, sink: &mut dyn RowSink) {
        let leftover = self.ledger.take();
        if leftover.is_none() {
            return;
        }
        if leftover.download_remaining > 0 {
            sink.push_row(Row::warning(
                eof_offset,
                codes::SCAN_TRUNCATED_DOWNLOAD,
                format!(
                    "input ended with {} bytes of a declared download payload missing",
                    leftover.download_remaining
                ),
            ));
        } else if leftover.kind == ContKind::UnknownSequence {
            sink.push_row(Row::warning(
                eof_offset,
                codes::SCAN_TRUNCATED_STREAM,
                "input ended inside an unrecognized sequence; trailing bytes were not decoded",
            ));
        } else {
            sink.push_row(Row::warning(
                eof_offset,
                codes::SCAN_TRUNCATED_STREAM,
                "input ended mid-command; trailing bytes were not decoded",
            ));
        }
    }

    fn done(&self, win: &ByteWindow<'_>, at: usize, status: ScanStatus) -> ScanStep {
        ScanStep {
            consumed: at,
            status,
            scanned: ByteSpan::new(win.abs(0), win.abs(at)),
        }
    }
}

// ─── Convenience entry point ────────────────────────────────────────────

/// Scan a complete in-memory capture in one pass.
///
/// Equivalent to driving a [`Session`] with a single window covering the
/// whole file. A trailing incomplete command is flagged with a truncation
/// warning rather than decoded.
pub fn scan_bytes(data: &[u8], opts: &Options) -> Vec<Row> {
    let mut session = Session::new(opts.clone());
    let mut rows = Vec::new();
    let step = session.scan(&ByteWindow::new(data, 0), &mut rows);
    if matches!(step.status, ScanStatus::NeedMore { .. }) {
        session.finish(data.len() as u64, &mut rows);
    }
    rows
}
