//! Opaque-data scanner for non-PJL languages.
//!
//! Full PCL / PCL XL / HP-GL/2 / PostScript grammars plug into the same
//! dispatch machinery as PJL; until they do, every non-PJL language is
//! scanned by this strategy, which summarizes byte runs and watches for
//! the Universal Exit Language sequence (`ESC %-12345X`) that returns the
//! stream to PJL. A UEL cut off by the window end is resumed via the
//! continuation ledger, with the matched prefix recorded so the dispatcher
//! can verify the driver re-presented the right bytes.

use super::cont::ContinuationState;
use super::dispatch::{LanguageScanner, ScanContext, Step};
use super::window::ByteWindow;
use pjdump_report::{Row, RowSink};
use pjdump_tables::ActiveLanguage;

const ESC: u8 = 0x1B;

/// The Universal Exit Language sequence.
const UEL: &[u8] = b"\x1B%-12345X";

/// Scanner for byte ranges owned by a language without a dedicated grammar.
pub(crate) struct BinaryScanner;

impl LanguageScanner for BinaryScanner {
    fn scan_unit(
        &self,
        win: &ByteWindow<'_>,
        at: usize,
        cx: &ScanContext<'_>,
        sink: &mut dyn RowSink,
    ) -> Step {
        let data = win.data();
        let mut i = at;
        while i < data.len() {
            if data[i] == ESC {
                let avail = data.len() - i;
                let matched = avail.min(UEL.len());
                if data[i..i + matched] == UEL[..matched] {
                    emit_run(win, at, i, cx, sink);
                    if matched == UEL.len() {
                        sink.push_row(Row::data(
                            win.abs(i),
                            "UEL",
                            String::new(),
                            "Universal Exit Language; entering PJL",
                        ));
                        return Step::Switch {
                            consumed: i + UEL.len() - at,
                            to: ActiveLanguage::Pjl,
                        };
                    }
                    // UEL straddles the window end; back up to the ESC.
                    return Step::NeedMore {
                        consumed: i - at,
                        cont: ContinuationState::prefix_pending(&data[i..i + matched], avail),
                    };
                }
            }
            i += 1;
        }
        emit_run(win, at, i, cx, sink);
        Step::Progress { consumed: i - at }
    }
}

/// Summarize an opaque byte run `[from, to)` as one PlainText row.
fn emit_run(
    win: &ByteWindow<'_>,
    from: usize,
    to: usize,
    cx: &ScanContext<'_>,
    sink: &mut dyn RowSink,
) {
    if to <= from {
        return;
    }
    sink.push_row(Row::plain(
        win.abs(from),
        "Binary Data",
        format!("<{} bytes of {} data>", to - from, cx.language),
    ));
}
