//! The PJL command scanner.
//!
//! PJL is line-oriented: every command is `@PJL NAME options... <LF>`.
//! While PJL is active, an escape byte or any line not starting with `@`
//! is a de-facto return to PCL — real printers fall back to the last
//! binary language when PJL framing is absent. Anything else is decoded
//! tolerantly: unknown names, missing whitespace, and truncated commands
//! produce warning rows, never a scan abort.

use super::cont::{ContKind, ContinuationState};
use super::dispatch::{LanguageScanner, ScanContext, Step};
use super::window::ByteWindow;
use crate::pml;
use crate::subst;
use pjdump_report::{Row, RowSink, codes};
use pjdump_tables::{ActiveLanguage, match_language};

const ESC: u8 = 0x1B;
const LF: u8 = 0x0A;
const CR: u8 = 0x0D;

/// The literal 4-byte prefix marking a PJL command line.
const INTRODUCER: &[u8] = b"@PJL";

/// Hard cap on one command's length, introducer included. Prevents
/// unbounded continuation when no terminator ever appears.
const MAX_CMD_LEN: usize = 1024;

/// Display wrap width for parameter text, in input bytes per chunk.
const WRAP_WIDTH: usize = 50;

/// One decoded command, scanner-local and transient.
struct Command<'a> {
    /// Normalized (upper-case) command name.
    name: String,
    /// Raw parameter bytes, terminator excluded.
    raw: &'a [u8],
    /// Upper-case copy of `raw` with control/DEL bytes replaced by `.`,
    /// so keyword matching never falsely fires on control bytes.
    normalized: String,
    /// Indices of the first and last `"` within `raw`, when present.
    quotes: Option<(usize, usize)>,
}

/// Scanner for PJL-active byte ranges.
pub(crate) struct PjlScanner;

impl LanguageScanner for PjlScanner {
    fn scan_unit(
        &self,
        win: &ByteWindow<'_>,
        at: usize,
        cx: &ScanContext<'_>,
        sink: &mut dyn RowSink,
    ) -> Step {
        let data = win.data();

        // An escape sequence belongs to PCL; leave the byte for its parser.
        if data[at] == ESC {
            return Step::Switch { consumed: 0, to: ActiveLanguage::Pcl };
        }
        // Anything not beginning a PJL line is a return to PCL.
        if data[at] != b'@' {
            return Step::Switch { consumed: 0, to: ActiveLanguage::Pcl };
        }

        // Confirming the introducer needs the 4 literal bytes plus at least
        // one more; rather than guess, ask for a corrected window.
        let remaining = win.remaining(at);
        if remaining < INTRODUCER.len() + 1 {
            let matched = &data[at..at + remaining.min(INTRODUCER.len())];
            return Step::NeedMore {
                consumed: 0,
                cont: ContinuationState::prefix_pending(matched, remaining),
            };
        }

        if &data[at..at + INTRODUCER.len()] != INTRODUCER {
            sink.push_row(Row::warning(
                win.abs(at),
                codes::SCAN_UNEXPECTED_SEQUENCE,
                "unexpected sequence; expected the \"@PJL\" introducer",
            ));
            return scan_plain_data(win, at, cx, sink);
        }

        parse_command(win, at, cx, sink)
    }
}

/// Generic recovery scan: consume bytes up to the next escape character,
/// emitting them as plain data. Keeps the scan moving on corrupt input.
///
/// A run that reaches the window end without an escape is not finished —
/// it continues via the ledger as an `UnknownSequence`, so the next window
/// resumes the run as PJL plain data instead of re-deciding the language
/// from its first byte. Only complete wrap-width chunks are emitted before
/// the boundary; the residual is re-presented, keeping the emitted rows
/// identical for any window size.
pub(crate) fn scan_plain_data(
    win: &ByteWindow<'_>,
    at: usize,
    cx: &ScanContext<'_>,
    sink: &mut dyn RowSink,
) -> Step {
    let data = win.data();
    let mut end = at;
    while end < data.len() && data[end] != ESC {
        end += 1;
    }
    let terminated = end < data.len();
    let mut take = end - at;
    if !terminated {
        take -= take % WRAP_WIDTH;
    }
    for (k, chunk) in data[at..at + take].chunks(WRAP_WIDTH).enumerate() {
        sink.push_row(Row::plain(
            win.abs(at + k * WRAP_WIDTH),
            "Data",
            subst::render_bytes(chunk, cx.opts.subst),
        ));
    }
    if terminated {
        return Step::Progress { consumed: take };
    }
    Step::NeedMore {
        consumed: take,
        cont: ContinuationState::backtrack_of(ContKind::UnknownSequence, win.remaining(at + take)),
    }
}

/// Parse one `@PJL` command starting at the introducer.
fn parse_command(
    win: &ByteWindow<'_>,
    at: usize,
    cx: &ScanContext<'_>,
    sink: &mut dyn RowSink,
) -> Step {
    let data = win.data();
    let remaining = win.remaining(at);

    // ── Step 1: terminator scan (hard cap, introducer included) ─────
    let scan_cap = remaining.min(MAX_CMD_LEN);
    let mut cmd_len = INTRODUCER.len();
    let mut found_term = false; // LF found, consumed as part of the command
    let mut term_by_switch = false; // ESC found, left unconsumed
    while cmd_len < scan_cap {
        match data[at + cmd_len] {
            LF => {
                cmd_len += 1;
                found_term = true;
                break;
            }
            ESC => {
                term_by_switch = true;
                break;
            }
            _ => cmd_len += 1,
        }
    }
    // Reaching the cap without a terminator is processed as a truncated
    // command: retrying can never succeed once the cap is hit, and
    // continuing forever is exactly the stall this cap exists to prevent.
    let capped = !found_term && !term_by_switch && cmd_len >= MAX_CMD_LEN;
    if !found_term && !term_by_switch && !capped {
        // The window ended first; retry the whole command with more data.
        return Step::NeedMore {
            consumed: 0,
            cont: ContinuationState::backtrack_of(ContKind::MidCommand, remaining),
        };
    }
    let body_end = at + cmd_len;

    // ── Step 2: whitespace after the introducer (echoed in the prefix) ──
    let mut p = at + INTRODUCER.len();
    while p < body_end && (data[p] == b' ' || data[p] == b'\t') {
        p += 1;
    }

    // ── Step 3: command name ────────────────────────────────────────
    let mut name = String::new();
    let mut missing_ws = false;
    while p < body_end {
        let b = data[p];
        if b == b' ' || b == b'\t' {
            break;
        }
        // CR with exactly two bytes left / LF with one byte left is the
        // command's own CRLF terminator, not part of the name.
        if b == CR && body_end - p == 2 {
            break;
        }
        if b == LF && body_end - p == 1 {
            break;
        }
        if b == b'=' {
            // PJL requires whitespace between name and modifier/option.
            missing_ws = true;
            break;
        }
        name.push(char::from(b).to_ascii_uppercase());
        p += 1;
    }
    let name_end = p;
    // A bare "@PJL" line is legal (it resets the PJL parser state).
    let known = name.is_empty() || cx.table.is_known(&name);

    // ── Step 4: parameter capture ───────────────────────────────────
    let param_start = name_end;
    let mut param_end = body_end;
    if found_term {
        param_end -= 1;
        if param_end > param_start && data[param_end - 1] == CR {
            param_end -= 1;
        }
    }
    let cmd = build_command(name, &data[param_start..param_end]);

    // ── Step 5: warnings, then the wrapped command rows ─────────────
    if capped {
        sink.push_row(Row::warning(
            win.abs(at),
            codes::SCAN_TERMINATOR_CAP,
            format!("no terminator within {MAX_CMD_LEN} bytes; command truncated"),
        ));
    }
    if !known {
        sink.push_row(Row::warning(
            win.abs(at),
            codes::SCAN_UNKNOWN_COMMAND,
            format!("unrecognized PJL command \"{}\"", cmd.name),
        ));
    }
    if missing_ws {
        sink.push_row(Row::warning(
            win.abs(name_end),
            codes::SCAN_MISSING_WHITESPACE,
            "missing whitespace between command name and \"=\"",
        ));
    }

    let prefix = subst::render_bytes(&data[at..name_end], cx.opts.subst);
    let mut chunks = cmd.raw.chunks(WRAP_WIDTH);
    let first = chunks.next().unwrap_or(&[]);
    sink.push_row(Row::data(
        win.abs(at),
        "PJL Command",
        prefix,
        subst::render_bytes(first, cx.opts.subst),
    ));
    for (k, chunk) in chunks.enumerate() {
        sink.push_row(Row::continuation(
            win.abs(param_start + (k + 1) * WRAP_WIDTH),
            subst::render_bytes(chunk, cx.opts.subst),
        ));
    }

    // ── Step 6: special-case semantic actions ───────────────────────
    let switch_to = enter_language(&cmd, win, param_start, sink);

    if cx.opts.show_pml && matches!(cmd.name.as_str(), "DMCMD" | "DMINFO") {
        emit_embedded_pml(&cmd, win, param_start, sink);
    }

    if let Some(to) = switch_to {
        return Step::Switch { consumed: cmd_len, to };
    }

    // FSDOWNLOAD/FSAPPEND declare a raw payload that follows the LF.
    // Without a real LF terminator there is no payload boundary to honor.
    if found_term
        && matches!(cmd.name.as_str(), "FSDOWNLOAD" | "FSAPPEND")
        && let Some(size) = size_option(cmd.raw, cmd.quotes)
        && size > 0
    {
        let start = at + cmd_len;
        let take = (win.remaining(start) as u64).min(size) as usize;
        if take > 0 {
            sink.push_row(Row::plain(
                win.abs(start),
                "Download Data",
                format!("<{take} bytes of binary file data>"),
            ));
        }
        if (take as u64) < size {
            return Step::NeedMore {
                consumed: cmd_len + take,
                cont: ContinuationState::download(size - take as u64, take),
            };
        }
        return Step::Progress { consumed: cmd_len + take };
    }

    Step::Progress { consumed: cmd_len }
}

/// Build the transient [`Command`]: normalized copy plus quote tracking.
fn build_command(name: String, raw: &[u8]) -> Command<'_> {
    let mut normalized = String::with_capacity(raw.len());
    let mut first_quote = None;
    let mut last_quote = None;
    for (k, &b) in raw.iter().enumerate() {
        if b == b'"' {
            if first_quote.is_none() {
                first_quote = Some(k);
            }
            last_quote = Some(k);
        }
        normalized.push(match b {
            b' ' | b'\t' => char::from(b),
            0x00..=0x1F | 0x7F => '.',
            _ => char::from(b).to_ascii_uppercase(),
        });
    }
    let quotes = match (first_quote, last_quote) {
        (Some(a), Some(b)) if b > a => Some((a, b)),
        _ => None,
    };
    Command { name, raw, normalized, quotes }
}

/// Handle `@PJL ENTER LANGUAGE=...`: the switch signal for the dispatcher.
fn enter_language(
    cmd: &Command<'_>,
    win: &ByteWindow<'_>,
    param_start: usize,
    sink: &mut dyn RowSink,
) -> Option<ActiveLanguage> {
    if cmd.name != "ENTER" {
        return None;
    }
    let value = cmd.normalized.trim_start().strip_prefix("LANGUAGE=")?;
    let lang = match_language(value.trim());
    if lang == ActiveLanguage::Unknown {
        sink.push_row(Row::warning(
            win.abs(param_start),
            codes::SCAN_UNKNOWN_LANGUAGE,
            format!("unrecognized personality \"{}\"", value.trim()),
        ));
    }
    Some(lang)
}

/// Decode and emit an `ASCIIHEX="…"` payload embedded in DMCMD/DMINFO.
///
/// The payload is the raw byte span strictly between the first and last
/// quote. A decode failure surfaces as a warning on the enclosing command;
/// the outer scan is unaffected.
fn emit_embedded_pml(
    cmd: &Command<'_>,
    win: &ByteWindow<'_>,
    param_start: usize,
    sink: &mut dyn RowSink,
) {
    if !cmd.normalized.contains("ASCIIHEX=\"") {
        return;
    }
    let Some((q0, q1)) = cmd.quotes else {
        return;
    };
    let payload = &cmd.raw[q0 + 1..q1];
    let payload_at = win.abs(param_start + q0 + 1);
    match pml::decode_ascii_hex(payload) {
        Ok(bytes) => {
            let mut chunks = bytes.chunks(16);
            sink.push_row(Row::data(
                payload_at,
                "Embedded PML",
                String::new(),
                pml::format_hex(chunks.next().unwrap_or(&[])),
            ));
            for (k, chunk) in chunks.enumerate() {
                // Each 16 decoded bytes cover 32 hex digits of payload.
                sink.push_row(Row::continuation(
                    payload_at + ((k + 1) * 32) as u64,
                    pml::format_hex(chunk),
                ));
            }
        }
        Err(err) => {
            sink.push_row(Row::warning(
                payload_at,
                codes::SCAN_INVALID_PML,
                format!("invalid sequence found in embedded PML: {err}"),
            ));
        }
    }
}

/// Extract the numeric value of a `SIZE=` option.
///
/// Searches the raw parameter bytes case-insensitively, skipping the
/// quoted span: a `SIZE=` inside `NAME="…"` is file-name text, not the
/// option, and mistaking it would desynchronize the payload skip.
fn size_option(raw: &[u8], quotes: Option<(usize, usize)>) -> Option<u64> {
    const KEY: &[u8] = b"SIZE=";
    let mut i = 0;
    while i + KEY.len() <= raw.len() {
        if let Some((q0, q1)) = quotes
            && i > q0
            && i < q1
        {
            i = q1 + 1;
            continue;
        }
        if raw[i..i + KEY.len()].eq_ignore_ascii_case(KEY) {
            let start = i + KEY.len();
            let digits = raw[start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            let text = std::str::from_utf8(&raw[start..start + digits]).ok()?;
            return text.parse().ok();
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_option_parses_digits() {
        assert_eq!(size_option(b" SIZE=1024", None), Some(1024));
        assert_eq!(size_option(b" size=7", None), Some(7));
        assert_eq!(size_option(b" SIZE=0", None), Some(0));
        assert_eq!(size_option(b" NAME=X", None), None);
        assert_eq!(size_option(b" SIZE=abc", None), None);
    }

    #[test]
    fn size_option_skips_the_quoted_span() {
        let cmd = build_command("FSDOWNLOAD".into(), b" NAME=\"0:\\SIZE=2.BIN\" SIZE=4");
        assert_eq!(size_option(cmd.raw, cmd.quotes), Some(4));
        // A SIZE= appearing only inside the quotes is no option at all.
        let cmd = build_command("FSDOWNLOAD".into(), b" NAME=\"SIZE=9\"");
        assert_eq!(size_option(cmd.raw, cmd.quotes), None);
    }

    #[test]
    fn build_command_normalizes_and_tracks_quotes() {
        let cmd = build_command("SET".into(), b" 888rdymsg DISPLAY=\"hi\x01there\"");
        assert_eq!(cmd.normalized, " 888RDYMSG DISPLAY=\"HI.THERE\"");
        let (q0, q1) = cmd.quotes.unwrap();
        assert_eq!(&cmd.raw[q0..=q1], b"\"hi\x01there\"");
    }

    #[test]
    fn build_command_single_quote_is_no_span() {
        let cmd = build_command("ECHO".into(), b" \"half");
        assert!(cmd.quotes.is_none());
    }
}
