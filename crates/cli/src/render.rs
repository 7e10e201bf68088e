//! Row rendering for terminal and machine consumption.
//!
//! [`Row`]s come out of the scanner as structured values; this module turns
//! them into a fixed-column text listing for humans or a JSON array for
//! pipes and tooling.

use std::io::{self, IsTerminal, Write};

use pjdump_report::{OffsetRadix, Row, RowKind, format_offset};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for the dissection listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Fixed-column text listing.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Resolve an explicit `--output` value, defaulting on whether stdout
    /// is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            // Default: pretty for interactive terminals, JSON for pipes
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render rows as a fixed-column listing to stdout.
///
/// Columns: offset (per `radix`), label, then `primary` and `text` joined
/// with a space. Continuation rows repeat neither the offset-adjacent label
/// nor the primary column, so wrapped parameter text lines up visually.
pub(crate) fn render_rows_pretty(rows: &[Row], radix: OffsetRadix) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for row in rows {
        let offset = format_offset(row.offset, radix);
        let label = match row.kind {
            RowKind::Warning => match &row.code {
                Some(code) => format!("Warning[{code}]"),
                None => "Warning".to_string(),
            },
            _ => row.label.to_string(),
        };
        if row.primary.is_empty() {
            writeln!(out, "{offset:>10}  {label:<18} {}", row.text)?;
        } else {
            writeln!(
                out,
                "{offset:>10}  {label:<18} {}: {}",
                row.primary, row.text
            )?;
        }
    }
    Ok(())
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// Render rows as a JSON array to stdout.
pub(crate) fn render_rows_json(rows: &[Row]) -> serde_json::Result<()> {
    let stdout = io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), rows)?;
    println!();
    Ok(())
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a summary line with row and warning counts to stderr.
///
/// Example: `214 rows, 2 warnings`
pub(crate) fn print_summary(rows: &[Row]) {
    let warnings = rows
        .iter()
        .filter(|r| matches!(r.kind, RowKind::Warning))
        .count();
    let s = if warnings == 1 { "" } else { "s" };
    eprintln!("{} rows, {warnings} warning{s}", rows.len());
}
