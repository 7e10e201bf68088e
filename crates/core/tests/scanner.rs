//! Scanner behaviour tests: PJL command decoding, language switching,
//! tolerant recovery, end-of-range, and embedded PML.
//!
//! Chunked-driver and continuation-protocol tests live in `chunked.rs`.

use pjdump_core::{
    ActiveLanguage, ByteWindow, Options, RowKind, ScanStatus, Session, codes, scan_bytes,
};

fn data_rows(rows: &[pjdump_core::Row]) -> Vec<&pjdump_core::Row> {
    rows.iter().filter(|r| r.kind == RowKind::Data).collect()
}

fn warning_codes(rows: &[pjdump_core::Row]) -> Vec<&str> {
    rows.iter()
        .filter(|r| r.kind == RowKind::Warning)
        .filter_map(|r| r.code.as_deref())
        .collect()
}

// ── Basic decoding ──────────────────────────────────────────────────────

#[test]
fn single_command_one_data_row() {
    let rows = scan_bytes(b"@PJL COMMENT hello world\n", &Options::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, RowKind::Data);
    assert_eq!(rows[0].label, "PJL Command");
    assert_eq!(rows[0].primary, "@PJL COMMENT");
    assert_eq!(rows[0].text, " hello world");
    assert_eq!(rows[0].offset, 0);
}

#[test]
fn command_name_is_case_normalized() {
    // The introducer must match literally, but the name is upper-cased
    // before lookup: lower-case "comment" is still a known command.
    let rows = scan_bytes(b"@PJL comment mixed Case\n", &Options::default());
    assert!(warning_codes(&rows).is_empty(), "rows: {rows:?}");
    assert_eq!(rows[0].primary, "@PJL comment");
}

#[test]
fn bare_introducer_line_is_legal() {
    let rows = scan_bytes(b"@PJL\r\n", &Options::default());
    assert!(warning_codes(&rows).is_empty());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].primary, "@PJL");
    assert!(rows[0].text.is_empty());
}

#[test]
fn consecutive_commands_carry_their_offsets() {
    let rows = scan_bytes(b"@PJL JOB\n@PJL EOJ\n", &Options::default());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].offset, 0);
    assert_eq!(rows[1].offset, 9);
}

// ── Wrapped emission round-trip ─────────────────────────────────────────

#[test]
fn wrapped_chunks_rejoin_to_the_raw_text() {
    let params: String = (0..137).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let input = format!("@PJL COMMENT {params}\n");
    let rows = scan_bytes(input.as_bytes(), &Options::default());

    let data = data_rows(&rows);
    assert!(data.len() > 1, "long parameters must wrap");
    assert_eq!(data[0].label, "PJL Command");
    for cont in &data[1..] {
        assert!(cont.primary.is_empty());
        assert!(cont.label.is_empty());
    }
    let rejoined: String = data.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(rejoined, format!(" {params}"));
    // Every chunk but the last is exactly the wrap width.
    for row in &data[..data.len() - 1] {
        assert_eq!(row.text.len(), 50);
    }
}

// ── Continuation on short windows ───────────────────────────────────────

#[test]
fn under_five_bytes_requests_continuation() {
    for input in [&b"@"[..], b"@P", b"@PJ", b"@PJL"] {
        let mut session = Session::new(Options::default());
        let mut rows = Vec::new();
        let step = session.scan(&ByteWindow::new(input, 0), &mut rows);
        assert_eq!(
            step.status,
            ScanStatus::NeedMore { backtrack: -(input.len() as i64) },
            "input {input:?}"
        );
        assert_eq!(step.consumed, 0);
        assert!(rows.is_empty(), "no rows may be emitted for {input:?}");
    }
}

// ── Language switching ──────────────────────────────────────────────────

#[test]
fn enter_language_priority_prefers_pclxl() {
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    session.scan(&ByteWindow::new(b"@PJL ENTER LANGUAGE=PCLXL\n", 0), &mut rows);
    assert_eq!(session.language(), ActiveLanguage::PclXl);

    let mut session = Session::new(Options::default());
    session.scan(&ByteWindow::new(b"@PJL ENTER LANGUAGE=PCL\n", 0), &mut rows);
    assert_eq!(session.language(), ActiveLanguage::Pcl);
}

#[test]
fn enter_language_value_is_case_insensitive() {
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    session.scan(&ByteWindow::new(b"@PJL ENTER LANGUAGE = \n", 0), &mut rows);
    // Malformed (space before =): no LANGUAGE= prefix match, stays PJL.
    assert_eq!(session.language(), ActiveLanguage::Pjl);

    let mut session = Session::new(Options::default());
    session.scan(&ByteWindow::new(b"@PJL ENTER LANGUAGE=postscript\n", 0), &mut rows);
    assert_eq!(session.language(), ActiveLanguage::PostScript);
}

#[test]
fn unknown_personality_warns_and_goes_unknown() {
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    session.scan(&ByteWindow::new(b"@PJL ENTER LANGUAGE=KLINGON\n", 0), &mut rows);
    assert_eq!(session.language(), ActiveLanguage::Unknown);
    assert!(warning_codes(&rows).contains(&codes::SCAN_UNKNOWN_LANGUAGE));
}

#[test]
fn escape_switches_to_pcl_without_a_command_row() {
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    let step = session.scan(&ByteWindow::new(b"\x1BE", 0), &mut rows);
    assert_eq!(session.language(), ActiveLanguage::Pcl);
    assert_eq!(step.status, ScanStatus::Exhausted);
    assert!(rows.iter().all(|r| r.label != "PJL Command"));
    // The escape byte itself lands in the binary run, not a PJL row.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, RowKind::PlainText);
    assert_eq!(rows[0].offset, 0);
}

#[test]
fn non_introducer_byte_returns_to_pcl() {
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    session.scan(&ByteWindow::new(b"P1234", 0), &mut rows);
    assert_eq!(session.language(), ActiveLanguage::Pcl);
}

// ── Tolerant recovery ───────────────────────────────────────────────────

#[test]
fn unknown_command_is_one_warning_then_one_data_row() {
    let rows = scan_bytes(b"@PJL FROBNICATE OPT=1\n@PJL EOJ\n", &Options::default());
    assert_eq!(rows.len(), 3, "rows: {rows:?}");
    assert_eq!(rows[0].kind, RowKind::Warning);
    assert_eq!(rows[0].code.as_deref(), Some(codes::SCAN_UNKNOWN_COMMAND));
    assert_eq!(rows[1].kind, RowKind::Data);
    assert_eq!(rows[1].primary, "@PJL FROBNICATE");
    assert_eq!(rows[1].text, " OPT=1");
    // Scanning resumed after the trailing LF.
    assert_eq!(rows[2].primary, "@PJL EOJ");
}

#[test]
fn missing_whitespace_before_equals_is_warned_not_fatal() {
    let rows = scan_bytes(b"@PJL COMMENT=hi\n", &Options::default());
    assert_eq!(warning_codes(&rows), vec![codes::SCAN_MISSING_WHITESPACE]);
    let data = data_rows(&rows);
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].primary, "@PJL COMMENT");
    assert_eq!(data[0].text, "=hi");
}

#[test]
fn introducer_mismatch_recovers_via_plain_data() {
    let input = b"@PJXoops\x1B%-12345X@PJL EOJ\n";
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    let step = session.scan(&ByteWindow::new(input, 0), &mut rows);
    assert_eq!(step.status, ScanStatus::Exhausted);
    assert_eq!(session.language(), ActiveLanguage::Pjl);

    assert_eq!(rows[0].kind, RowKind::Warning);
    assert_eq!(rows[0].code.as_deref(), Some(codes::SCAN_UNEXPECTED_SEQUENCE));
    assert_eq!(rows[1].kind, RowKind::PlainText);
    assert_eq!(rows[1].text, "@PJXoops");
    assert_eq!(rows[2].label, "UEL");
    let last = rows.last().unwrap();
    assert_eq!(last.primary, "@PJL EOJ");
}

#[test]
fn terminator_consumption_leaves_the_tail_for_the_next_call() {
    // "@PJL COMMENT hi\n" is 16 bytes; the trailing "@PJ" is re-presented.
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    let step = session.scan(&ByteWindow::new(b"@PJL COMMENT hi\n@PJ", 0), &mut rows);
    assert_eq!(step.consumed, 16);
    assert_eq!(step.status, ScanStatus::NeedMore { backtrack: -3 });
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text, " hi");
}

#[test]
fn cap_exceeded_processes_a_truncated_command() {
    let mut input = b"@PJL COMMENT ".to_vec();
    input.extend(std::iter::repeat(b'A').take(1500));
    input.push(b'\n');
    let rows = scan_bytes(&input, &Options::default());

    assert!(warning_codes(&rows).contains(&codes::SCAN_TERMINATOR_CAP));
    // Exactly the capped bytes were decoded: 1024 total, minus the
    // introducer and name ("@PJL COMMENT", 12 bytes) carried in the prefix.
    let wrapped: usize = data_rows(&rows).iter().map(|r| r.text.len()).sum();
    assert_eq!(wrapped, 1024 - "@PJL COMMENT".len());
    // The leftover bytes fall back to PCL as opaque data; the scan never
    // stalls and never re-examines the capped command.
    assert_eq!(rows.last().unwrap().kind, RowKind::PlainText);
}

// ── End of range ────────────────────────────────────────────────────────

#[test]
fn end_of_range_stops_at_a_command_boundary() {
    let mut session = Session::new(Options {
        end_of_range: Some(5),
        ..Options::default()
    });
    let mut rows = Vec::new();
    let step = session.scan(&ByteWindow::new(b"@PJL JOB\n@PJL EOJ\n", 0), &mut rows);
    assert_eq!(step.status, ScanStatus::EndOfRange);
    assert_eq!(step.consumed, 9);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].primary, "@PJL JOB");
}

#[test]
fn scanned_span_covers_the_consumed_bytes() {
    let mut session = Session::new(Options::default());
    let mut rows = Vec::new();
    let step = session.scan(&ByteWindow::new(b"@PJL EOJ\n", 4096), &mut rows);
    assert_eq!(step.scanned.start, 4096);
    assert_eq!(step.scanned.end, 4096 + 9);
}

// ── Embedded PML ────────────────────────────────────────────────────────

#[test]
fn embedded_pml_decodes_when_enabled() {
    let opts = Options { show_pml: true, ..Options::default() };
    let rows = scan_bytes(b"@PJL DMCMD ASCIIHEX=\"48504A\"\n", &opts);
    let pml: Vec<_> = rows.iter().filter(|r| r.label == "Embedded PML").collect();
    assert_eq!(pml.len(), 1);
    assert_eq!(pml[0].text, "48 50 4A");
}

#[test]
fn wrapped_pml_offsets_advance_by_hex_digits() {
    let opts = Options { show_pml: true, ..Options::default() };
    // 20 decoded bytes: one 16-byte dump row plus one 4-byte wrap row.
    let input = format!("@PJL DMCMD ASCIIHEX=\"{}\"\n", "41".repeat(20));
    let rows = scan_bytes(input.as_bytes(), &opts);

    let first = rows.iter().position(|r| r.label == "Embedded PML").unwrap();
    assert_eq!(rows[first].offset, 21);
    assert_eq!(rows[first].text.split(' ').count(), 16);
    // 16 decoded bytes cover 32 hex digits of the quoted payload.
    let cont = &rows[first + 1];
    assert_eq!(cont.offset, rows[first].offset + 32);
    assert_eq!(cont.text, "41 41 41 41");
}

#[test]
fn embedded_pml_off_by_default() {
    let rows = scan_bytes(b"@PJL DMCMD ASCIIHEX=\"48504A\"\n", &Options::default());
    assert!(rows.iter().all(|r| r.label != "Embedded PML"));
}

#[test]
fn invalid_pml_warns_without_aborting() {
    let opts = Options { show_pml: true, ..Options::default() };
    let rows = scan_bytes(b"@PJL DMINFO ASCIIHEX=\"48ZZ\"\n@PJL EOJ\n", &opts);
    assert!(warning_codes(&rows).contains(&codes::SCAN_INVALID_PML));
    assert!(rows.iter().any(|r| r.primary == "@PJL EOJ"));
}
