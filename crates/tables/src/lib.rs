//! Static lookup tables for the pjdump stream dissector.
//!
//! Two collaborators live here: the PJL command-name table (recognized
//! command names with one-line descriptions, used by the scanner to decide
//! whether a decoded name is "known") and the printer-language name table
//! (mapping `@PJL ENTER LANGUAGE=` values to [`ActiveLanguage`]).
//!
//! The PJL name inventory is fixed by the PJL Technical Reference, so the
//! table is embedded as const data rather than loaded from a generated file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

// ─── Active language ────────────────────────────────────────────────────

/// The page-description or control language the scanner currently believes
/// it is interpreting. Can change mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ActiveLanguage {
    /// Printer Job Language (`@PJL` lines).
    Pjl,
    /// PCL 5 and earlier (escape-sequence driven).
    Pcl,
    /// PCL XL (PCL 6 binary protocol).
    PclXl,
    /// PCL3GUI host-based raster protocol.
    Pcl3Gui,
    /// PostScript.
    PostScript,
    /// HP-GL/2 vector graphics.
    Hpgl2,
    /// XL2HB host-based variant of PCL XL.
    Xl2hb,
    /// Unrecognized personality; bytes are scanned as opaque data.
    Unknown,
}

impl std::fmt::Display for ActiveLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActiveLanguage::Pjl => "PJL",
            ActiveLanguage::Pcl => "PCL",
            ActiveLanguage::PclXl => "PCL XL",
            ActiveLanguage::Pcl3Gui => "PCL3GUI",
            ActiveLanguage::PostScript => "PostScript",
            ActiveLanguage::Hpgl2 => "HP-GL/2",
            ActiveLanguage::Xl2hb => "XL2HB",
            ActiveLanguage::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Map a normalized (upper-cased) `ENTER LANGUAGE=` value to a language.
///
/// Matching is prefix-based and ordered: `PCLXL` and `PCL3GUI` must be
/// tried before the bare `PCL` prefix, otherwise `LANGUAGE=PCLXL` would
/// misclassify as PCL 5. Trailing text after a matched prefix is ignored,
/// mirroring printer firmware which accepts e.g. `PostScript Level 2`.
pub fn match_language(normalized: &str) -> ActiveLanguage {
    // Priority order is load-bearing; do not sort alphabetically.
    const BY_PRIORITY: &[(&str, ActiveLanguage)] = &[
        ("PCLXL", ActiveLanguage::PclXl),
        ("PCL3GUI", ActiveLanguage::Pcl3Gui),
        ("PCL", ActiveLanguage::Pcl),
        ("POSTSCRIPT", ActiveLanguage::PostScript),
        ("HPGL", ActiveLanguage::Hpgl2),
        ("XL2HB", ActiveLanguage::Xl2hb),
    ];
    for (prefix, lang) in BY_PRIORITY {
        if normalized.starts_with(prefix) {
            return *lang;
        }
    }
    ActiveLanguage::Unknown
}

// ─── PJL command table ──────────────────────────────────────────────────

/// One recognized PJL command name.
///
/// Serializes for JSON output; entries are static data, never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandEntry {
    /// Upper-case command name as it appears after `@PJL`.
    pub name: &'static str,
    /// One-line description shown alongside the decoded command.
    pub description: &'static str,
}

/// Recognized PJL command names, per the PJL Technical Reference.
const PJL_COMMANDS: &[CommandEntry] = &[
    CommandEntry { name: "COMMENT", description: "Comment line; ignored by the printer" },
    CommandEntry { name: "ENTER", description: "Switch printer personality (LANGUAGE=...)" },
    CommandEntry { name: "JOB", description: "Start of a print job" },
    CommandEntry { name: "EOJ", description: "End of a print job" },
    CommandEntry { name: "DEFAULT", description: "Set the default value of an environment variable" },
    CommandEntry { name: "SET", description: "Set an environment variable for the current job" },
    CommandEntry { name: "INITIALIZE", description: "Reset environment variables to factory defaults" },
    CommandEntry { name: "RESET", description: "Reset environment variables to user defaults" },
    CommandEntry { name: "INQUIRE", description: "Query the current value of an environment variable" },
    CommandEntry { name: "DINQUIRE", description: "Query the default value of an environment variable" },
    CommandEntry { name: "ECHO", description: "Echo text back over the status channel" },
    CommandEntry { name: "INFO", description: "Query device information (ID, STATUS, MEMORY, ...)" },
    CommandEntry { name: "USTATUS", description: "Enable unsolicited status reporting" },
    CommandEntry { name: "USTATUSOFF", description: "Disable all unsolicited status reporting" },
    CommandEntry { name: "RDYMSG", description: "Set the control-panel ready message" },
    CommandEntry { name: "OPMSG", description: "Display an operator message and take printer offline" },
    CommandEntry { name: "STMSG", description: "Display a status message" },
    CommandEntry { name: "FSAPPEND", description: "Append data to a file on the printer file system" },
    CommandEntry { name: "FSDELETE", description: "Delete a file from the printer file system" },
    CommandEntry { name: "FSDIRLIST", description: "List a directory of the printer file system" },
    CommandEntry { name: "FSDOWNLOAD", description: "Download a file to the printer file system" },
    CommandEntry { name: "FSINIT", description: "Initialize (format) a printer file system volume" },
    CommandEntry { name: "FSMKDIR", description: "Create a directory on the printer file system" },
    CommandEntry { name: "FSQUERY", description: "Query a printer file system entry" },
    CommandEntry { name: "FSUPLOAD", description: "Upload a file from the printer file system" },
    CommandEntry { name: "DMCMD", description: "Device management command (embedded PML)" },
    CommandEntry { name: "DMINFO", description: "Device management information request (embedded PML)" },
];

/// The PJL command-name table with a cached name index.
#[derive(Debug)]
pub struct CommandTable {
    entries: &'static [CommandEntry],
    index: OnceLock<HashMap<&'static str, &'static CommandEntry>>,
}

impl CommandTable {
    /// The builtin table of PJL Technical Reference command names.
    pub fn builtin() -> &'static CommandTable {
        static BUILTIN: CommandTable = CommandTable {
            entries: PJL_COMMANDS,
            index: OnceLock::new(),
        };
        &BUILTIN
    }

    fn index(&self) -> &HashMap<&'static str, &'static CommandEntry> {
        self.index
            .get_or_init(|| self.entries.iter().map(|e| (e.name, e)).collect())
    }

    /// Look up an upper-cased command name.
    pub fn lookup(&self, name: &str) -> Option<&'static CommandEntry> {
        self.index().get(name).copied()
    }

    /// Whether `name` (upper-cased) is a recognized PJL command.
    pub fn is_known(&self, name: &str) -> bool {
        self.index().contains_key(name)
    }

    /// All entries in table order.
    pub fn entries(&self) -> &'static [CommandEntry] {
        self.entries
    }
}
