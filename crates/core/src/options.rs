//! Per-pass scan configuration.
//!
//! An [`Options`] value is immutable for the duration of one analysis pass.
//! It is supplied by the embedding tool (the CLI here; a configuration
//! dialog in a GUI host) and only read by the scanner core.

use crate::subst::SubstPolicy;
use pjdump_report::OffsetRadix;
use serde::{Deserialize, Serialize};

/// Scan configuration, immutable per pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Radix used when rendering absolute file offsets.
    pub radix: OffsetRadix,
    /// How control and DEL bytes are rendered in display text.
    pub subst: SubstPolicy,
    /// Absolute file offset beyond which scanning stops, if set.
    pub end_of_range: Option<u64>,
    /// Decode PML payloads embedded in `DMCMD`/`DMINFO` commands.
    pub show_pml: bool,
}
