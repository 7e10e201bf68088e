//! Character substitution for display text.
//!
//! Captured job streams are binary; control bytes and DEL would corrupt a
//! terminal or grid display if passed through. Every policy is applied
//! per byte, so rendering a byte range chunk-by-chunk produces exactly the
//! same text as rendering it whole — the wrapped-emission round-trip
//! property depends on this.

use serde::{Deserialize, Serialize};

/// How control bytes (< 0x20) and DEL (0x7F) are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstPolicy {
    /// ASCII mnemonic in angle brackets: `<ESC>`.
    #[default]
    Mnemonic,
    /// Mnemonic followed by a space: `<ESC> `.
    MnemonicSpace,
    /// Two-digit uppercase hex in angle brackets: `<1B>`.
    Hex,
    /// A single `.` per control byte.
    Dots,
    /// A single space per control byte.
    Spaces,
    /// Pass the byte through unchanged.
    Literal,
}

/// ASCII control-code mnemonics, indexed by byte value 0x00..=0x1F.
const MNEMONICS: [&str; 32] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", "BS", "HT", "LF", "VT", "FF", "CR",
    "SO", "SI", "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM", "SUB", "ESC",
    "FS", "GS", "RS", "US",
];

/// Append the display form of one byte to `out`.
pub fn render_byte(b: u8, policy: SubstPolicy, out: &mut String) {
    if b >= 0x20 && b != 0x7F {
        // Printable range (and high bytes, shown as their Latin-1 character).
        out.push(char::from(b));
        return;
    }
    let mnemonic = if b == 0x7F { "DEL" } else { MNEMONICS[b as usize] };
    match policy {
        SubstPolicy::Mnemonic => {
            out.push('<');
            out.push_str(mnemonic);
            out.push('>');
        }
        SubstPolicy::MnemonicSpace => {
            out.push('<');
            out.push_str(mnemonic);
            out.push_str("> ");
        }
        SubstPolicy::Hex => {
            out.push_str(&format!("<{b:02X}>"));
        }
        SubstPolicy::Dots => out.push('.'),
        SubstPolicy::Spaces => out.push(' '),
        SubstPolicy::Literal => out.push(char::from(b)),
    }
}

/// Render a byte slice as display text under the given policy.
pub fn render_bytes(bytes: &[u8], policy: SubstPolicy) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        render_byte(b, policy, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_bytes_pass_through() {
        assert_eq!(render_bytes(b"Hello, PJL!", SubstPolicy::Mnemonic), "Hello, PJL!");
        assert_eq!(render_bytes(b"Hello", SubstPolicy::Dots), "Hello");
    }

    #[test]
    fn mnemonic_policy() {
        assert_eq!(render_bytes(b"a\x1Bb", SubstPolicy::Mnemonic), "a<ESC>b");
        assert_eq!(render_bytes(b"\x00\x7F", SubstPolicy::Mnemonic), "<NUL><DEL>");
    }

    #[test]
    fn mnemonic_space_policy() {
        assert_eq!(render_bytes(b"\r\n", SubstPolicy::MnemonicSpace), "<CR> <LF> ");
    }

    #[test]
    fn hex_policy() {
        assert_eq!(render_bytes(b"\x1B\x0A", SubstPolicy::Hex), "<1B><0A>");
    }

    #[test]
    fn dots_and_spaces_policies() {
        assert_eq!(render_bytes(b"a\x01\x02z", SubstPolicy::Dots), "a..z");
        assert_eq!(render_bytes(b"a\x01z", SubstPolicy::Spaces), "a z");
    }

    #[test]
    fn literal_policy_keeps_the_byte() {
        assert_eq!(render_bytes(b"\x07", SubstPolicy::Literal), "\u{7}");
    }

    #[test]
    fn high_bytes_render_as_latin1() {
        assert_eq!(render_bytes(&[0xE9], SubstPolicy::Mnemonic), "é");
    }

    #[test]
    fn chunked_rendering_matches_whole() {
        // Per-byte substitution means chunk boundaries never change output.
        let input = b"ab\x1B\x00cd\x7Fef\x0A";
        let whole = render_bytes(input, SubstPolicy::Mnemonic);
        let mut pieces = String::new();
        for chunk in input.chunks(3) {
            pieces.push_str(&render_bytes(chunk, SubstPolicy::Mnemonic));
        }
        assert_eq!(whole, pieces);
    }
}
