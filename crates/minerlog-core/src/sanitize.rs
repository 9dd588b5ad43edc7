//! Frame sanitization.
//!
//! Miner firmware writes colored, cursor-controlled output meant for a
//! terminal. Everything that reaches the buffer goes through [`sanitize`]
//! first, which is the only way to construct a [`LogLine`].

use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use minerlog_api::Frame;
use regex::Regex;

/// Terminal escape sequences.
///
/// Covers:
/// - CSI sequences: ESC [ or 8-bit CSI (U+009B), params, final letter
/// - OSC sequences: ESC ] ... terminated by BEL or ST (titles, hyperlinks)
/// - Character set selection: ESC ( X / ESC ) X
/// - Single-character escapes: ESC = ESC > ESC M ESC 7 ...
/// - Any remaining bare ESC
///
/// CSI and OSC sequences cut off by the end of a frame are removed too.
static ANSI_ESCAPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:\x1b\[|\x{9b})[0-9;?]*[\x20-/]*(?:[@-~]|$)   # CSI sequences
        | \x1b\][^\x07\x1b]*(?:\x07|\x1b\\|$)         # OSC sequences
        | \x1b[()][A-Za-z0-9]                           # charset selection
        | \x1b[@-Z\\-_=>0-9]                            # single-char escapes
        | \x1b                                          # stray ESC
        ",
    )
    .expect("ANSI regex pattern is valid")
});

/// C0 and C1 control characters left over after escape removal (tab and
/// newline kept).
static CONTROL_CHAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0b-\x1f\x7f\x{80}-\x{9f}]")
        .expect("control char regex pattern is valid")
});

// ── LogLine ──────────────────────────────────────────────────────────

/// A sanitized, non-empty log line.
///
/// Duplicate text is allowed: a line's identity is its buffer position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine(String);

impl LogLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for LogLine {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LogLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for LogLine {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LogLine {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ── Sanitization ─────────────────────────────────────────────────────

/// Clean one raw frame into a log line, or `None` if nothing is left.
///
/// Binary frames must be valid UTF-8; anything else is treated as empty
/// and dropped.
pub fn sanitize(frame: &Frame) -> Option<LogLine> {
    match frame {
        Frame::Text(text) => sanitize_text(text),
        Frame::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => sanitize_text(text),
            Err(e) => {
                tracing::debug!(error = %e, len = bytes.len(), "Dropping undecodable binary frame");
                None
            }
        },
    }
}

/// Clean raw text into a log line, or `None` if nothing is left.
pub fn sanitize_text(raw: &str) -> Option<LogLine> {
    let stripped = ANSI_ESCAPE_PATTERN.replace_all(raw, "");
    let cleaned = CONTROL_CHAR_PATTERN.replace_all(&stripped, "");
    let trimmed = cleaned.trim_end();

    if trimmed.is_empty() {
        None
    } else {
        Some(LogLine(trimmed.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> Option<String> {
        sanitize_text(raw).map(LogLine::into_string)
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean("Accepted share 42").as_deref(), Some("Accepted share 42"));
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(
            clean("\x1b[1;32m[INFO]\x1b[0m pool 0 alive").as_deref(),
            Some("[INFO] pool 0 alive")
        );
    }

    #[test]
    fn strips_eight_bit_csi_and_c1_controls() {
        assert_eq!(clean("\u{9b}31mC1\u{9b}0m").as_deref(), Some("C1"));
        assert_eq!(clean("chain\u{85} 2\u{9c} ok").as_deref(), Some("chain 2 ok"));
    }

    #[test]
    fn truncated_escape_at_end_of_frame_is_dropped() {
        assert_eq!(clean("ok\x1b[1;2;3").as_deref(), Some("ok"));
        assert_eq!(clean("ok\x1b]0;half a tit").as_deref(), Some("ok"));
    }

    #[test]
    fn strips_cursor_and_erase_sequences() {
        assert_eq!(clean("\x1b[2K\x1b[1Ghashrate 13.5T").as_deref(), Some("hashrate 13.5T"));
        assert_eq!(clean("\x1b[?25lfan 4200rpm\x1b[?25h").as_deref(), Some("fan 4200rpm"));
    }

    #[test]
    fn strips_osc_sequences() {
        assert_eq!(clean("\x1b]0;miner\x07booting").as_deref(), Some("booting"));
        assert_eq!(clean("\x1b]8;;http://x\x1b\\link").as_deref(), Some("link"));
    }

    #[test]
    fn strips_charset_and_single_char_escapes() {
        assert_eq!(clean("\x1b(Bchain 1\x1b7 ok\x1b8").as_deref(), Some("chain 1 ok"));
    }

    #[test]
    fn trims_trailing_whitespace_only() {
        assert_eq!(clean("  temp 65C \r\n\t ").as_deref(), Some("  temp 65C"));
    }

    #[test]
    fn keeps_interior_newlines() {
        assert_eq!(clean("line one\nline two\n").as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn blank_after_sanitizing_is_dropped() {
        assert_eq!(clean(""), None);
        assert_eq!(clean("   \r\n"), None);
        assert_eq!(clean("\x1b[0m\x1b[K  "), None);
    }

    #[test]
    fn binary_frames_are_decoded() {
        let frame = Frame::from(b"\x1b[33mwarn: fan slow\x1b[0m\n".to_vec());
        assert_eq!(sanitize(&frame).unwrap(), "warn: fan slow");
    }

    #[test]
    fn undecodable_binary_is_dropped() {
        let frame = Frame::from(vec![0xff, 0xfe, 0x41]);
        assert_eq!(sanitize(&frame), None);
    }

    #[test]
    fn unicode_survives() {
        assert_eq!(clean("temp → 70°C ✓").as_deref(), Some("temp → 70°C ✓"));
    }
}
