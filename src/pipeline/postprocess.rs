//! Post-processing: deterministic clean-up of text returned by vision models.
//!
//! Even when told to "return only the extracted text", models sometimes wrap
//! the answer in a code fence, open with a chatty preamble, or leak invisible
//! characters. These rules fix such quirks without touching the recognised
//! words themselves.
//!
//! ## Rule Order
//!
//! Fences are stripped before line endings are normalised so a fenced CRLF
//! answer still matches, and whitespace is trimmed per line before blank
//! lines are collapsed so lines holding only spaces count as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all clean-up rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip an outer code fence (with or without a language tag)
/// 2. Normalise line endings (CRLF / CR → LF)
/// 3. Drop a leading "Here is the extracted text:" style preamble
/// 4. Trim trailing whitespace per line
/// 5. Collapse runs of blank lines to a single blank line
/// 6. Remove invisible characters (keeping ZWNJ / ZWJ)
/// 7. Trim both ends
pub fn clean_ocr_text(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = strip_preamble(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip outer code fences ─────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ──────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Drop a chatty preamble ──────────────────────────────────────────
//
// Only an English first line ending in a colon that announces the text is
// removed; Arabic content never matches.

static RE_PREAMBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:here\s+is|here's|sure[,!]?\s+here\s+is)[^\n]*(?:text|transcription|content)[^\n]*:\s*\n")
        .unwrap()
});

fn strip_preamble(input: &str) -> String {
    RE_PREAMBLE.replace(input, "").to_string()
}

// ── Rule 4: Trim trailing whitespace per line ───────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse blank lines ────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 6: Remove invisible characters ─────────────────────────────────────
//
// ZWNJ (U+200C) and ZWJ (U+200D) control joining in Arabic-script text and
// must survive.

fn remove_invisible_chars(input: &str) -> String {
    input.replace(['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{2060}'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences("```\nمرحبا\n```"), "مرحبا");
        assert_eq!(strip_code_fences("```arabic\nسطر\nسطر\n```"), "سطر\nسطر");
        assert_eq!(strip_code_fences("```text\r\nنص\r\n```"), "نص");
    }

    #[test]
    fn test_inner_fence_untouched() {
        let input = "قبل\n```\ncode\n```\nبعد";
        assert_eq!(strip_code_fences(input), input);
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_strip_preamble() {
        assert_eq!(
            strip_preamble("Here is the extracted Arabic text:\nبسم الله"),
            "بسم الله"
        );
        assert_eq!(strip_preamble("بسم الله:\nالرحمن"), "بسم الله:\nالرحمن");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(trim_trailing_whitespace("  نص   \nسطر  "), "  نص\nسطر");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_remove_invisible_keeps_joiners() {
        let input = "می\u{200C}خواهم\u{200B}\u{FEFF}ك\u{200D}\u{00AD}\u{2060}";
        assert_eq!(remove_invisible_chars(input), "می\u{200C}خواهمك\u{200D}");
    }

    #[test]
    fn test_clean_full_pipeline() {
        let input = "```\r\nHere is the extracted text:\r\nالسطر الأول   \r\n\r\n\r\n\r\nالسطر الثاني\u{200B}\r\n```\n";
        assert_eq!(clean_ocr_text(input), "السطر الأول\n\nالسطر الثاني");
    }

    #[test]
    fn test_clean_plain_text_unchanged() {
        assert_eq!(clean_ocr_text("نص عربي"), "نص عربي");
        assert_eq!(clean_ocr_text("   "), "");
    }
}
