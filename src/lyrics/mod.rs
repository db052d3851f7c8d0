//! Lyric text handling around the aligners: line splitting, cleanup,
//! language detection and word/line layout.

mod clean;
mod language;
mod layout;

pub use clean::{clean_lines, clean_lyric_line, clean_segments};
pub use language::detect_language;
pub use layout::{distribute_words, enforce_monotonic_lines, group_words_into_lines};

/// Trimmed, non-empty lines with CRLF and CR normalized.
pub fn split_lyric_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_normalizes_line_endings() {
        let lines = split_lyric_lines("  첫 줄 \r\n\r\n둘째 줄\rthird\n");
        assert_eq!(lines, vec!["첫 줄", "둘째 줄", "third"]);
        assert!(split_lyric_lines(" \n\t\n").is_empty());
    }
}
