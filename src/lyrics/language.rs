fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7AF}').contains(&c)
}

fn is_kana(c: char) -> bool {
    ('\u{3040}'..='\u{30FF}').contains(&c)
}

/// Picks the lyric language code. An explicit hint always wins; otherwise
/// Hangul in the title or artist, then the script mix of the text decide.
pub fn detect_language(
    text: &str,
    hint: Option<&str>,
    title: Option<&str>,
    artist: Option<&str>,
) -> String {
    if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
        return hint.to_string();
    }
    if [title, artist]
        .into_iter()
        .flatten()
        .any(|meta| meta.chars().any(is_hangul))
    {
        return "ko".to_string();
    }

    let mut total = 0usize;
    let mut hangul = 0usize;
    let mut kana = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_hangul(c) {
            hangul += 1;
        } else if is_kana(c) {
            kana += 1;
        }
    }
    if total > 0 {
        let total = total as f64;
        if hangul as f64 / total > 0.2 {
            return "ko".to_string();
        }
        if kana as f64 / total > 0.2 {
            return "ja".to_string();
        }
    }
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_wins() {
        assert_eq!(detect_language("사랑해", Some("ja"), None, None), "ja");
        assert_eq!(detect_language("사랑해", Some("  "), None, None), "ko");
    }

    #[test]
    fn hangul_metadata_means_korean() {
        assert_eq!(
            detect_language("baby baby", None, Some("사랑"), None),
            "ko"
        );
        assert_eq!(
            detect_language("baby baby", None, Some("Love"), Some("아이유")),
            "ko"
        );
    }

    #[test]
    fn script_share_decides() {
        assert_eq!(detect_language("oh baby 사랑해", None, None, None), "ko");
        assert_eq!(detect_language("あいしてる forever", None, None, None), "ja");
        assert_eq!(
            detect_language("this line has only one 한 syllable", None, None, None),
            "en"
        );
        assert_eq!(detect_language("", None, None, None), "en");
    }
}
