use std::sync::OnceLock;

use regex::Regex;

use crate::types::AsrSegment;

const BOILERPLATE_PATTERNS: &[&str] = &[
    r"자막|제공|배달의민족|한글자막|시청해주셔서|감사합니다",
    r"광고를.*포함|유료.*광고|PPL",
    r"字幕|提供|感谢观看|订阅|点赞",
    r"ご視聴|チャンネル登録",
    r"subscribe|like.*comment|thanks.*watching",
    r"다음.*영상|next.*video",
    r"MV|뮤직비디오|music\s*video",
];

static BOILERPLATE: OnceLock<Option<Regex>> = OnceLock::new();
static ANNOTATIONS: OnceLock<Option<Regex>> = OnceLock::new();

fn boilerplate() -> Option<&'static Regex> {
    BOILERPLATE
        .get_or_init(|| {
            let pattern = format!("(?i){}", BOILERPLATE_PATTERNS.join("|"));
            match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::warn!(error = %err, "boilerplate filter disabled");
                    None
                }
            }
        })
        .as_ref()
}

fn annotations() -> Option<&'static Regex> {
    ANNOTATIONS
        .get_or_init(|| Regex::new(r"\[.*?\]|\(.*?\)").ok())
        .as_ref()
}

/// Shortens any run of five or more identical characters to three.
fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1usize;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let keep = if run >= 5 { 3 } else { run };
        out.extend(std::iter::repeat(c).take(keep));
    }
    out
}

fn is_decoration(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_whitespace() || matches!(c, '♪' | '~' | '.' | ','))
}

/// Normalizes one lyric or transcript line. `None` when the line carries no
/// lyric content.
pub fn clean_lyric_line(text: &str) -> Option<String> {
    let stripped = match annotations() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };
    let collapsed = collapse_repeats(&stripped);
    let squeezed = collapsed.split_whitespace().collect::<Vec<_>>().join(" ");

    if squeezed.chars().count() < 2 || is_decoration(&squeezed) {
        return None;
    }
    if boilerplate().is_some_and(|re| re.is_match(&squeezed)) {
        tracing::debug!(line = %squeezed, "dropped boilerplate line");
        return None;
    }
    Some(squeezed)
}

pub fn clean_lines<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().filter_map(clean_lyric_line).collect()
}

/// Cleans recognizer output the same way as reference lyrics, rebuilding the
/// segment text from its surviving words.
pub fn clean_segments(segments: Vec<AsrSegment>) -> Vec<AsrSegment> {
    segments
        .into_iter()
        .filter_map(|mut segment| {
            segment.text = clean_lyric_line(&segment.text)?;
            segment.words.retain_mut(|word| {
                word.word = word.word.trim().to_string();
                !word.word.is_empty()
            });
            if !segment.words.is_empty() {
                segment.text = segment
                    .words
                    .iter()
                    .map(|w| w.word.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            (segment.text.chars().count() >= 2).then_some(segment)
        })
        .collect()
}
