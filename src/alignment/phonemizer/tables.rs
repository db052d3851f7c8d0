//! Grapheme tables for the Hangul decomposition and the English
//! approximation used for mixed-language lyrics.

pub(super) const HANGUL_BASE: u32 = 0xAC00;
pub(super) const HANGUL_LAST: u32 = 0xD7A3;
pub(super) const NUCLEUS_COUNT: u32 = 21;
pub(super) const CODA_COUNT: u32 = 28;

/// 19 onsets; index 11 is the silent ㅇ and emits nothing.
pub(super) const ONSETS: [&str; 19] = [
    "g", "gg", "n", "d", "dd", "r", "m", "b", "bb", "s", "ss", "", "j", "jj", "ch", "k", "t", "p",
    "h",
];

pub(super) const NUCLEI: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa", "wae", "oe", "yo", "u", "wo", "we",
    "wi", "yu", "eu", "ui", "i",
];

/// Codas collapse onto their representative closed-syllable consonant.
pub(super) const CODAS: [&str; 28] = [
    "", "K", "K", "K", "N", "N", "N", "T", "L", "L", "L", "L", "L", "L", "L", "L", "M", "P", "P",
    "T", "T", "NG", "T", "T", "K", "T", "P", "T",
];

pub(super) const FILLER_PHONEME: &str = "eo";

pub(super) fn letter_phonemes(c: char) -> &'static [&'static str] {
    match c {
        'b' | 'v' => &["b"],
        'c' | 'k' | 'q' => &["k"],
        'd' => &["d"],
        'f' | 'p' => &["p"],
        'g' => &["g"],
        'h' => &["h"],
        'j' | 'z' => &["j"],
        'l' => &["L"],
        'm' => &["m"],
        'n' => &["n"],
        'r' => &["r"],
        's' => &["s"],
        't' => &["t"],
        'w' | 'u' => &["u"],
        'x' => &["k", "s"],
        'a' => &["a"],
        'e' => &["e"],
        'i' | 'y' => &["i"],
        'o' => &["o"],
        _ => &[],
    }
}

/// Hand-tuned transliterations for words that show up constantly in pop
/// lyrics. Keys are lower-case.
pub(super) fn word_phonemes(word: &str) -> Option<&'static [&'static str]> {
    let phonemes: &'static [&'static str] = match word {
        "oh" => &["o"],
        "ah" => &["a"],
        "uh" => &["eo"],
        "eh" => &["e"],
        "ooh" | "woo" => &["u"],
        "whoa" => &["wa"],
        "wow" => &["wa", "u"],
        "hey" => &["h", "e", "i"],
        "yay" => &["ya", "i"],
        "yo" => &["yo"],
        "na" => &["n", "a"],
        "la" => &["r", "a"],
        "da" => &["d", "a"],
        "yeah" => &["ya"],
        "yeh" => &["ye"],
        "baby" => &["b", "e", "i", "b", "i"],
        "babe" => &["b", "e", "i", "b"],
        "love" => &["r", "eo", "b"],
        "girl" => &["g", "eo", "L"],
        "boy" => &["b", "o", "i"],
        "my" => &["m", "a", "i"],
        "me" => &["m", "i"],
        "you" => &["yu"],
        "we" => &["wi"],
        "no" | "know" => &["n", "o"],
        "go" => &["g", "o"],
        "so" => &["s", "o"],
        "do" => &["d", "u"],
        "say" => &["s", "e", "i"],
        "stay" => &["s", "eu", "t", "e", "i"],
        "day" => &["d", "e", "i"],
        "way" => &["u", "e", "i"],
        "come" => &["k", "eo", "M"],
        "one" => &["u", "a", "N"],
        "time" => &["t", "a", "i", "M"],
        "night" => &["n", "a", "i", "T"],
        "light" | "right" => &["r", "a", "i", "T"],
        "life" => &["r", "a", "i", "P"],
        "heart" => &["h", "a", "T"],
        "stop" => &["s", "eu", "t", "a", "P"],
        "feel" => &["p", "i", "L"],
        "real" => &["r", "i", "eo", "L"],
        "fly" => &["p", "eu", "r", "a", "i"],
        "cry" => &["k", "eu", "r", "a", "i"],
        "try" => &["t", "eu", "r", "a", "i"],
        "why" => &["u", "a", "i"],
        "high" => &["h", "a", "i"],
        "fire" => &["p", "a", "i", "eo"],
        "more" => &["m", "o", "eo"],
        "like" => &["r", "a", "i", "K"],
        "take" => &["t", "e", "i", "K"],
        "make" => &["m", "e", "i", "K"],
        "break" => &["b", "eu", "r", "e", "i", "K"],
        "dance" => &["d", "ae", "N", "s", "eu"],
        "chance" => &["ch", "ae", "N", "s", "eu"],
        "forever" => &["p", "o", "r", "e", "b", "eo"],
        "never" => &["n", "e", "b", "eo"],
        "ever" => &["e", "b", "eo"],
        "over" => &["o", "b", "eo"],
        "under" => &["eo", "N", "d", "eo"],
        "away" => &["eo", "u", "e", "i"],
        "tonight" => &["t", "u", "n", "a", "i", "T"],
        "alright" => &["o", "L", "r", "a", "i", "T"],
        "hello" => &["h", "e", "L", "r", "o"],
        "world" => &["u", "eo", "L", "d", "eu"],
        "only" => &["o", "N", "r", "i"],
        "just" => &["j", "eo", "s", "eu", "T"],
        "wanna" => &["u", "a", "n", "a"],
        "gonna" => &["g", "o", "n", "a"],
        "gotta" => &["g", "a", "t", "a"],
        "lala" => &["r", "a", "r", "a"],
        "lalala" => &["r", "a", "r", "a", "r", "a"],
        "nanana" => &["n", "a", "n", "a", "n", "a"],
        _ => return None,
    };
    Some(phonemes)
}
