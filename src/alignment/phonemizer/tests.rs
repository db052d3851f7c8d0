use super::*;

fn phonemes_of(seq: &PhonemeSequence) -> Vec<&str> {
    seq.phonemes.iter().map(String::as_str).collect()
}

#[test]
fn decomposes_han_into_onset_nucleus_coda() {
    assert_eq!(decompose_syllable('한'), Some((18, 0, 4)));
    assert_eq!(syllable_phonemes('한'), vec!["h", "a", "N"]);
}

#[test]
fn silent_onset_is_skipped() {
    // 아: onset ㅇ, nucleus ㅏ, no coda
    assert_eq!(syllable_phonemes('아'), vec!["a"]);
    // 양: ㅇ coda is the velar nasal
    assert_eq!(syllable_phonemes('양'), vec!["ya", "NG"]);
}

#[test]
fn codas_use_representative_consonant() {
    // 닭 (ㄺ), 값 (ㅄ), 옷 (ㅅ), 부엌 (ㅋ)
    assert_eq!(syllable_phonemes('닭'), vec!["d", "a", "L"]);
    assert_eq!(syllable_phonemes('값'), vec!["g", "a", "P"]);
    assert_eq!(syllable_phonemes('옷'), vec!["o", "T"]);
    assert_eq!(syllable_phonemes('엌'), vec!["eo", "K"]);
}

#[test]
fn boundary_syllables_decompose() {
    assert_eq!(syllable_phonemes('가'), vec!["g", "a"]);
    assert_eq!(syllable_phonemes('힣'), vec!["h", "i", "T"]);
    assert!(syllable_phonemes('A').is_empty());
}

#[test]
fn baby_uses_whole_word_table() {
    let seq = tokenize("baby");
    assert_eq!(phonemes_of(&seq), vec!["SP", "b", "e", "i", "b", "i", "SP"]);
    // letter-by-letter would have been b a b i
    assert_ne!(latin_run_phonemes("baby"), vec!["b", "a", "b", "i"]);
}

#[test]
fn whole_word_lookup_is_case_insensitive() {
    assert_eq!(latin_run_phonemes("YEAH"), vec!["ya"]);
    assert_eq!(latin_run_phonemes("Love"), vec!["r", "eo", "b"]);
}

#[test]
fn unknown_latin_words_map_per_letter() {
    assert_eq!(latin_run_phonemes("fox"), vec!["p", "o", "k", "s"]);
    assert_eq!(latin_run_phonemes("v1"), vec!["b"]);
}

#[test]
fn mixed_korean_english_sequence() {
    let seq = tokenize("오빠 bye");
    assert_eq!(
        phonemes_of(&seq),
        vec!["SP", "o", "bb", "a", "SP", "b", "i", "e", "SP"]
    );
    assert_eq!(seq.words, vec!["오빠", "bye"]);
    assert!(seq.word_index.contains(&Some(0)));
    assert!(seq.word_index.contains(&Some(1)));
    assert_eq!(seq.phonemes.len(), seq.word_index.len());
}

#[test]
fn latin_run_inside_hangul_word_is_flushed_in_order() {
    let seq = tokenize("love사랑");
    assert_eq!(
        phonemes_of(&seq),
        vec!["SP", "r", "eo", "b", "s", "a", "r", "a", "NG", "SP"]
    );
    assert!(seq.word_index[1..seq.len() - 1].iter().all(|w| *w == Some(0)));
}

#[test]
fn punctuation_word_gets_filler_vowel() {
    let seq = tokenize("사랑 ... 해");
    assert_eq!(seq.words.len(), 3);
    let filler: Vec<_> = seq
        .phonemes
        .iter()
        .zip(&seq.word_index)
        .filter(|(_, w)| **w == Some(1))
        .map(|(p, _)| p.as_str())
        .collect();
    assert_eq!(filler, vec!["eo"]);
}

#[test]
fn empty_text_is_single_silence() {
    let seq = tokenize("   \n\t ");
    assert_eq!(phonemes_of(&seq), vec!["SP"]);
    assert_eq!(seq.word_index, vec![None]);
    assert!(seq.words.is_empty());
}

#[test]
fn silence_framing_and_word_coverage_hold() {
    let inputs = [
        "한",
        "오빠 bye",
        "!!! ??? ...",
        "oh 사랑해 baby",
        "ㅋㅋㅋ 하하",
        "나는   너를\t사랑해",
        "123 go",
    ];
    for input in inputs {
        let seq = tokenize(input);
        assert_eq!(seq.phonemes.first().map(String::as_str), Some("SP"), "{input}");
        assert_eq!(seq.phonemes.last().map(String::as_str), Some("SP"), "{input}");
        assert_ne!(seq.phonemes[seq.len() - 2], "SP", "{input}");
        assert_ne!(seq.phonemes.get(1).map(String::as_str), Some("SP"), "{input}");
        let mut run = 0;
        for ph in &seq.phonemes {
            run = if ph == "SP" { run + 1 } else { 0 };
            assert!(run <= 2, "{input}");
        }
        for word in 0..seq.words.len() {
            assert!(seq.word_index.contains(&Some(word)), "{input}: word {word}");
        }
        for (ph, idx) in seq.phonemes.iter().zip(&seq.word_index) {
            assert_eq!(ph == "SP", idx.is_none(), "{input}");
        }
    }
}

#[test]
fn inventory_covers_every_emitted_phoneme() {
    let inventory = phoneme_inventory();
    let seq = tokenize("한국어 노래 가사 oh baby forever 닭 값 xylophone");
    for ph in seq.phonemes.iter().filter(|p| p.as_str() != "SP") {
        assert!(inventory.contains(&ph.as_str()), "{ph}");
    }
    assert!(!inventory.contains(&"SP"));
    assert!(!inventory.contains(&""));
}
