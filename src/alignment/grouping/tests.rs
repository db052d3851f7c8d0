use super::*;
use crate::types::PhonemeSpan;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn span(ph: &str, start: f64, end: f64) -> PhonemeSpan {
    PhonemeSpan::new(ph, start, end)
}

#[test]
fn one_to_one_spans_take_min_start_max_end() {
    let phonemes = strings(&["SP", "h", "a", "N", "SP", "g", "u", "K", "SP"]);
    let word_index = vec![None, Some(0), Some(0), Some(0), None, Some(1), Some(1), Some(1), None];
    let spans = vec![
        span("SP", 0.0, 0.5),
        span("h", 0.5, 0.6),
        span("a", 0.6, 0.9),
        span("N", 0.9, 1.0),
        span("SP", 1.0, 1.2),
        span("g", 1.2, 1.3),
        span("u", 1.3, 1.6),
        span("K", 1.6, 1.7),
        span("SP", 1.7, 2.0),
    ];
    let words = strings(&["한", "국"]);
    let agg = aggregate_word_spans(&phonemes, &word_index, &spans, 2);
    let out = spans_to_words(&words, &agg, 0);
    assert_eq!(out.len(), 2);
    assert_eq!((out[0].word.start_time, out[0].word.end_time), (0.5, 1.0));
    assert_eq!((out[1].word.start_time, out[1].word.end_time), (1.2, 1.7));
    assert_eq!(out[1].index, 1);
}

#[test]
fn ragged_spans_match_by_identity_in_order() {
    let phonemes = strings(&["SP", "n", "a", "SP", "n", "a", "SP"]);
    let word_index = vec![None, Some(0), Some(0), None, Some(1), Some(1), None];
    // aligner merged the first word's onset away
    let spans = vec![
        span("a", 0.2, 0.4),
        span("SP", 0.4, 0.5),
        span("n", 0.5, 0.6),
        span("a", 0.6, 0.9),
    ];
    let agg = aggregate_word_spans(&phonemes, &word_index, &spans, 2);
    let out = spans_to_words(&strings(&["나", "나"]), &agg, 0);
    assert_eq!((out[0].word.start_time, out[0].word.end_time), (0.2, 0.4));
    assert_eq!((out[1].word.start_time, out[1].word.end_time), (0.5, 0.9));
}

#[test]
fn unresolvable_spans_are_discarded_and_words_omitted() {
    let phonemes = strings(&["SP", "o", "SP", "a", "SP"]);
    let word_index = vec![None, Some(0), None, Some(1), None];
    let spans = vec![span("o", 1.0, 1.5), span("zz", 1.5, 2.0)];
    let agg = aggregate_word_spans(&phonemes, &word_index, &spans, 2);
    let out = spans_to_words(&strings(&["oh", "ah"]), &agg, 10);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].index, 10);
    assert_eq!(out[0].word.text, "oh");
}

#[test]
fn timestamps_round_to_milliseconds() {
    assert_eq!(round_ms(1.23456), 1.235);
    assert_eq!(round_ms(0.0004), 0.0);
}
