use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::alignment::phonemizer::phoneme_inventory;
use crate::error::SyncError;
use crate::types::SILENCE_PHONEME;

/// Phoneme → class index table shared by the phonemizer and the external
/// aligner. `SP` is always index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeVocabulary {
    ids: HashMap<String, usize>,
}

impl PhonemeVocabulary {
    /// `SP` first, then the remaining phonemes sorted.
    pub fn from_phonemes<I, S>(phonemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rest: BTreeSet<String> = phonemes
            .into_iter()
            .map(Into::into)
            .filter(|p| p != SILENCE_PHONEME && !p.is_empty())
            .collect();
        let mut ids = HashMap::with_capacity(rest.len() + 1);
        ids.insert(SILENCE_PHONEME.to_string(), 0);
        for (i, phoneme) in rest.into_iter().enumerate() {
            ids.insert(phoneme, i + 1);
        }
        Self { ids }
    }

    /// Reads `{"vocab": {...}}` or a flat `{"SP": 0, ...}` map.
    pub fn load_json(path: &Path) -> Result<Self, SyncError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SyncError::io("read phoneme vocabulary", e))?;
        let raw: serde_json::Value = serde_json::from_str(&data)
            .map_err(|e| SyncError::json("parse phoneme vocabulary", e))?;
        Self::from_json_value(&raw)
    }

    fn from_json_value(raw: &serde_json::Value) -> Result<Self, SyncError> {
        let table = raw
            .get("vocab")
            .unwrap_or(raw)
            .as_object()
            .ok_or_else(|| SyncError::invalid_input("phoneme vocabulary is not a JSON object"))?;

        let ids: HashMap<String, usize> = table
            .iter()
            .filter(|(k, _)| !k.starts_with('<'))
            .filter_map(|(k, v)| Some((k.clone(), usize::try_from(v.as_u64()?).ok()?)))
            .collect();

        if ids.is_empty() {
            return Err(SyncError::invalid_input("phoneme vocabulary has no entries"));
        }
        match ids.get(SILENCE_PHONEME) {
            Some(0) => Ok(Self { ids }),
            found => {
                tracing::warn!(
                    silence_index = ?found,
                    entries = ids.len(),
                    "phoneme vocabulary does not map silence to 0; using built-in inventory"
                );
                Ok(Self::default())
            }
        }
    }

    /// Reads a `word<TAB>ph ph ph` pronunciation dictionary and collects its
    /// phoneme set.
    pub fn load_dictionary(path: &Path) -> Result<Self, SyncError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SyncError::io("read pronunciation dictionary", e))?;
        let phonemes: Vec<&str> = data
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .flat_map(|(_, pron)| pron.split_whitespace())
            .collect();
        if phonemes.is_empty() {
            return Err(SyncError::invalid_input(
                "pronunciation dictionary contains no phonemes",
            ));
        }
        Ok(Self::from_phonemes(phonemes))
    }

    /// Config first, then the dictionary; `None` when neither loads.
    pub fn load_with_fallback(config: Option<&Path>, dictionary: Option<&Path>) -> Option<Self> {
        if let Some(path) = config {
            match Self::load_json(path) {
                Ok(vocab) => return Some(vocab),
                Err(err) => tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "phoneme vocabulary config unusable; trying dictionary"
                ),
            }
        }
        if let Some(path) = dictionary {
            match Self::load_dictionary(path) {
                Ok(vocab) => return Some(vocab),
                Err(err) => tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "pronunciation dictionary unusable"
                ),
            }
        }
        None
    }

    pub fn id(&self, phoneme: &str) -> Option<usize> {
        self.ids.get(phoneme).copied()
    }

    pub fn contains(&self, phoneme: &str) -> bool {
        self.ids.contains_key(phoneme)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for PhonemeVocabulary {
    /// Every phoneme the built-in phonemizer can emit.
    fn default() -> Self {
        Self::from_phonemes(phoneme_inventory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn from_phonemes_puts_silence_first_and_sorts() {
        let vocab = PhonemeVocabulary::from_phonemes(["o", "SP", "a", "bb", "a"]);
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.id("SP"), Some(0));
        assert_eq!(vocab.id("a"), Some(1));
        assert_eq!(vocab.id("bb"), Some(2));
        assert_eq!(vocab.id("o"), Some(3));
    }

    #[test]
    fn default_covers_phonemizer_output() {
        let vocab = PhonemeVocabulary::default();
        let seq = crate::alignment::phonemizer::tokenize("닭 값 옷 love 사랑 baby 123");
        for phoneme in &seq.phonemes {
            assert!(vocab.contains(phoneme), "missing {phoneme}");
        }
    }

    #[test]
    fn json_nested_and_flat_forms() {
        let nested = serde_json::json!({"vocab": {"SP": 0, "a": 1, "<pad>": 2, "b": "x"}});
        let vocab = PhonemeVocabulary::from_json_value(&nested).expect("nested vocab");
        assert_eq!(vocab.len(), 2);
        assert!(!vocab.contains("<pad>"));
        assert!(!vocab.contains("b"));

        let flat = serde_json::json!({"SP": 0, "k": 5});
        let vocab = PhonemeVocabulary::from_json_value(&flat).expect("flat vocab");
        assert_eq!(vocab.id("k"), Some(5));
    }

    #[test]
    fn misplaced_silence_uses_builtin_inventory() {
        let raw = serde_json::json!({"SP": 3, "a": 0});
        let vocab = PhonemeVocabulary::from_json_value(&raw).expect("inventory vocab");
        assert_eq!(vocab, PhonemeVocabulary::default());
        assert_eq!(vocab.id("SP"), Some(0));

        let raw = serde_json::json!({"a": 0});
        let vocab = PhonemeVocabulary::from_json_value(&raw).expect("inventory vocab");
        assert_eq!(vocab, PhonemeVocabulary::default());
    }

    #[test]
    fn json_without_usable_entries_is_rejected() {
        let raw = serde_json::json!({"vocab": {"<pad>": 0}});
        let err = PhonemeVocabulary::from_json_value(&raw).unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput { .. }));
        assert!(PhonemeVocabulary::from_json_value(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn misplaced_silence_config_is_not_replaced_by_dictionary() {
        let config = temp_file("lyrics_sync_rs_vocab_bad_sp.json", r#"{"SP": 2, "zz": 0}"#);
        let dict = temp_file("lyrics_sync_rs_vocab_bad_sp.tsv", "a\tqq\n");
        let vocab = PhonemeVocabulary::load_with_fallback(Some(&config), Some(&dict))
            .expect("inventory vocab");
        assert_eq!(vocab, PhonemeVocabulary::default());
        assert!(!vocab.contains("zz"));
        let _ = std::fs::remove_file(&config);
        let _ = std::fs::remove_file(&dict);
    }

    #[test]
    fn dictionary_forces_silence_to_zero() {
        let path = temp_file(
            "lyrics_sync_rs_vocab_dict.tsv",
            "사랑\ts a r a NG\nbaby\tb e i b i\nbroken line\n",
        );
        let vocab = PhonemeVocabulary::load_dictionary(&path).expect("dictionary vocab");
        assert_eq!(vocab.id("SP"), Some(0));
        assert!(vocab.contains("NG"));
        assert!(vocab.contains("e"));
        assert_eq!(vocab.len(), 8);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn fallback_prefers_config_then_dictionary() {
        let config = temp_file("lyrics_sync_rs_vocab_cfg.json", r#"{"SP": 0, "zz": 1}"#);
        let dict = temp_file("lyrics_sync_rs_vocab_fallback.tsv", "a\ta\n");

        let vocab = PhonemeVocabulary::load_with_fallback(Some(&config), Some(&dict))
            .expect("config vocab");
        assert!(vocab.contains("zz"));

        let missing = Path::new("/nonexistent/vocab.json");
        let vocab = PhonemeVocabulary::load_with_fallback(Some(missing), Some(&dict))
            .expect("dictionary vocab");
        assert!(vocab.contains("a"));
        assert!(!vocab.contains("zz"));

        assert!(PhonemeVocabulary::load_with_fallback(Some(missing), None).is_none());
        let _ = std::fs::remove_file(&config);
        let _ = std::fs::remove_file(&dict);
    }
}
