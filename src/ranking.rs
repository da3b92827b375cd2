use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::CloudError;

pub const DEFAULT_INPUT: &str = "words.txt";

// Common English words with no meaning of their own in a cloud.
const STOP_WORDS: &[&str] = &[
    "a", "an", "am", "and", "the", "you", "me", "my", "us", "be", "it", "he", "she", "him", "her",
    "his", "hers", "ye", "your", "so", "or", "is", "isnt", "not", "mr", "mrs", "ms", "dr", "sr",
    "they", "we", "of", "to", "its", "i", "on", "oh", "if", "as", "by", "them", "our", "in", "for",
    "do", "dont", "does", "doesnt", "did", "at", "are", "im", "youre", "theyre", "was", "were",
    "this", "that", "what", "which", "who", "where", "whom", "when", "how", "but", "with",
    "within", "from", "will", "shall", "would", "should",
];

#[derive(Debug, Clone, PartialEq)]
pub struct RankedWord {
    pub text: String,
    pub frequency: f64,
    pub rank: usize,
}

/// Resolves the `--input` argument: an existing file is read, anything else
/// is taken as the text itself. Without an argument the default file must
/// exist.
pub fn resolve_input(input: Option<&str>) -> Result<String> {
    let Some(input) = input else {
        let path = Path::new(DEFAULT_INPUT);
        if !path.is_file() {
            return Err(anyhow!(
                "no --input given and default input file not found: {}",
                DEFAULT_INPUT
            ));
        }
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read input: {}", path.display()));
    };
    let path = Path::new(input);
    if path.is_file() {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read input: {}", path.display()));
    }
    Ok(input.to_string())
}

pub fn rank_words(text: &str) -> Result<Vec<RankedWord>, CloudError> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for raw in text.split_whitespace() {
        if let Some(word) = normalize_token(raw) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut ordered: Vec<(String, u32)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    let max_count = match ordered.first() {
        Some((_, count)) => *count as f64,
        None => return Err(CloudError::NoWords),
    };

    Ok(ordered
        .into_iter()
        .enumerate()
        .map(|(rank, (text, count))| RankedWord {
            text,
            frequency: count as f64 / max_count,
            rank,
        })
        .collect())
}

fn normalize_token(raw: &str) -> Option<String> {
    let mut word = raw.to_lowercase();
    if let Some(idx) = word.find("'s") {
        word.replace_range(idx..idx + 2, "");
    }
    word.retain(|ch| !ch.is_ascii_punctuation());
    if is_good_word(&word) {
        Some(word)
    } else {
        None
    }
}

fn is_good_word(word: &str) -> bool {
    if word.len() < 2 {
        return false;
    }
    if STOP_WORDS.contains(&word) {
        return false;
    }
    word.bytes().all(|b| b.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(words: &[RankedWord]) -> String {
        words
            .iter()
            .map(|word| format!("{}={}", word.text, word.frequency))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn repeated_words_rank_first() {
        let ranked = rank_words("cat cat dog").expect("ranked");
        insta::assert_snapshot!(summary(&ranked), @"cat=1 dog=0.5");
        assert_eq!(ranked[0].rank, 0);
        assert_eq!(ranked[1].rank, 1);
    }

    #[test]
    fn stop_words_punctuation_and_possessives_are_cleaned() {
        let ranked =
            rank_words("The cat's toy, the CAT! And a dog... it is 42 x7 b").expect("ranked");
        insta::assert_snapshot!(summary(&ranked), @"cat=1 dog=0.5 toy=0.5");
    }

    #[test]
    fn ties_keep_alphabetical_order() {
        let ranked = rank_words("pear apple fig fig").expect("ranked");
        let texts: Vec<&str> = ranked.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["fig", "apple", "pear"]);
    }

    #[test]
    fn frequencies_are_normalized_and_non_increasing() {
        let ranked = rank_words(
            "storm rain rain cloud cloud cloud wind wind wind wind sun sun thunder",
        )
        .expect("ranked");
        assert_eq!(ranked[0].frequency, 1.0);
        assert!(ranked.iter().all(|w| w.frequency > 0.0 && w.frequency <= 1.0));
        assert!(ranked.windows(2).all(|pair| pair[0].frequency >= pair[1].frequency));
    }

    #[test]
    fn empty_or_blank_text_has_no_words() {
        assert!(matches!(rank_words(""), Err(CloudError::NoWords)));
        assert!(matches!(rank_words("   \n\t "), Err(CloudError::NoWords)));
        assert!(matches!(rank_words("the a an of"), Err(CloudError::NoWords)));
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        let ranked = rank_words("café cafe").expect("ranked");
        assert_eq!(summary(&ranked), "cafe=1");
    }

    #[test]
    fn input_argument_reads_existing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("words.txt");
        fs::write(&path, "fox fox hen").expect("write");
        let text = resolve_input(path.to_str()).expect("input");
        assert_eq!(text, "fox fox hen");
        let literal = resolve_input(Some("plain words here")).expect("literal");
        assert_eq!(literal, "plain words here");
    }
}
