// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Offline flashcard generation.
//!
//! Sentences that read like definitions ("X is Y") are preferred, and each
//! selected sentence is rewritten into a question/answer pair.

use std::collections::HashSet;

use crate::types::flashcard::Flashcard;

/// Characters that end a sentence when followed by whitespace.
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// How much of a sentence is quoted in a generic question.
const QUOTE_LIMIT: usize = 140;

/// Collapse every run of whitespace into a single space, and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into sentences at whitespace that follows a terminator.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut push = |piece: &str| {
        let piece = normalize_whitespace(piece);
        if !piece.is_empty() {
            sentences.push(piece);
        }
    };
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let after_terminator = prev.is_some_and(|p| SENTENCE_TERMINATORS.contains(&p));
        if ch.is_whitespace() && after_terminator {
            push(&text[start..idx]);
            // Swallow the rest of the whitespace run.
            let mut end = idx + ch.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }
    push(&text[start..]);
    sentences
}

/// Score how much a sentence looks like a definition or key fact.
pub fn score_sentence(sentence: &str) -> u32 {
    let mut score = 0;
    let lower = sentence.to_lowercase();
    if lower.contains(" is ") || lower.contains(" are ") {
        score += 3;
    }
    if sentence.contains(':') {
        score += 1;
    }
    let len = sentence.chars().count();
    if len > 80 {
        score += 1;
    }
    if len > 140 {
        score += 1;
    }
    score
}

/// Pick the `k` best sentences. Ties keep their original order, and repeated
/// sentences are only counted once.
pub fn select_key_sentences(sentences: &[String], k: usize) -> Vec<String> {
    let mut scored: Vec<(u32, &String)> = sentences
        .iter()
        .map(|sentence| (score_sentence(sentence), sentence))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    let window = k.saturating_mul(2).max(k.saturating_add(3));
    let mut seen: HashSet<&str> = HashSet::new();
    scored
        .into_iter()
        .take(window)
        .map(|(_, sentence)| sentence)
        .filter(|&sentence| seen.insert(sentence.as_str()))
        .take(k)
        .cloned()
        .collect()
}

/// Find the first `<subject> is <description>` split in a sentence.
///
/// The copula is matched case-insensitively and must be surrounded by
/// whitespace; the subject is the shortest non-empty prefix that works.
fn split_on_copula(sentence: &str) -> Option<(&str, &str)> {
    let chars: Vec<(usize, char)> = sentence.char_indices().collect();
    for pos in 1..chars.len() {
        let (subject_end, ch) = chars[pos];
        if !ch.is_whitespace() {
            continue;
        }
        let mut j = pos;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        if j + 2 >= chars.len() {
            continue;
        }
        let is_copula = chars[j].1.eq_ignore_ascii_case(&'i')
            && chars[j + 1].1.eq_ignore_ascii_case(&'s')
            && chars[j + 2].1.is_whitespace();
        if !is_copula {
            continue;
        }
        let rest = sentence[chars[j + 2].0..].trim_start();
        if rest.is_empty() {
            continue;
        }
        return Some((&sentence[..subject_end], rest));
    }
    None
}

/// Rewrite a sentence as a flashcard. Returns `None` for blank input, and
/// for a definition whose description is only punctuation ("It is ...").
pub fn sentence_to_card(sentence: &str) -> Option<Flashcard> {
    if let Some((subject, rest)) = split_on_copula(sentence) {
        let subject = normalize_whitespace(subject);
        let description = normalize_whitespace(rest.trim_end_matches(['.', ' ']));
        return Flashcard::new(format!("What is {subject}?"), description).ok();
    }
    let quoted: String = sentence.chars().take(QUOTE_LIMIT).collect();
    Flashcard::new(
        format!("What is the key idea of: \"{quoted}\"?"),
        sentence,
    )
    .ok()
}

/// Generate up to `k` flashcards from raw text without any external service.
pub fn generate_flashcards_offline(text: &str, k: usize) -> Vec<Flashcard> {
    let text = normalize_whitespace(text);
    if text.is_empty() || k == 0 {
        return Vec::new();
    }
    let sentences = split_sentences(&text);
    let facts = select_key_sentences(&sentences, k);
    let mut cards: Vec<Flashcard> = facts
        .iter()
        .filter_map(|sentence| sentence_to_card(sentence))
        .collect();
    cards.truncate(k);
    log::debug!(
        "Generated {} offline cards from {} sentences",
        cards.len(),
        sentences.len()
    );
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(normalize_whitespace("\n \t"), "");
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("One.  Two!\nThree? Four");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four"]);
    }

    #[test]
    fn test_split_keeps_inner_punctuation() {
        let sentences = split_sentences("Version 1.5 is out. e.g.this stays");
        assert_eq!(sentences, vec!["Version 1.5 is out.", "e.g.this stays"]);
    }

    #[test]
    fn test_score_sentence() {
        assert_eq!(score_sentence("Nothing here"), 0);
        assert_eq!(score_sentence("Rust is fast"), 3);
        assert_eq!(score_sentence("Cats ARE mammals"), 3);
        assert_eq!(score_sentence("Note: this"), 1);
        let long = "x".repeat(81);
        assert_eq!(score_sentence(&long), 1);
        let longer = "x".repeat(141);
        assert_eq!(score_sentence(&longer), 2);
        let all = format!("Term is here: {}", "y".repeat(140));
        assert_eq!(score_sentence(&all), 6);
    }

    #[test]
    fn test_select_prefers_definitions() {
        let sentences: Vec<String> = ["Hello there.", "Rust is a language.", "Bye."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let selected = select_key_sentences(&sentences, 1);
        assert_eq!(selected, vec!["Rust is a language."]);
    }

    #[test]
    fn test_select_dedupes_and_keeps_order() {
        let sentences: Vec<String> = ["A is b.", "C.", "A is b.", "D is e.", "F."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let selected = select_key_sentences(&sentences, 3);
        assert_eq!(selected, vec!["A is b.", "D is e.", "C."]);
    }

    #[test]
    fn test_paris() {
        let card = sentence_to_card("Paris is the capital of France.").unwrap();
        assert_eq!(card.question(), "What is Paris?");
        assert_eq!(card.answer(), "the capital of France");
    }

    #[test]
    fn test_copula_is_case_insensitive_and_whole_word() {
        let card = sentence_to_card("This thing IS great.").unwrap();
        assert_eq!(card.question(), "What is This thing?");
        assert_eq!(card.answer(), "great");
        // "This" and "island" contain "is" but are not the copula.
        let card = sentence_to_card("This island is small.").unwrap();
        assert_eq!(card.question(), "What is This island?");
        assert_eq!(card.answer(), "small");
    }

    #[test]
    fn test_generic_question() {
        let card = sentence_to_card("Photosynthesis converts light.").unwrap();
        assert_eq!(
            card.question(),
            "What is the key idea of: \"Photosynthesis converts light.\"?"
        );
        assert_eq!(card.answer(), "Photosynthesis converts light.");
    }

    #[test]
    fn test_generic_question_truncates_quote() {
        let sentence = "word ".repeat(60).trim().to_string();
        let card = sentence_to_card(&sentence).unwrap();
        let quoted: String = sentence.chars().take(140).collect();
        assert_eq!(
            card.question(),
            format!("What is the key idea of: \"{quoted}\"?")
        );
        assert_eq!(card.answer(), sentence);
    }

    #[test]
    fn test_empty_description_is_dropped() {
        assert!(sentence_to_card("It is ...").is_none());
        let cards = generate_flashcards_offline("It is ... Rust is fast.", 5);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question(), "What is Rust?");
    }

    #[test]
    fn test_generate_empty() {
        assert!(generate_flashcards_offline("", 5).is_empty());
        assert!(generate_flashcards_offline(" \n\t ", 5).is_empty());
        assert!(generate_flashcards_offline("Rust is fast.", 0).is_empty());
    }

    #[test]
    fn test_generate_respects_k_and_validity() {
        let texts = [
            "Paris is the capital of France. Berlin is the capital of Germany. \
             Rome is old. Water: wet. Nothing. Something else! Why? Because.",
            "a. b. c. d. e. f. g. h. i. j. k. l. m. n. o. p.",
            "No terminators at all and no copula either",
            "Ünïcödé is fine. 東京 is big. ok.",
            "... !!! ???",
        ];
        for text in texts {
            for k in [1, 2, 3, 5, 12, 50] {
                let cards = generate_flashcards_offline(text, k);
                assert!(cards.len() <= k);
                for card in cards {
                    assert!(!card.question().trim().is_empty());
                    assert!(!card.answer().trim().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_generate_picks_definitions_first() {
        let text = "Intro text here. Rust is a systems language. More filler. \
                    Cargo is the package manager.";
        let cards = generate_flashcards_offline(text, 2);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question(), "What is Rust?");
        assert_eq!(cards[0].answer(), "a systems language");
        assert_eq!(cards[1].question(), "What is Cargo?");
        assert_eq!(cards[1].answer(), "the package manager");
    }
}
