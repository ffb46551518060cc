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

//! The JSON deck format: an array of `{"question", "answer"}` objects.

use serde_json::Value;

use crate::error::Fallible;
use crate::types::flashcard::Flashcard;
use crate::types::flashcard::RawFlashcard;
use crate::types::flashcard::validate_cards;

/// Serialize cards as a pretty-printed JSON array.
pub fn cards_to_json(cards: &[Flashcard]) -> Fallible<String> {
    Ok(serde_json::to_string_pretty(cards)?)
}

/// Parse a JSON deck. Cards with a blank side are dropped.
pub fn cards_from_json(text: &str) -> Fallible<Vec<Flashcard>> {
    let raw: Vec<RawFlashcard> = serde_json::from_str(text)?;
    Ok(validate_cards(raw))
}

/// Convert loosely-typed JSON items into cards.
///
/// Non-string scalars are stringified, missing or null fields count as
/// blank, and items that are not objects are dropped.
pub fn cards_from_values(values: Vec<Value>) -> Vec<Flashcard> {
    let raw = values.into_iter().filter_map(|value| match value {
        Value::Object(map) => Some(RawFlashcard {
            question: field_to_string(map.get("question")),
            answer: field_to_string(map.get("answer")),
        }),
        _ => None,
    });
    validate_cards(raw)
}

fn field_to_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_round_trip() -> Fallible<()> {
        let cards = vec![
            Flashcard::new("What is Paris?", "the capital of France")?,
            Flashcard::new("¿Qué es Madrid?", "la capital de España")?,
            Flashcard::new("What is Paris?", "the capital of France")?,
        ];
        let json = cards_to_json(&cards)?;
        assert_eq!(cards_from_json(&json)?, cards);
        Ok(())
    }

    #[test]
    fn test_pretty_format() -> Fallible<()> {
        let cards = vec![Flashcard::new("Q", "España")?];
        let json = cards_to_json(&cards)?;
        assert_eq!(
            json,
            "[\n  {\n    \"question\": \"Q\",\n    \"answer\": \"España\"\n  }\n]"
        );
        Ok(())
    }

    #[test]
    fn test_from_json_drops_invalid() -> Fallible<()> {
        let text = r#"[
            {"question": "Q1", "answer": "A1"},
            {"question": "", "answer": "A2"},
            {"answer": "A3"},
            {"question": "  Q4  ", "answer": " A4 "}
        ]"#;
        let cards = cards_from_json(text)?;
        assert_eq!(
            cards,
            vec![Flashcard::new("Q1", "A1")?, Flashcard::new("Q4", "A4")?]
        );
        Ok(())
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(cards_from_json(r#"{"question": "Q"}"#).is_err());
        assert!(cards_from_json("not json").is_err());
    }

    #[test]
    fn test_cards_from_values() -> Fallible<()> {
        let values = vec![
            json!({"question": "How many?", "answer": 42}),
            json!({"question": "Null?", "answer": null}),
            json!("just a string"),
            json!({"question": "Q", "answer": "A", "extra": true}),
        ];
        let cards = cards_from_values(values);
        assert_eq!(
            cards,
            vec![Flashcard::new("How many?", "42")?, Flashcard::new("Q", "A")?]
        );
        Ok(())
    }
}
