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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A question/answer pair. Both sides are trimmed and non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFlashcard")]
pub struct Flashcard {
    question: String,
    answer: String,
}

/// A card as it arrives from untrusted input, before validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawFlashcard {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl AsRef<str>, answer: impl AsRef<str>) -> Fallible<Self> {
        let question = question.as_ref().trim();
        let answer = answer.as_ref().trim();
        if question.is_empty() {
            return Err(ErrorReport::data("flashcard question is empty"));
        }
        if answer.is_empty() {
            return Err(ErrorReport::data("flashcard answer is empty"));
        }
        Ok(Flashcard {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

impl TryFrom<RawFlashcard> for Flashcard {
    type Error = ErrorReport;

    fn try_from(raw: RawFlashcard) -> Result<Self, Self::Error> {
        Flashcard::new(raw.question, raw.answer)
    }
}

/// Keep the cards that pass validation, in order, dropping the rest.
pub fn validate_cards(raw: impl IntoIterator<Item = RawFlashcard>) -> Vec<Flashcard> {
    raw.into_iter()
        .filter_map(|card| Flashcard::try_from(card).ok())
        .collect()
}
