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

//! The quiz state machine.
//!
//! A quiz walks the card list front to back. At each card the user may check
//! an answer any number of times; the first correct check scores a point.
//! Moving past the last card finishes the quiz.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::hash_map::Entry;

use crate::error::Fallible;
use crate::error::fail;
use crate::options::build_mc_options;
use crate::rng::TinyRng;
use crate::types::flashcard::Flashcard;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizStatus {
    InProgress { index: usize },
    Finished,
}

/// The outcome of the last check on a question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Review {
    pub selected: String,
    pub correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizSummary {
    /// Questions that were checked at least once.
    pub answered: usize,
    pub score: usize,
    pub total: usize,
}

impl QuizSummary {
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            (self.score * 100) / self.total
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuizState {
    index: usize,
    score: usize,
    finished: bool,
    reviews: BTreeMap<usize, Review>,
    /// Indices that already earned their point.
    scored: HashSet<usize>,
    /// Options are built once per index so re-rendering is stable.
    options: HashMap<usize, Vec<String>>,
    option_count: usize,
}

impl QuizState {
    pub fn new(option_count: usize) -> Self {
        Self {
            index: 0,
            score: 0,
            finished: false,
            reviews: BTreeMap::new(),
            scored: HashSet::new(),
            options: HashMap::new(),
            option_count,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn status(&self) -> QuizStatus {
        if self.finished {
            QuizStatus::Finished
        } else {
            QuizStatus::InProgress { index: self.index }
        }
    }

    /// Reconcile the state with the deck size. An index past the end of the
    /// deck finishes the quiz.
    pub fn sync(&mut self, card_count: usize) -> QuizStatus {
        if self.index >= card_count {
            self.finished = true;
        }
        self.status()
    }

    /// The options for the current question, built on first use.
    pub fn options(&mut self, cards: &[Flashcard], rng: &mut TinyRng) -> Fallible<&[String]> {
        let index = match self.sync(cards.len()) {
            QuizStatus::InProgress { index } => index,
            QuizStatus::Finished => return fail("the quiz is already finished"),
        };
        let n = self.option_count;
        match self.options.entry(index) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                let built = build_mc_options(cards, index, n, rng)?;
                Ok(entry.insert(built).as_slice())
            }
        }
    }

    /// Record `selected` as the answer to the current question. Does not
    /// advance. A question scores at most once however often it is checked.
    pub fn check(&mut self, cards: &[Flashcard], selected: &str) -> Fallible<Review> {
        let index = match self.sync(cards.len()) {
            QuizStatus::InProgress { index } => index,
            QuizStatus::Finished => return fail("the quiz is already finished"),
        };
        let correct = selected.trim() == cards[index].answer().trim();
        let review = Review {
            selected: selected.to_string(),
            correct,
        };
        self.reviews.insert(index, review.clone());
        if correct && self.scored.insert(index) {
            self.score += 1;
        }
        log::debug!("Checked question {index}: correct={correct}, score={}", self.score);
        Ok(review)
    }

    /// Move to the next question, whether or not this one was checked.
    pub fn next(&mut self, card_count: usize) -> QuizStatus {
        if !self.finished {
            self.index += 1;
        }
        self.sync(card_count)
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.score = 0;
        self.finished = false;
        self.reviews.clear();
        self.scored.clear();
        self.options.clear();
    }

    pub fn review(&self, index: usize) -> Option<&Review> {
        self.reviews.get(&index)
    }

    pub fn summary(&self, total: usize) -> QuizSummary {
        QuizSummary {
            answered: self.reviews.len(),
            score: self.score,
            total,
        }
    }
}
