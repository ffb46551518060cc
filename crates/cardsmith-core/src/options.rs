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

use std::collections::HashSet;

use crate::error::Fallible;
use crate::error::fail;
use crate::rng::TinyRng;
use crate::rng::shuffle;
use crate::types::flashcard::Flashcard;

/// Number of choices shown per question unless configured otherwise.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Build exactly `n` multiple-choice options for the card at `correct_index`.
///
/// Distractors are distinct answers of the other cards, picked at random. If
/// there are not enough of them, the list is padded with the correct answer,
/// so the result always has `n` entries and contains the correct answer.
pub fn build_mc_options(
    cards: &[Flashcard],
    correct_index: usize,
    n: usize,
    rng: &mut TinyRng,
) -> Fallible<Vec<String>> {
    let Some(target) = cards.get(correct_index) else {
        return fail(format!(
            "question index {correct_index} is out of range ({} cards)",
            cards.len()
        ));
    };
    if n == 0 {
        return fail("a multiple-choice question needs at least one option");
    }
    let correct: &str = target.answer();

    let mut seen: HashSet<&str> = HashSet::from([correct]);
    let mut pool: Vec<&str> = cards
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != correct_index)
        .map(|(_, card)| card.answer())
        .filter(|&answer| seen.insert(answer))
        .collect();
    shuffle(&mut pool, rng);
    pool.truncate(n - 1);

    let mut options: Vec<String> = Vec::with_capacity(n);
    options.push(correct.to_string());
    options.extend(pool.into_iter().map(String::from));
    shuffle(&mut options, rng);
    while options.len() < n {
        options.push(correct.to_string());
    }
    Ok(options)
}
