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

//! cardsmith-core: flashcard generation and quizzing, with no I/O.
//!
//! - Heuristic question/answer generation from plain text
//! - The multiple-choice quiz state machine
//! - The JSON deck format

pub mod deck;
pub mod error;
pub mod generator;
pub mod options;
pub mod quiz;
pub mod rng;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorKind, ErrorReport, Fallible, fail};
pub use generator::generate_flashcards_offline;
pub use options::build_mc_options;
pub use quiz::{QuizState, QuizStatus, Review};
pub use types::flashcard::Flashcard;
