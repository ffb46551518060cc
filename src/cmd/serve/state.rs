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

use std::sync::Arc;
use std::sync::Mutex;

use cardsmith_core::quiz::QuizState;
use cardsmith_core::rng::TinyRng;
use cardsmith_core::types::flashcard::Flashcard;
use tokio::sync::oneshot::Sender;

use crate::config::Settings;

#[derive(Clone)]
pub struct ServerState {
    /// The Gemini key, read from the environment at startup.
    pub api_key: Option<String>,
    pub mutable: Arc<Mutex<Session>>,
    pub shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn class(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A message shown once, on the next page render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Everything one user accumulates while using the app.
pub struct Session {
    /// Generation settings, updated from the last submitted form.
    pub settings: Settings,
    cards: Vec<Flashcard>,
    /// Created lazily the first time the quiz is shown.
    quiz: Option<QuizState>,
    notice: Option<Notice>,
    rng: TinyRng,
}

impl Session {
    pub fn new(settings: Settings, seed: u64) -> Self {
        Self {
            settings,
            cards: Vec::new(),
            quiz: None,
            notice: None,
            rng: TinyRng::from_seed(seed),
        }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// Install a freshly generated deck. Any quiz over the old deck is
    /// dropped.
    pub fn replace_cards(&mut self, cards: Vec<Flashcard>) {
        self.cards = cards;
        self.quiz = None;
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.quiz = None;
        self.notice = None;
    }

    #[cfg(test)]
    pub fn quiz(&self) -> Option<&QuizState> {
        self.quiz.as_ref()
    }

    /// The deck, the quiz (created if needed), and the RNG, borrowed
    /// together so options can be built against the deck.
    pub fn quiz_parts(&mut self) -> (&[Flashcard], &mut QuizState, &mut TinyRng) {
        let option_count = self.settings.option_count;
        let quiz = self
            .quiz
            .get_or_insert_with(|| QuizState::new(option_count));
        (&self.cards, quiz, &mut self.rng)
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Vec<Flashcard> {
        vec![
            Flashcard::new("What is Paris?", "the capital of France").unwrap(),
            Flashcard::new("What is Berlin?", "the capital of Germany").unwrap(),
        ]
    }

    #[test]
    fn test_quiz_is_lazy() {
        let mut session = Session::new(Settings::default(), 1);
        session.replace_cards(deck());
        assert!(session.quiz().is_none());
        let (cards, quiz, rng) = session.quiz_parts();
        assert_eq!(cards.len(), 2);
        assert_eq!(quiz.options(cards, rng).unwrap().len(), 4);
        assert!(session.quiz().is_some());
    }

    #[test]
    fn test_replace_cards_drops_quiz() {
        let mut session = Session::new(Settings::default(), 1);
        session.replace_cards(deck());
        let (cards, quiz, _) = session.quiz_parts();
        quiz.next(cards.len());
        session.replace_cards(deck());
        assert!(session.quiz().is_none());
        let (_, quiz, _) = session.quiz_parts();
        assert_eq!(quiz.index(), 0);
    }

    #[test]
    fn test_clear() {
        let mut session = Session::new(Settings::default(), 1);
        session.replace_cards(deck());
        session.quiz_parts();
        session.notify(NoticeLevel::Info, "hello");
        session.clear();
        assert!(session.cards().is_empty());
        assert!(session.quiz().is_none());
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn test_notice_is_one_shot() {
        let mut session = Session::new(Settings::default(), 1);
        session.notify(NoticeLevel::Warning, "careful");
        assert_eq!(
            session.take_notice(),
            Some(Notice {
                level: NoticeLevel::Warning,
                message: "careful".to_string(),
            })
        );
        assert!(session.take_notice().is_none());
    }
}
