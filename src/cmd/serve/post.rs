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

use axum::Form;
use axum::extract::Multipart;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use clap::ValueEnum;
use maud::html;
use serde::Deserialize;

use crate::cmd::generate::NO_CARDS_MESSAGE;
use crate::cmd::generate::generate_cards;
use crate::cmd::serve::state::NoticeLevel;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::state::Session;
use crate::cmd::serve::template::page_template;
use crate::config::GenerationMode;
use crate::config::clamp_card_count;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::extract::Upload;
use crate::extract::gather_study_text;

pub const MISSING_INPUT_MESSAGE: &str = "Please upload a file or paste some text first.";

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Check,
    Next,
    Restart,
    Clear,
    Shutdown,
}

#[derive(Deserialize)]
pub struct ActionForm {
    action: Action,
    #[serde(default)]
    choice: Option<String>,
    /// The question the page was showing when the form was sent.
    #[serde(default)]
    index: Option<usize>,
}

pub async fn post_handler(State(state): State<ServerState>, Form(form): Form<ActionForm>) -> Response {
    match form.action {
        Action::Shutdown => shutdown(&state),
        action => {
            let mut session = state.mutable.lock().unwrap();
            apply_action(&mut session, action, form.choice.as_deref(), form.index);
            Redirect::to("/").into_response()
        }
    }
}

fn apply_action(session: &mut Session, action: Action, choice: Option<&str>, index: Option<usize>) {
    if matches!(action, Action::Check | Action::Next) && is_stale(session, index) {
        log::debug!("Ignoring {action:?} sent from question {index:?}");
        return;
    }
    match action {
        Action::Check => check(session, choice),
        Action::Next => {
            let (cards, quiz, _) = session.quiz_parts();
            if !cards.is_empty() {
                quiz.next(cards.len());
            }
        }
        Action::Restart => {
            let (_, quiz, _) = session.quiz_parts();
            quiz.restart();
        }
        Action::Clear => {
            session.clear();
            session.notify(NoticeLevel::Info, "Cleared.");
        }
        Action::Shutdown => {}
    }
}

/// Whether a quiz action was sent from a page that no longer shows the
/// current question, e.g. a double-clicked Next.
fn is_stale(session: &mut Session, index: Option<usize>) -> bool {
    let Some(index) = index else {
        return false;
    };
    let (_, quiz, _) = session.quiz_parts();
    quiz.is_finished() || quiz.index() != index
}

fn check(session: &mut Session, choice: Option<&str>) {
    let choice = match choice.map(str::trim) {
        Some(choice) if !choice.is_empty() => choice.to_string(),
        _ => {
            session.notify(NoticeLevel::Warning, "Please choose an option.");
            return;
        }
    };
    let (cards, quiz, _) = session.quiz_parts();
    if cards.is_empty() {
        return;
    }
    if let Err(e) = quiz.check(cards, &choice) {
        log::warn!("Check rejected: {e}");
        session.notify(NoticeLevel::Error, e.message());
    }
}

fn shutdown(state: &ServerState) -> Response {
    let sender = state.shutdown_tx.lock().unwrap().take();
    if let Some(sender) = sender {
        let _ = sender.send(());
    }
    let body = html! {
        div.root {
            div.notice.info { "Shutting down. You can close this tab." }
        }
    };
    (StatusCode::OK, Html(page_template(body).into_string())).into_response()
}

/// The fields of the generate form.
#[derive(Default)]
struct GenerateForm {
    uploads: Vec<Upload>,
    text: String,
    mode: Option<GenerationMode>,
    count: Option<usize>,
}

async fn read_generate_form(multipart: &mut Multipart) -> Fallible<GenerateForm> {
    let mut form = GenerateForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ErrorReport::new(format!("failed to read upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ErrorReport::new(format!("failed to read {file_name}: {e}")))?;
                // Browsers send an empty part when no file was picked.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.uploads.push(Upload {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "text" | "mode" | "count" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ErrorReport::new(format!("failed to read field {name}: {e}")))?;
                match name.as_str() {
                    "text" => form.text = value,
                    "mode" => {
                        form.mode = Some(
                            GenerationMode::from_str(value.trim(), true)
                                .map_err(|_| ErrorReport::new(format!("unknown mode: {value}")))?,
                        )
                    }
                    _ => {
                        form.count = Some(
                            value
                                .trim()
                                .parse()
                                .map_err(|_| ErrorReport::new(format!("invalid count: {value}")))?,
                        )
                    }
                }
            }
            _ => {
                log::debug!("Ignoring form field {name}");
            }
        }
    }
    Ok(form)
}

pub async fn generate_handler(State(state): State<ServerState>, mut multipart: Multipart) -> Redirect {
    let form = match read_generate_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Bad generate request: {e}");
            let mut session = state.mutable.lock().unwrap();
            session.notify(NoticeLevel::Error, e.message());
            return Redirect::to("/");
        }
    };

    let settings = {
        let mut session = state.mutable.lock().unwrap();
        if let Some(mode) = form.mode {
            session.settings.mode = mode;
        }
        if let Some(count) = form.count {
            session.settings.card_count = clamp_card_count(count);
        }
        session.settings.clone()
    };

    let content = match gather_study_text(&form.uploads, &form.text) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Text extraction failed: {e}");
            let mut session = state.mutable.lock().unwrap();
            session.notify(NoticeLevel::Error, e.message());
            return Redirect::to("/");
        }
    };
    if content.is_empty() {
        let mut session = state.mutable.lock().unwrap();
        session.notify(NoticeLevel::Warning, MISSING_INPUT_MESSAGE);
        return Redirect::to("/");
    }

    log::info!(
        "Generating up to {} cards ({} mode) from {} characters",
        settings.card_count,
        settings.mode,
        content.chars().count()
    );
    // The session lock is not held across the model call.
    let result = generate_cards(&content, &settings, state.api_key.clone()).await;

    let mut session = state.mutable.lock().unwrap();
    match result {
        Ok(cards) if cards.is_empty() => {
            session.notify(NoticeLevel::Warning, NO_CARDS_MESSAGE);
        }
        Ok(cards) => {
            let message = format!("Generated {} flashcards.", cards.len());
            session.replace_cards(cards);
            session.notify(NoticeLevel::Success, message);
        }
        Err(e) => {
            log::error!("Generation failed: {e}");
            session.notify(NoticeLevel::Error, e.message());
        }
    }
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use cardsmith_core::types::flashcard::Flashcard;

    use super::*;
    use crate::cmd::serve::state::Notice;
    use crate::config::Settings;

    fn session() -> Session {
        let mut session = Session::new(Settings::default(), 7);
        session.replace_cards(vec![
            Flashcard::new("What is Paris?", "the capital of France").unwrap(),
            Flashcard::new("What is Berlin?", "the capital of Germany").unwrap(),
        ]);
        session
    }

    #[test]
    fn test_check_without_choice_warns() {
        let mut session = session();
        apply_action(&mut session, Action::Check, Some("  "), None);
        assert_eq!(
            session.take_notice(),
            Some(Notice {
                level: NoticeLevel::Warning,
                message: "Please choose an option.".to_string(),
            })
        );
        apply_action(&mut session, Action::Check, None, None);
        assert!(session.take_notice().is_some());
    }

    #[test]
    fn test_check_scores_once() {
        let mut session = session();
        apply_action(&mut session, Action::Check, Some("the capital of France"), None);
        apply_action(&mut session, Action::Check, Some("the capital of France"), None);
        let quiz = session.quiz().unwrap();
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.index(), 0);
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn test_next_restart_and_finish() {
        let mut session = session();
        apply_action(&mut session, Action::Next, None, None);
        apply_action(&mut session, Action::Next, None, None);
        assert!(session.quiz().unwrap().is_finished());
        apply_action(&mut session, Action::Check, Some("the capital of France"), None);
        assert_eq!(
            session.take_notice().map(|n| n.level),
            Some(NoticeLevel::Error)
        );
        apply_action(&mut session, Action::Restart, None, None);
        let quiz = session.quiz().unwrap();
        assert!(!quiz.is_finished());
        assert_eq!(quiz.index(), 0);
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn test_clear() {
        let mut session = session();
        apply_action(&mut session, Action::Clear, None, None);
        assert!(session.cards().is_empty());
        assert_eq!(
            session.take_notice().map(|n| n.message),
            Some("Cleared.".to_string())
        );
        // Quiz actions on an empty deck are no-ops.
        apply_action(&mut session, Action::Next, None, None);
        apply_action(&mut session, Action::Check, Some("anything"), None);
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn test_stale_quiz_actions_are_ignored() {
        let mut session = session();
        // Next clicked twice on the page for question 0.
        apply_action(&mut session, Action::Next, None, Some(0));
        apply_action(&mut session, Action::Next, None, Some(0));
        assert_eq!(session.quiz().unwrap().index(), 1);
        // A check from the old page does not grade question 1.
        apply_action(
            &mut session,
            Action::Check,
            Some("the capital of France"),
            Some(0),
        );
        let quiz = session.quiz().unwrap();
        assert!(quiz.review(1).is_none());
        assert!(quiz.review(0).is_none());
        assert_eq!(quiz.score(), 0);
        // The current page still works.
        apply_action(
            &mut session,
            Action::Check,
            Some("the capital of Germany"),
            Some(1),
        );
        assert_eq!(session.quiz().unwrap().score(), 1);
        apply_action(&mut session, Action::Next, None, Some(1));
        assert!(session.quiz().unwrap().is_finished());
        // Nothing from a question page applies once the quiz is over.
        apply_action(&mut session, Action::Next, None, Some(1));
        apply_action(&mut session, Action::Check, Some("x"), Some(2));
        assert!(session.take_notice().is_none());
    }
}
