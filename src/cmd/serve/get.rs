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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use cardsmith_core::quiz::QuizStatus;
use cardsmith_core::quiz::QuizSummary;
use cardsmith_core::quiz::Review;
use cardsmith_core::types::flashcard::Flashcard;
use maud::Markup;
use maud::html;

use crate::cmd::serve::state::Notice;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::state::Session;
use crate::cmd::serve::template::page_template;
use crate::config::GenerationMode;
use crate::config::MAX_CARD_COUNT;
use crate::config::MIN_CARD_COUNT;
use crate::config::Settings;
use crate::config::clamp_card_count;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mut session = state.mutable.lock().unwrap();
    let notice = session.take_notice();
    let body = render_page(&mut session, notice);
    (StatusCode::OK, Html(page_template(body).into_string()))
}

fn render_page(session: &mut Session, notice: Option<Notice>) -> Markup {
    let has_cards = !session.cards().is_empty();
    html! {
        div.root {
            div.header {
                h1 { "cardsmith" }
                p.tagline {
                    "Upload study material (PDF/DOCX/TXT) or paste text. Generate Q&A cards, then take a quiz."
                }
            }
            (generate_form(&session.settings))
            @if let Some(notice) = notice {
                div class=(format!("notice {}", notice.level.class())) { (notice.message) }
            }
            @if has_cards {
                (card_preview(session.cards()))
                (quiz_section(session))
            } @else {
                div.notice.info {
                    "No cards yet. Upload or paste content, then click Generate Flashcards."
                }
            }
            div.footer {
                form action="/" method="post" {
                    input #shutdown .shutdown-button type="submit" name="action" value="Shutdown" title="Shut down the server";
                }
            }
        }
    }
}

fn generate_form(settings: &Settings) -> Markup {
    html! {
        div.panel {
            form.generate action="/generate" method="post" enctype="multipart/form-data" {
                fieldset.settings {
                    legend { "Settings" }
                    div.modes {
                        span.label { "Generation mode" }
                        label {
                            input type="radio" name="mode" value="gemini" checked[settings.mode == GenerationMode::Gemini];
                            " Gemini"
                        }
                        label {
                            input type="radio" name="mode" value="offline" checked[settings.mode == GenerationMode::Offline];
                            " Offline (no AI key)"
                        }
                    }
                    label for="count" { "How many flashcards?" }
                    input #count type="number" name="count" min=(MIN_CARD_COUNT) max=(MAX_CARD_COUNT) value=(clamp_card_count(settings.card_count));
                }
                label for="files" { "Upload files (optional)" }
                input #files type="file" name="files" multiple accept=".pdf,.docx,.txt";
                label for="text" { "Or paste your study text here" }
                textarea #text name="text" rows="10" placeholder="Paste your notes, textbook chapter, etc..." {}
                div.buttons {
                    button #generate type="submit" { "Generate Flashcards" }
                }
            }
            form.clear action="/" method="post" {
                button #clear type="submit" name="action" value="Clear" { "Clear All" }
            }
        }
    }
}

fn card_preview(cards: &[Flashcard]) -> Markup {
    html! {
        div.panel.cards {
            h2 { "Generated Flashcards" }
            details {
                summary { "Preview cards (Q/A)" }
                ol.card-list {
                    @for card in cards {
                        li {
                            p { strong { "Q: " } (card.question()) }
                            p { strong { "A: " } (card.answer()) }
                        }
                    }
                }
            }
            a.download href="/flashcards.json" download="flashcards.json" { "Download as JSON" }
        }
    }
}

fn quiz_section(session: &mut Session) -> Markup {
    let (cards, quiz, rng) = session.quiz_parts();
    let total = cards.len();
    let inner = match quiz.sync(total) {
        QuizStatus::Finished => finished_view(quiz.summary(total)),
        QuizStatus::InProgress { index } => {
            let review = quiz.review(index).cloned();
            match quiz.options(cards, rng) {
                Ok(options) => {
                    let options = options.to_vec();
                    question_view(index, &cards[index], total, &options, review.as_ref())
                }
                Err(e) => {
                    log::error!("Failed to build options for question {index}: {e}");
                    html! { div.notice.error { (e) } }
                }
            }
        }
    };
    html! {
        div.panel.quiz {
            h2 { "Quiz Mode" }
            (inner)
        }
    }
}

fn question_view(
    index: usize,
    card: &Flashcard,
    total: usize,
    options: &[String],
    review: Option<&Review>,
) -> Markup {
    let percent = (index * 100) / total.max(1);
    let progress_style = format!("width: {percent}%;");
    html! {
        p.progress-label { "Question " (index + 1) " of " (total) }
        div.progress-bar {
            div.progress-fill style=(progress_style) {}
        }
        p.question { strong { (card.question()) } }
        form.choices action="/" method="post" {
            input type="hidden" name="index" value=(index);
            @for (i, option) in options.iter().enumerate() {
                @let id = format!("choice-{i}");
                @let checked = review.is_some_and(|r| &r.selected == option);
                label.choice for=(id) {
                    input type="radio" id=(id) name="choice" value=(option) checked[checked];
                    " " (option)
                }
            }
            div.buttons {
                button #check type="submit" name="action" value="Check" title="Check the selected answer" { "Check Answer" }
                button #next type="submit" name="action" value="Next" title="Skip to the next question" { "Next Question \u{27A1}\u{FE0F}" }
            }
        }
        @if let Some(review) = review {
            @if review.correct {
                div.feedback.correct { "Correct! \u{2705}" }
            } @else {
                div.feedback.incorrect { "Incorrect \u{274C}. Correct answer: " (card.answer()) }
            }
        }
    }
}

fn finished_view(summary: QuizSummary) -> Markup {
    html! {
        div.finished {
            div.notice.success {
                "Quiz finished! Score: " (summary.score) " / " (summary.total)
            }
            div.stats {
                table {
                    tbody {
                        tr {
                            td.key { "Questions" }
                            td.val { (summary.total) }
                        }
                        tr {
                            td.key { "Answered" }
                            td.val { (summary.answered) }
                        }
                        tr {
                            td.key { "Correct" }
                            td.val { (summary.score) }
                        }
                        tr {
                            td.key { "Score (%)" }
                            td.val { (summary.percent()) }
                        }
                    }
                }
            }
            form action="/" method="post" {
                button #restart type="submit" name="action" value="Restart" { "Restart Quiz" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_field(card_count: usize) -> String {
        let settings = Settings {
            card_count,
            ..Settings::default()
        };
        generate_form(&settings).into_string()
    }

    #[test]
    fn test_count_field_stays_within_form_bounds() {
        assert!(count_field(3).contains(r#"min="5" max="50" value="5""#));
        assert!(count_field(100).contains(r#"min="5" max="50" value="50""#));
        assert!(count_field(12).contains(r#"value="12""#));
    }

    #[test]
    fn test_question_form_carries_its_index() {
        let card = Flashcard::new("What is Berlin?", "the capital of Germany").unwrap();
        let options = vec!["the capital of Germany".to_string()];
        let html = question_view(1, &card, 2, &options, None).into_string();
        assert!(html.contains(r#"<input type="hidden" name="index" value="1">"#));
        assert!(html.contains("Question 2 of 2"));
    }
}
