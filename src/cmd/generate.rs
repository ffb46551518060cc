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

use std::fs::read;
use std::fs::write;
use std::path::Path;

use cardsmith_core::deck::cards_to_json;
use cardsmith_core::generator::generate_flashcards_offline;
use cardsmith_core::types::flashcard::Flashcard;

use crate::config::GenerationMode;
use crate::config::Settings;
use crate::error::Fallible;
use crate::error::fail;
use crate::extract::Upload;
use crate::extract::gather_study_text;
use crate::llm::GeminiClient;

pub const NO_CARDS_MESSAGE: &str =
    "No cards generated. Try a different mode, more text, or another model.";

/// Turn study material into cards with the configured generator.
pub async fn generate_cards(
    text: &str,
    settings: &Settings,
    api_key: Option<String>,
) -> Fallible<Vec<Flashcard>> {
    match settings.mode {
        GenerationMode::Offline => Ok(generate_flashcards_offline(text, settings.card_count)),
        GenerationMode::Gemini => {
            let client = GeminiClient::from_api_key(api_key, &settings.gemini_base_url)?;
            client
                .generate_flashcards(text, &settings.model, settings.card_count)
                .await
        }
    }
}

pub struct GenerateConfig {
    pub files: Vec<String>,
    pub text: Option<String>,
    pub output: Option<String>,
    pub settings: Settings,
    pub api_key: Option<String>,
}

/// Generate a deck from the command line and write it as JSON.
pub async fn generate_deck(config: GenerateConfig) -> Fallible<()> {
    let mut uploads = Vec::new();
    for file in config.files.iter() {
        let path = Path::new(file);
        if !path.exists() {
            return fail(format!("file {file} does not exist."));
        }
        uploads.push(Upload {
            name: file.clone(),
            bytes: read(path)?,
        });
    }
    let pasted = config.text.unwrap_or_default();
    let content = gather_study_text(&uploads, &pasted)?;
    if content.is_empty() {
        return fail("no input: pass one or more files, or --text.");
    }
    let cards = generate_cards(&content, &config.settings, config.api_key).await?;
    if cards.is_empty() {
        return fail(NO_CARDS_MESSAGE);
    }
    let json = cards_to_json(&cards)?;
    match config.output {
        Some(output) => {
            write(&output, json)?;
            log::info!("Wrote {} cards to {output}", cards.len());
        }
        None => {
            println!("{json}");
        }
    }
    Ok(())
}
