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

//! Flashcard generation through the Gemini `generateContent` API.

use cardsmith_core::deck::cards_from_values;
use cardsmith_core::types::flashcard::Flashcard;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Study material beyond this many characters is not sent.
const MAX_MATERIAL_CHARS: usize = 120_000;

/// How much of a bad response is quoted back in the error.
const RAW_EXCERPT_CHARS: usize = 500;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Build a client from an API key, which is usually read from
    /// `GEMINI_API_KEY`. A missing or blank key is a configuration error.
    pub fn from_api_key(api_key: Option<String>, base_url: &str) -> Fallible<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ErrorReport::config(format!(
                    "{API_KEY_VAR} is not set. Export it in the environment, or use offline mode."
                ))
            })?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the model for up to `k` cards about `text`.
    pub async fn generate_flashcards(
        &self,
        text: &str,
        model: &str,
        k: usize,
    ) -> Fallible<Vec<Flashcard>> {
        let model = match model.trim() {
            "" => DEFAULT_MODEL,
            model => model,
        };
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(text, k),
                }],
            }],
        };
        log::info!("Requesting {k} cards from {model}");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorReport::new(format!("request to Gemini failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorReport::new(format!(
                "Gemini returned HTTP {status}: {}",
                excerpt(&body)
            )));
        }
        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ErrorReport::data(format!("unexpected Gemini response shape: {e}")))?;
        let raw = reply.text();
        log::debug!("Gemini replied with {} characters", raw.len());
        parse_flashcard_array(&raw, k)
    }
}

pub fn build_prompt(text: &str, k: usize) -> String {
    let material: String = text.chars().take(MAX_MATERIAL_CHARS).collect();
    format!(
        "You are a helpful assistant that creates study flashcards.\n\
         Given the study material below, return EXACTLY a JSON array of {k} objects, each with keys \"question\" and \"answer\".\n\
         - Questions should be clear and concise (<= 120 chars).\n\
         - Answers should be short, factual (<= 250 chars), no markdown.\n\
         - Do NOT include explanations or any text outside the JSON array.\n\
         \n\
         STUDY MATERIAL:\n\
         {material}"
    )
}

/// Pull the JSON array out of a model reply and turn it into cards. Items
/// with a blank side are dropped and at most `k` cards are kept.
pub fn parse_flashcard_array(raw: &str, k: usize) -> Fallible<Vec<Flashcard>> {
    let span = match (raw.find('['), raw.rfind(']')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => {
            return Err(ErrorReport::data(format!(
                "Gemini response did not contain a valid JSON array. Raw response:\n{}",
                excerpt(raw)
            )));
        }
    };
    let values: Vec<Value> = serde_json::from_str(span).map_err(|e| {
        ErrorReport::data(format!(
            "Gemini response did not contain a valid JSON array ({e}). Raw response:\n{}",
            excerpt(raw)
        ))
    })?;
    let mut cards = cards_from_values(values);
    cards.truncate(k);
    Ok(cards)
}

fn excerpt(raw: &str) -> String {
    raw.chars().take(RAW_EXCERPT_CHARS).collect()
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// The text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
