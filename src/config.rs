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

use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::read_to_string;
use std::path::Path;

use cardsmith_core::options::DEFAULT_OPTION_COUNT;
use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::llm::DEFAULT_BASE_URL;
use crate::llm::DEFAULT_MODEL;

/// Bounds of the card count a user can ask for in one generation.
pub const MIN_CARD_COUNT: usize = 5;
pub const MAX_CARD_COUNT: usize = 50;
pub const DEFAULT_CARD_COUNT: usize = 12;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Ask the Gemini API to write the cards.
    Gemini,
    /// Use the built-in sentence heuristic. No API key needed.
    Offline,
}

impl Display for GenerationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Gemini => write!(f, "gemini"),
            GenerationMode::Offline => write!(f, "offline"),
        }
    }
}

/// The optional TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    mode: Option<GenerationMode>,
    model: Option<String>,
    card_count: Option<usize>,
    option_count: Option<usize>,
    gemini_base_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub mode: GenerationMode,
    pub model: String,
    pub card_count: usize,
    /// Choices per quiz question.
    pub option_count: usize,
    pub gemini_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Gemini,
            model: DEFAULT_MODEL.to_string(),
            card_count: DEFAULT_CARD_COUNT,
            option_count: DEFAULT_OPTION_COUNT,
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an optional config file, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ErrorReport::config(format!(
                        "config file {} does not exist.",
                        path.display()
                    )));
                }
                log::debug!("Loading config from {}", path.display());
                Self::from_toml(&read_to_string(path)?)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Fallible<Self> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| ErrorReport::config(format!("failed to parse config file: {e}")))?;
        let defaults = Self::default();
        let settings = Self {
            mode: file.mode.unwrap_or(defaults.mode),
            model: file.model.unwrap_or(defaults.model),
            card_count: file.card_count.unwrap_or(defaults.card_count),
            option_count: file.option_count.unwrap_or(defaults.option_count),
            gemini_base_url: file.gemini_base_url.unwrap_or(defaults.gemini_base_url),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.card_count == 0 {
            return Err(ErrorReport::config("card_count must be at least 1."));
        }
        if self.option_count == 0 {
            return Err(ErrorReport::config("option_count must be at least 1."));
        }
        if self.model.trim().is_empty() {
            return Err(ErrorReport::config("model must not be empty."));
        }
        Ok(())
    }
}

/// Clamp a requested card count to what the web form allows.
pub fn clamp_card_count(count: usize) -> usize {
    count.clamp(MIN_CARD_COUNT, MAX_CARD_COUNT)
}
