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

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use tokio::spawn;

use crate::cmd::generate::GenerateConfig;
use crate::cmd::generate::generate_deck;
use crate::cmd::serve::server::ServerConfig;
use crate::cmd::serve::server::start_server;
use crate::config::GenerationMode;
use crate::config::Settings;
use crate::error::Fallible;
use crate::llm::API_KEY_VAR;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Generate flashcards and quiz yourself through a web interface.
    Serve {
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// Generate flashcards from files or text and print them as JSON.
    Generate {
        /// Paths to PDF, DOCX, or plain text files.
        files: Vec<String>,
        /// Study text to use in addition to the files.
        #[arg(long)]
        text: Option<String>,
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
        #[command(flatten)]
        generation: GenerationArgs,
    },
}

/// Flags that override the config file.
#[derive(clap::Args)]
struct GenerationArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// How to generate cards.
    #[arg(long)]
    mode: Option<GenerationMode>,
    /// How many cards to ask for.
    #[arg(long)]
    count: Option<usize>,
    /// The Gemini model to use.
    #[arg(long)]
    model: Option<String>,
}

impl GenerationArgs {
    fn settings(self) -> Fallible<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(count) = self.count {
            settings.card_count = count;
        }
        if let Some(model) = self.model {
            settings.model = model;
        }
        settings.validate()?;
        Ok(settings)
    }
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let api_key = std::env::var(API_KEY_VAR).ok();
    match cli {
        Command::Serve {
            host,
            port,
            open_browser,
            generation,
        } => {
            let settings = generation.settings()?;
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                host,
                port,
                settings,
                api_key,
            };
            start_server(config).await
        }
        Command::Generate {
            files,
            text,
            output,
            generation,
        } => {
            let config = GenerateConfig {
                files,
                text,
                output,
                settings: generation.settings()?,
                api_key,
            };
            generate_deck(config).await
        }
    }
}
