// Copyright 2026 Muvon Un Limited
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

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::Commands;
use crate::config::Config;
use crate::constants::EXIT_COMMANDS;
use crate::error::QaError;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::knowledge::formatting::{
    format_answer, format_chunk_previews, format_error, format_history, format_process_result,
    format_sources, format_stats,
};
use crate::knowledge::{QuerySession, TextChunker};

const REPL_HELP: &str = "\
Type a question to ask about the current website.

Commands:
  /url URL     process another website (clears the conversation)
  /clear       clear the conversation
  /history     show the conversation
  /topk N      use N chunks as context
  /sources     show the chunks behind the last answer
  /stats       show knowledge base statistics
  /help        show this help
  exit, quit   leave";

pub async fn execute(config: &Config, config_path: &Path, command: Commands) -> Result<()> {
    match command {
        Commands::Chat {
            url,
            top_k,
            chunk_size,
        } => {
            let config = config.clone().with_overrides(top_k, chunk_size)?;
            chat(&config, url).await
        }
        Commands::Ask {
            url,
            question,
            top_k,
            chunk_size,
            show_context,
        } => {
            let config = config.clone().with_overrides(top_k, chunk_size)?;
            ask(&config, &url, &question, show_context).await
        }
        Commands::Inspect {
            url,
            limit,
            chunk_size,
        } => {
            let config = config.clone().with_overrides(None, chunk_size)?;
            inspect(&config, &url, limit).await
        }
        Commands::Config => show_config(config, config_path),
    }
}

async fn ask(config: &Config, url: &str, question: &str, show_context: bool) -> Result<()> {
    let mut session = QuerySession::from_config(config)?;

    let result = session.process(url).await?;
    eprintln!("{}", format_process_result(&result));

    let answer = session.ask(question).await?;
    println!("{}", answer);

    if show_context {
        println!();
        println!("{}", format_sources(session.last_sources()));
    }

    Ok(())
}

async fn inspect(config: &Config, url: &str, limit: usize) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let page = fetcher
        .fetch(url.trim())
        .await
        .map_err(|e| QaError::fetch(url.trim(), e))?;

    let chunker = TextChunker::new(config.chunking.max_chunk_size);
    let chunks = chunker.split(&page.text);

    println!("{}", page.title.blue().bold());
    println!("{}", url.trim().bright_black());
    println!(
        "{} characters, {} chunks (max {} chars each)",
        page.text.chars().count(),
        chunks.len(),
        chunker.max_chunk_size()
    );
    println!();
    print!("{}", format_chunk_previews(&chunks, limit));

    Ok(())
}

fn show_config(config: &Config, config_path: &Path) -> Result<()> {
    println!("{} {}", "Config file:".bold(), config_path.display());
    println!();
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

/// Parsed line of REPL input
#[derive(Debug, Clone, PartialEq)]
enum ReplInput {
    Exit,
    Skip,
    Question(String),
    Url(String),
    Clear,
    History,
    TopK(usize),
    Sources,
    Stats,
    Help,
    Invalid(String),
}

fn parse_input(line: &str) -> ReplInput {
    let input = line.trim();
    if input.is_empty() {
        return ReplInput::Skip;
    }
    if EXIT_COMMANDS
        .iter()
        .any(|cmd| input.eq_ignore_ascii_case(cmd))
    {
        return ReplInput::Exit;
    }

    let Some(command) = input.strip_prefix('/') else {
        return ReplInput::Question(input.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name.to_lowercase().as_str() {
        "url" if arg.is_empty() => ReplInput::Invalid("Usage: /url URL".to_string()),
        "url" => ReplInput::Url(arg.to_string()),
        "clear" => ReplInput::Clear,
        "history" => ReplInput::History,
        "topk" => match arg.parse::<usize>() {
            Ok(k) => ReplInput::TopK(k),
            Err(_) => ReplInput::Invalid("Usage: /topk N (N at least 1)".to_string()),
        },
        "sources" => ReplInput::Sources,
        "stats" => ReplInput::Stats,
        "help" => ReplInput::Help,
        other => ReplInput::Invalid(format!("Unknown command /{}. Type /help", other)),
    }
}

fn prompt(label: &str) -> Result<()> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(())
}

async fn process_url(session: &mut QuerySession, url: &str) {
    println!("{}", "Processing website...".bright_black());
    match session.process(url).await {
        Ok(result) => println!("{}", format_process_result(&result)),
        Err(e) => eprintln!("{}", format_error(&e.to_string())),
    }
}

async fn chat(config: &Config, url: Option<String>) -> Result<()> {
    let mut session = QuerySession::from_config(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", "Website FAQ".bold());
    println!("Type /help for commands, exit or quit to leave.");
    println!();

    let url = match url {
        Some(url) => url,
        None => {
            prompt("Website URL: ")?;
            match lines.next_line().await? {
                Some(line) => line,
                None => return Ok(()),
            }
        }
    };
    process_url(&mut session, &url).await;

    loop {
        prompt(&format!("{} ", "You:".cyan().bold()))?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let input = parse_input(&line);
        debug!(?input, "REPL input");

        match input {
            ReplInput::Exit => break,
            ReplInput::Skip => {}
            ReplInput::Question(question) => match session.ask(&question).await {
                Ok(answer) => println!("{}", format_answer(&answer)),
                Err(e) => eprintln!("{}", format_error(&e.to_string())),
            },
            ReplInput::Url(url) => process_url(&mut session, &url).await,
            ReplInput::Clear => {
                session.clear_history();
                println!("Conversation cleared");
            }
            ReplInput::History => print!("{}", format_history(session.history())),
            ReplInput::TopK(k) => match session.set_top_k(k) {
                Ok(()) => println!("Using {} chunks as context", session.top_k()),
                Err(e) => eprintln!("{}", format_error(&e.to_string())),
            },
            ReplInput::Sources => println!("{}", format_sources(session.last_sources())),
            ReplInput::Stats => match session.knowledge_base() {
                Some(kb) => print!(
                    "{}",
                    format_stats(kb, session.last_process(), session.top_k())
                ),
                None => eprintln!("{}", format_error(&QaError::NotReady.to_string())),
            },
            ReplInput::Help => println!("{}", REPL_HELP),
            ReplInput::Invalid(message) => eprintln!("{}", format_error(&message)),
        }
        println!();
    }

    println!("Goodbye!");
    Ok(())
}
