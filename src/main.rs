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

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod constants;
mod embedding;
mod error;
mod fetch;
mod generation;
mod knowledge;
mod logging;
mod provider;
mod storage;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(cli.config.as_deref())?;

    // Keep the guard alive so file logs are flushed on exit
    let log_guard = logging::init_logging(&config.logging)?;

    // Execute the command
    if let Err(e) = commands::execute(&config, &config_path, cli.command).await {
        eprintln!("Error: {}", e);
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
