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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "webfaq")]
#[command(version, author = "Muvon Un Limited <opensource@muvon.io>")]
#[command(about = "Ask questions about any web page using retrieval-augmented generation", long_about = None)]
pub struct Cli {
    /// Use this config file instead of the one in the data directory
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive question answering about a website
    Chat {
        /// Website to process first (prompted for when omitted)
        #[arg(short, long)]
        url: Option<String>,

        /// Number of chunks used as context for each answer
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Process a website and answer one question
    Ask {
        /// Website to answer from
        #[arg(short, long)]
        url: String,

        /// The question to ask
        question: String,

        /// Number of chunks used as context for the answer
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Print the retrieved chunks after the answer
        #[arg(long)]
        show_context: bool,
    },

    /// Fetch and chunk a website without calling any model
    Inspect {
        /// Website to inspect
        #[arg(short, long)]
        url: String,

        /// Maximum number of chunk previews to print
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Maximum chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Show the configuration file path and effective settings
    Config,
}
