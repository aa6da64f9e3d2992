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

/// System instruction sent with every question
pub const SYSTEM_PROMPT: &str = "You are a helpful FAQ bot that answers questions about website content. \
Answer only from the context you are given; if the context does not contain the answer, say so.";

/// Answer used when the processed page produced no text at all
pub const NO_CONTENT_ANSWER: &str = "No relevant content found on this page.";

/// Prefix of the bot turn recorded when answering fails
pub const ERROR_ANSWER_PREFIX: &str = "Error while generating answer:";

/// Separator between retrieved chunks in the prompt context
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Words that end the interactive loop (compared case-insensitively)
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit"];
