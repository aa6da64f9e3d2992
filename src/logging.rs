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

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize logging: stderr always, plus a daily rotated JSON file when enabled.
/// The returned guard must stay alive for file logs to be flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, anyhow::Error> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // Console output goes to stderr so answers on stdout stay clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !config.file {
        Registry::default()
            .with(console_layer)
            .with(env_filter)
            .init();
        return Ok(None);
    }

    let log_dir = crate::storage::get_log_dir()?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "webfaq.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json();

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    info!(
        log_directory = %log_dir.display(),
        "File logging initialized"
    );

    Ok(Some(guard))
}
