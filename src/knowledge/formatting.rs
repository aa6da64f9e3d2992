use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::knowledge::store::KnowledgeBase;
use crate::knowledge::types::{ChatTurn, ProcessResult, Role, ScoredChunk};

pub fn format_process_result(result: &ProcessResult) -> String {
    let mut output = String::new();

    output.push_str(&"✓ Website processed".green().bold().to_string());
    output.push('\n');
    output.push_str(&result.title.blue().bold().to_string());
    output.push('\n');
    output.push_str(&result.url.bright_black().to_string());
    output.push('\n');
    output.push_str(&format!(
        "{} chunks in {:.1}s",
        result.chunk_count,
        result.elapsed.as_secs_f64()
    ));
    output.push('\n');

    output
}

pub fn format_answer(answer: &str) -> String {
    format!("{} {}", "Bot:".green().bold(), answer)
}

pub fn format_error(message: &str) -> String {
    format!("{} {}", "Error:".red().bold(), message)
}

pub fn format_history(history: &[ChatTurn]) -> String {
    if history.is_empty() {
        return "No conversation yet".to_string();
    }

    let mut output = String::new();

    for turn in history {
        let label = match turn.role {
            Role::User => "You:".cyan().bold(),
            Role::Bot => "Bot:".green().bold(),
        };
        output.push_str(&format!(
            "{} {} {}\n",
            label,
            turn.content,
            format!("({})", format_relative_time(turn.created_at)).bright_black()
        ));
    }

    output
}

pub fn format_sources(sources: &[ScoredChunk]) -> String {
    if sources.is_empty() {
        return "No sources for the last answer".to_string();
    }

    let mut output = String::new();

    for (rank, source) in sources.iter().enumerate() {
        output.push_str(&"━".repeat(60));
        output.push('\n');

        output.push_str(
            &format!("#{} chunk {}", rank + 1, source.index)
                .blue()
                .bold()
                .to_string(),
        );
        output.push('\n');

        output.push_str(&preview(&source.text, 200));
        output.push('\n');

        let score_pct = (source.score.max(0.0) * 100.0) as u32;
        output.push_str(&format!("{}% relevant", score_pct).green().to_string());
        output.push_str("\n\n");
    }

    output
}

/// Numbered chunk previews, at most `limit` of them
pub fn format_chunk_previews(chunks: &[String], limit: usize) -> String {
    if chunks.is_empty() {
        return "No text found on this page".to_string();
    }

    let mut output = String::new();

    for (index, chunk) in chunks.iter().take(limit).enumerate() {
        output.push_str(
            &format!("[{}] {} chars", index, chunk.chars().count())
                .cyan()
                .to_string(),
        );
        output.push('\n');
        output.push_str(&preview(chunk, 160));
        output.push_str("\n\n");
    }

    if chunks.len() > limit {
        output.push_str(
            &format!("... {} more chunks", chunks.len() - limit)
                .bright_black()
                .to_string(),
        );
        output.push('\n');
    }

    output
}

pub fn format_stats(kb: &KnowledgeBase, last: Option<&ProcessResult>, top_k: usize) -> String {
    let mut output = String::new();

    output.push_str(&"Knowledge Base Statistics".bold().to_string());
    output.push('\n');
    output.push_str(&format!("URL: {}", kb.url()));
    output.push('\n');
    output.push_str(&format!("Title: {}", kb.title()));
    output.push('\n');
    output.push_str(&format!("Chunks: {}", kb.len()));
    output.push('\n');
    output.push_str(&format!("Embedding Dimension: {}", kb.dimension()));
    output.push('\n');
    output.push_str(&format!("Content Hash: {}", truncate_chars(kb.content_hash(), 12)));
    output.push('\n');
    output.push_str(&format!("Top K: {}", top_k));
    output.push('\n');

    if let Some(result) = last {
        output.push_str(&format!(
            "Processing Time: {:.1}s",
            result.elapsed.as_secs_f64()
        ));
        output.push('\n');
    }

    output.push_str(&format!("Built: {}", format_relative_time(kb.built_at())));
    output.push('\n');

    output
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", truncate_chars(text, max_chars))
    } else {
        text.to_string()
    }
}

fn format_relative_time(dt: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{} days ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{} minutes ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}
