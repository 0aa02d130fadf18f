//! Shared terminal formatting for note commands

use std::io::Read;

use anyhow::{Context, Result};
use colored::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use smart_notes::{Note, NoteError};

pub fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Cut `s` to at most `max_width` terminal columns, adding "..." if cut
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(3) {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push_str("...");
    out
}

/// Pad `s` with spaces to `width` terminal columns
pub fn pad(s: &str, width: usize) -> String {
    let used = s.width();
    format!("{}{}", s, " ".repeat(width.saturating_sub(used)))
}

pub fn display_title(note: &Note) -> String {
    if note.title.is_empty() {
        let first_line = note.content.lines().next().unwrap_or("");
        if first_line.trim().is_empty() {
            "(untitled)".to_string()
        } else {
            first_line.trim().to_string()
        }
    } else {
        note.title.clone()
    }
}

pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-line summary used by list and search output
pub fn print_note_line(note: &Note) {
    println!(
        "{}  {}  {}  {}",
        short_id(&note.id).dimmed(),
        pad(&truncate(&display_title(note), 40), 40).cyan(),
        format_timestamp(note.updated_at).dimmed(),
        format_tags(&note.tags).yellow()
    );
}

pub fn print_note(note: &Note) {
    println!("{}", display_title(note).bold());
    println!("{}", "=".repeat(60));
    println!("ID:      {}", note.id);
    if !note.tags.is_empty() {
        println!("Tags:    {}", format_tags(&note.tags).yellow());
    }
    println!("Created: {}", format_timestamp(note.created_at));
    println!("Updated: {}", format_timestamp(note.updated_at));
    println!("{}", "-".repeat(60));
    println!("{}", note.content);
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Content argument, or stdin when it is `-` or missing
pub fn read_content(arg: Option<String>) -> Result<String> {
    match arg {
        Some(content) if content != "-" => Ok(content),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read note content from stdin")?;
            Ok(buf)
        }
    }
}

/// JSON body for a failed command; `code` is present for note errors
pub fn error_json(err: &anyhow::Error) -> serde_json::Value {
    match err.downcast_ref::<NoteError>() {
        Some(note_err) => serde_json::json!({
            "error": note_err.to_string(),
            "code": note_err.code(),
        }),
        None => serde_json::json!({ "error": format!("{:#}", err) }),
    }
}
