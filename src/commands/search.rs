use anyhow::Result;
use colored::*;
use regex::{Regex, RegexBuilder};

use smart_notes::{Notebook, SearchRequest};

use super::display::{display_title, format_tags, short_id};

const CONTEXT_CHARS: usize = 30;

pub fn run(
    notes: &Notebook,
    query: &str,
    tag: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let request = SearchRequest {
        query: query.to_string(),
        tag,
        limit,
    };
    let found = notes.search(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    if found.results.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!(
        "{} {} results for: {}",
        "→".dimmed(),
        found.total,
        query.cyan()
    );
    println!();

    let re = RegexBuilder::new(&regex::escape(query.trim()))
        .case_insensitive(true)
        .build()?;

    for (i, hit) in found.results.iter().enumerate() {
        let score = match hit.score {
            Some(s) => {
                let score_str = format!("{:.2}", s);
                if s > 0.8 {
                    score_str.green()
                } else if s > 0.6 {
                    score_str.yellow()
                } else {
                    score_str.dimmed()
                }
            }
            None => "----".dimmed(),
        };

        println!(
            "{}. [{}] {} {}",
            (i + 1).to_string().bold(),
            score,
            display_title(&hit.note).cyan(),
            short_id(&hit.note.id).dimmed()
        );

        if let Some(snippet) = match_context(&re, &hit.note.content) {
            println!("   ...{}...", snippet.replace('\n', " ").dimmed());
        }
        if !hit.note.tags.is_empty() {
            println!("   {}", format_tags(&hit.note.tags).yellow());
        }
        println!();
    }

    Ok(())
}

/// Text around the first match of `re`, if any
fn match_context(re: &Regex, content: &str) -> Option<String> {
    let mat = re.find(content)?;

    let start = content[..mat.start()]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = content[mat.end()..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| mat.end() + i)
        .unwrap_or(content.len());

    Some(content[start..end].to_string())
}
