use anyhow::Result;
use colored::*;

use smart_notes::Notebook;

use super::display::format_timestamp;

pub fn run(notes: &Notebook, json: bool) -> Result<()> {
    let health = notes.health();

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    let status = if health.status == "healthy" {
        health.status.green()
    } else {
        health.status.red()
    };

    println!("{}", "Notes Health".bold());
    println!();
    println!("  {} Status: {}", "→".dimmed(), status);
    println!("  {} Database: {}", "→".dimmed(), health.database);
    println!("  {} Version: {}", "→".dimmed(), health.version);
    if let Some(count) = health.notes {
        println!("  {} {} notes stored", "→".dimmed(), count.to_string().cyan());
    }
    if let Some(count) = health.embeddings {
        println!("  {} {} embeddings indexed", "→".dimmed(), count.to_string().cyan());
    }
    if let Some(ts) = health.last_indexed {
        println!("  {} Last indexed: {}", "→".dimmed(), format_timestamp(ts));
    }

    Ok(())
}
