use anyhow::Result;
use colored::*;

use smart_notes::{NewNote, Notebook};

use super::display::{read_content, short_id};

pub fn run(
    notes: &Notebook,
    content: Option<String>,
    title: Option<String>,
    tags: Vec<String>,
    json: bool,
) -> Result<()> {
    let content = read_content(content)?;
    let note = notes.create(NewNote {
        title,
        content,
        tags,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!(
            "{} Created note {} ({})",
            "✓".green().bold(),
            short_id(&note.id).cyan(),
            note.id.dimmed()
        );
    }

    Ok(())
}
