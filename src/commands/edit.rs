use anyhow::{bail, Result};
use colored::*;

use smart_notes::{NoteUpdate, Notebook};

use super::display::{read_content, short_id};

pub struct EditArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub clear_tags: bool,
}

pub fn run(notes: &Notebook, id: &str, args: EditArgs, json: bool) -> Result<()> {
    let content = match args.content {
        Some(c) => Some(read_content(Some(c))?),
        None => None,
    };

    let tags = if args.clear_tags {
        Some(Vec::new())
    } else if args.tags.is_empty() {
        None
    } else {
        Some(args.tags)
    };

    let changes = NoteUpdate {
        title: args.title,
        content,
        tags,
    };
    if changes.is_empty() {
        bail!("Nothing to change: pass --title, --content, --tag or --clear-tags");
    }

    let note = notes.update(id, changes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!(
            "{} Updated note {}",
            "✓".green().bold(),
            short_id(&note.id).cyan()
        );
    }

    Ok(())
}
