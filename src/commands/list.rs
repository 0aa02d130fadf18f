use anyhow::Result;
use colored::*;

use smart_notes::Notebook;

use super::display::print_note_line;

pub fn run(notes: &Notebook, tag: Option<&str>, limit: Option<usize>, json: bool) -> Result<()> {
    let listed = notes.list(tag, limit)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "notes": listed,
                "total": listed.len(),
            }))?
        );
        return Ok(());
    }

    match tag {
        Some(t) => println!("{} #{}", "Notes tagged".bold(), t.yellow()),
        None => println!("{}", "Notes".bold()),
    }
    println!("{}", "=".repeat(60));

    if listed.is_empty() {
        println!("{}", "No notes found.".yellow());
        return Ok(());
    }

    for note in &listed {
        print_note_line(note);
    }
    println!();
    println!("{}", format!("{} notes", listed.len()).dimmed());

    Ok(())
}
