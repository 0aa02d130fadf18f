use anyhow::Result;
use colored::*;

use smart_notes::Notebook;

pub fn run(notes: &Notebook, id: &str, json: bool) -> Result<()> {
    notes.delete(id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": true, "id": id }));
    } else {
        println!("{} Deleted note {}", "✓".green().bold(), id.cyan());
    }

    Ok(())
}
