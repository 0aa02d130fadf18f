use std::path::Path;

use anyhow::{Context, Result};
use colored::*;

use smart_notes::Notebook;

pub fn run(notes: &Notebook, output: Option<&Path>) -> Result<()> {
    let export = notes.export()?;
    let body = serde_json::to_string_pretty(&export)?;

    match output {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Exported {} notes to {}",
                "✓".green().bold(),
                export.total.to_string().cyan(),
                path.display()
            );
        }
        None => println!("{}", body),
    }

    Ok(())
}
