use anyhow::Result;
use colored::*;

use smart_notes::{Notebook, TagCounts};

pub fn run(notes: &Notebook, json: bool) -> Result<()> {
    let counts = notes.tag_counts()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        print_report(&counts);
    }

    Ok(())
}

fn print_report(counts: &TagCounts) {
    println!("{}", "Tag Usage (sorted by count):".cyan().bold());
    println!("{}", "-".repeat(60));

    if counts.tags.is_empty() {
        println!("{}", "No tags yet.".yellow());
    }

    for usage in &counts.tags {
        let count_str = format!("{:>4}", usage.count);
        let count_colored = if usage.count >= 5 {
            count_str.green()
        } else if usage.count >= 2 {
            count_str.yellow()
        } else {
            count_str.normal()
        };
        println!("  {} × {}", count_colored, usage.name);
    }

    println!();
    println!("Notes scanned: {}", counts.scanned);
    if counts.approximate {
        println!(
            "{}",
            "Warning: more notes exist than were scanned; counts are approximate.".yellow()
        );
    }
}
