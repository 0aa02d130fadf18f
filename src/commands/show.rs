use anyhow::Result;

use smart_notes::Notebook;

use super::display::print_note;

pub fn run(notes: &Notebook, id: &str, json: bool) -> Result<()> {
    let note = notes.get(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        print_note(&note);
    }

    Ok(())
}
