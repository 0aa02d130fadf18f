mod commands;
#[cfg(feature = "mcp")]
mod mcp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use smart_notes::{DataPaths, NoteError, Notebook};

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Personal notes with hybrid keyword + semantic search", long_about = None)]
#[command(version)]
struct Cli {
    /// Database file (default: ./.smart-notes/notes.db)
    #[arg(long, global = true, env = "SMART_NOTES_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a note
    Add {
        #[arg(help = "Markdown content, or '-' to read stdin")]
        content: Option<String>,
        #[arg(long, help = "Note title")]
        title: Option<String>,
        #[arg(short, long = "tag", help = "Tag (repeatable)")]
        tags: Vec<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show a single note
    Show {
        id: String,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// List notes, most recently updated first
    #[command(alias = "ls")]
    List {
        #[arg(short, long, help = "Only notes with this tag")]
        tag: Option<String>,
        #[arg(short, long, help = "Limit results (default 100, max 500)")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Change title, content or tags of a note
    Edit {
        id: String,
        #[arg(long, help = "New title (empty string clears it)")]
        title: Option<String>,
        #[arg(long, help = "New content, or '-' to read stdin")]
        content: Option<String>,
        #[arg(short, long = "tag", help = "Replace tags (repeatable)")]
        tags: Vec<String>,
        #[arg(long, conflicts_with = "tags", help = "Remove all tags")]
        clear_tags: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        id: String,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Hybrid keyword + semantic search
    Search {
        query: String,
        #[arg(short, long, help = "Only notes with this tag")]
        tag: Option<String>,
        #[arg(short, long, help = "Limit results (default 1, max 100)")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Tag usage counts
    Tags {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Export all notes as JSON
    Export {
        #[arg(short, long, help = "Write to file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Check database status
    Health {
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== MCP Server =====
    /// Start MCP server over stdio
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Add { json, .. }
            | Commands::Show { json, .. }
            | Commands::List { json, .. }
            | Commands::Edit { json, .. }
            | Commands::Delete { json, .. }
            | Commands::Search { json, .. }
            | Commands::Tags { json }
            | Commands::Health { json } => *json,
            // Export always writes JSON
            Commands::Export { .. } => true,
            #[cfg(feature = "mcp")]
            Commands::Mcp { .. } => false,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let json = cli.command.wants_json();

    if let Err(err) = run(cli) {
        if json {
            println!("{}", commands::display::error_json(&err));
            std::process::exit(1);
        }
        match err.downcast_ref::<NoteError>() {
            Some(note_err) => eprintln!(
                "{} {} [{}]",
                "Error:".red().bold(),
                note_err,
                note_err.code()
            ),
            None => eprintln!("{} {:#}", "Error:".red().bold(), err),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = DataPaths::resolve_db(cli.db.as_deref());

    #[cfg(feature = "mcp")]
    if let Commands::Mcp { install } = cli.command {
        if install {
            print_mcp_install_instructions(&db_path);
            return Ok(());
        }
        return run_mcp_server(db_path);
    }

    let notes = Notebook::open(&db_path)?;

    match cli.command {
        Commands::Add {
            content,
            title,
            tags,
            json,
        } => commands::add::run(&notes, content, title, tags, json),
        Commands::Show { id, json } => commands::show::run(&notes, &id, json),
        Commands::List { tag, limit, json } => {
            commands::list::run(&notes, tag.as_deref(), limit, json)
        }
        Commands::Edit {
            id,
            title,
            content,
            tags,
            clear_tags,
            json,
        } => commands::edit::run(
            &notes,
            &id,
            commands::edit::EditArgs {
                title,
                content,
                tags,
                clear_tags,
            },
            json,
        ),
        Commands::Delete { id, json } => commands::delete::run(&notes, &id, json),
        Commands::Search {
            query,
            tag,
            limit,
            json,
        } => commands::search::run(&notes, &query, tag, limit, json),
        Commands::Tags { json } => commands::tags::run(&notes, json),
        Commands::Export { output } => commands::export::run(&notes, output.as_deref()),
        Commands::Health { json } => commands::health::run(&notes, json),

        #[cfg(feature = "mcp")]
        Commands::Mcp { .. } => Ok(()),
    }
}

#[cfg(feature = "mcp")]
fn run_mcp_server(db_path: PathBuf) -> anyhow::Result<()> {
    let notes = Notebook::open(&db_path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mcp::run_mcp_server(notes))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions(db_path: &std::path::Path) {
    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "notes".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(
        r#"{{
  "mcpServers": {{
    "smart-notes": {{
      "command": "{}",
      "args": ["mcp"],
      "env": {{ "SMART_NOTES_DB": "{}" }}
    }}
  }}
}}"#,
        binary_path,
        db_path.display()
    );
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Hybrid keyword + semantic search", "notes_search".green());
    println!("  • {} - Get a note by id", "notes_get".green());
    println!("  • {} - List notes, optionally by tag", "notes_list".green());
    println!("  • {} - Create a note", "notes_create".green());
    println!("  • {} - Update a note", "notes_update".green());
    println!("  • {} - Delete a note", "notes_delete".green());
    println!("  • {} - Tag usage counts", "notes_tags".green());
    println!("  • {} - Export all notes", "notes_export".green());
    println!("  • {} - Database status", "notes_health".green());
}
