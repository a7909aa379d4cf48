use anyhow::Context;
use clap::{ArgAction, Parser};
use notepanes_indexer::{generate_index, write_index};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notepanes-index")]
#[command(version, about = "Write the notes manifest read by the browser")]
struct Cli {
    /// Directory holding the markdown notes
    #[arg(long, default_value = "notes")]
    notes_dir: PathBuf,

    /// Manifest file to write
    #[arg(short, long, default_value = "notes_index.json")]
    output: PathBuf,

    /// Also index notes in sub-directories
    #[arg(short, long)]
    recursive: bool,

    /// Pretty-print the JSON (`--pretty false` for a single line)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let entries = generate_index(&cli.notes_dir, cli.recursive)
        .with_context(|| format!("indexing {}", cli.notes_dir.display()))?;
    write_index(&entries, &cli.output, cli.pretty)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    log::info!(
        "wrote {} with {} notes",
        cli.output.display(),
        entries.len()
    );
    Ok(())
}
