//! grove CLI - site tooling for grove forests.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use grove::grove_search::build_index_now;
use grove::{GroveConfig, builtin_grammars};
use grove_cli::bib::convert_bibtex;
use grove_cli::tree::create_tree;
use grove_cli::{FileSource, ProcessOptions, Processor};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Site tooling for grove forests.
#[derive(Debug, Parser)]
#[command(name = "grove", version, about, long_about = None)]
struct Cli {
    /// Site configuration (grove.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dedent the code blocks of a built site
    Normalize {
        /// Directory containing the built site
        input: PathBuf,

        /// Output directory (defaults to modifying input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the quick-open index built from a manifest
    Index {
        /// Manifest file (forest.json)
        manifest: PathBuf,

        /// Source path of the current tree, enables the edit command
        #[arg(long)]
        source_path: Option<String>,

        /// Print the index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the bundled highlight.js grammars as JSON
    Grammar {
        /// Only this grammar (id or alias)
        name: Option<String>,
    },

    /// Create the next numbered tree file
    New {
        /// Directory holding the .tree files
        #[arg(default_value = "trees")]
        tree_dir: PathBuf,

        /// Don't open the new file in Visual Studio Code
        #[arg(long)]
        no_open: bool,
    },

    /// Convert BibTeX entries into reference trees
    Bib {
        /// BibTeX (.bib) file to convert
        source: PathBuf,

        /// Directory the reference trees are written to
        #[arg(long, default_value = "trees/references")]
        output_dir: PathBuf,

        /// Replace existing reference trees
        #[arg(long)]
        overwrite: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Command::Normalize { verbose: true, .. });
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Normalize {
            input,
            output,
            verbose,
        } => normalize(&config, input, output, verbose),
        Command::Index {
            manifest,
            source_path,
            json,
        } => index(&config, &manifest, source_path.as_deref(), json),
        Command::Grammar { name } => grammar(name.as_deref()),
        Command::New { tree_dir, no_open } => new_tree(&tree_dir, no_open),
        Command::Bib {
            source,
            output_dir,
            overwrite,
        } => bib(&source, &output_dir, overwrite),
    }
}

fn load_config(path: Option<&Path>) -> Result<GroveConfig> {
    let Some(path) = path else {
        return Ok(GroveConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    GroveConfig::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
}

fn normalize(
    config: &GroveConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    if !input.exists() {
        bail!("Input directory does not exist: {}", input.display());
    }
    if !input.is_dir() {
        bail!("Input path is not a directory: {}", input.display());
    }

    eprintln!(
        "{} Normalizing code blocks: {}",
        "grove".green().bold(),
        input.display()
    );
    if let Some(out) = &output {
        eprintln!("  Output: {}", out.display());
    } else {
        eprintln!("  {} Modifying in place", "Note:".yellow());
    }
    eprintln!();

    let processor = Processor::new(ProcessOptions {
        input_dir: input,
        output_dir: output,
        selector: config.highlight.selector.clone(),
        verbose,
    });

    let start = Instant::now();
    let stats = processor.process()?;
    let elapsed = start.elapsed();

    eprintln!("{}", "Results:".bold());
    eprintln!(
        "  {} HTML files processed ({} changed)",
        stats.files_processed.to_string().cyan(),
        stats.files_changed
    );
    eprintln!(
        "  {} code blocks rewritten",
        stats.blocks_rewritten.to_string().green()
    );
    eprintln!(
        "  {} code blocks already clean",
        (stats.blocks_seen - stats.blocks_rewritten - stats.blocks_skipped)
            .to_string()
            .cyan()
    );
    if stats.blocks_skipped > 0 {
        eprintln!(
            "  {} code blocks skipped (contain markup)",
            stats.blocks_skipped.to_string().yellow()
        );
    }
    if stats.files_failed > 0 {
        eprintln!(
            "\n  {} {} files could not be processed",
            "Warning:".yellow(),
            stats.files_failed
        );
    }

    eprintln!("\n  Completed in {:.2}s", elapsed.as_secs_f64());
    Ok(())
}

fn index(
    config: &GroveConfig,
    manifest: &Path,
    source_path: Option<&str>,
    json: bool,
) -> Result<()> {
    let url = manifest
        .to_str()
        .with_context(|| format!("manifest path is not UTF-8: {}", manifest.display()))?;
    let index = build_index_now(&FileSource, url, source_path, &config.index)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    let mut section = "";
    for item in index.items() {
        if item.section != section {
            section = &item.section;
            println!("{}", section.bold());
        }
        let hotkey = item.hotkey.as_deref().unwrap_or("");
        println!("  {:<10} {} {}", item.id.cyan(), item.title, hotkey.dimmed());
    }
    eprintln!("\n{} items", index.len().to_string().green());
    Ok(())
}

fn grammar(name: Option<&str>) -> Result<()> {
    let grammars = builtin_grammars();

    let Some(name) = name else {
        let all: serde_json::Map<String, serde_json::Value> = grammars
            .iter()
            .map(|g| Ok((g.id.clone(), serde_json::to_value(g)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    };

    let Some(grammar) = grammars
        .iter()
        .find(|g| g.id == name || g.aliases.iter().any(|a| a == name))
    else {
        let known: Vec<&str> = grammars.iter().map(|g| g.id.as_str()).collect();
        bail!("Unknown grammar '{name}' (available: {})", known.join(", "));
    };
    println!("{}", serde_json::to_string_pretty(grammar)?);
    Ok(())
}

fn new_tree(tree_dir: &Path, no_open: bool) -> Result<()> {
    let tree_dir = std::path::absolute(tree_dir)?;
    let today = chrono::Local::now().date_naive();
    let path = create_tree(&tree_dir, today)?;
    println!("Created {}", path.display());

    if no_open {
        return Ok(());
    }

    let Ok(code) = which::which("code") else {
        eprintln!(
            "{} Visual Studio Code CLI ('code') not found on PATH; skipping auto-open",
            "Warning:".yellow()
        );
        return Ok(());
    };
    if let Err(e) = std::process::Command::new(code).arg(&path).status() {
        eprintln!(
            "{} failed to launch Visual Studio Code for {}: {e}",
            "Warning:".yellow(),
            path.display()
        );
    }
    Ok(())
}

fn bib(source: &Path, output_dir: &Path, overwrite: bool) -> Result<()> {
    if !source.is_file() {
        bail!("BibTeX file {} does not exist", source.display());
    }
    let created = convert_bibtex(source, output_dir, overwrite)?;
    for path in &created {
        println!("Created {}", path.display());
    }
    Ok(())
}
