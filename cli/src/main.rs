//! unbook CLI - chapter detection for book PDFs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unbook::render::{chapters_to_json, chapters_to_text};
use unbook::{ChapterConfig, ChapterExtractor, Config, DocumentSource, JsonFormat, LopdfSource};

#[derive(Parser)]
#[command(name = "unbook")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Detect chapters in book PDFs", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect chapters (outline first, heading detection otherwise)
    Chapters {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output chapter records as JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long, requires = "json")]
        compact: bool,

        /// Configuration file (JSON)
        #[arg(long, value_name = "FILE", env = "UNBOOK_CONFIG")]
        config: Option<PathBuf>,

        /// Fail on the first unreadable page
        #[arg(long)]
        strict: bool,

        /// Do not add front and back matter chapters
        #[arg(long)]
        no_fill: bool,
    },

    /// List every heading candidate with its page and score
    Candidates {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Configuration file (JSON)
        #[arg(long, value_name = "FILE", env = "UNBOOK_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the document outline
    Toc {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output outline entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Chapters {
            input,
            output,
            json,
            compact,
            config,
            strict,
            no_fill,
        }) => {
            let format = json.then_some(if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            });
            cmd_chapters(
                &input,
                output.as_deref(),
                format,
                config.as_deref(),
                strict,
                no_fill,
            )
        }
        Some(Commands::Candidates { input, config }) => cmd_candidates(&input, config.as_deref()),
        Some(Commands::Toc { input, json }) => cmd_toc(&input, json),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: detect chapters if input is provided
            if let Some(input) = cli.input {
                cmd_chapters(&input, None, None, None, false, false)
            } else {
                println!("{}", "Usage: unbook <FILE>".yellow());
                println!("       unbook --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_chapter_config(path: Option<&Path>) -> unbook::Result<ChapterConfig> {
    match path {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            Ok(Config::from_json_file(path)?.chapters)
        }
        None => Ok(ChapterConfig::default()),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

fn cmd_chapters(
    input: &Path,
    output: Option<&Path>,
    format: Option<JsonFormat>,
    config: Option<&Path>,
    strict: bool,
    no_fill: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_chapter_config(config)?;
    if strict {
        config = config.strict();
    }
    if no_fill {
        config = config.with_fill_gaps(false);
    }

    let pb = spinner("Detecting chapters...");
    let source = LopdfSource::open(input)?;
    let chapters = ChapterExtractor::new(config).extract_chapters(&source);
    pb.finish_and_clear();
    let chapters = chapters?;

    let rendered = match format {
        Some(format) => chapters_to_json(&chapters, format)?,
        None if chapters.is_empty() => {
            println!("{}", "No chapters detected".yellow());
            return Ok(());
        }
        None => chapters_to_text(&chapters),
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", rendered);
        if format.is_some() {
            println!();
        }
    }

    Ok(())
}

fn cmd_candidates(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_chapter_config(config)?;

    let pb = spinner("Scoring text blocks...");
    let source = LopdfSource::open(input)?;
    let candidates = ChapterExtractor::new(config).candidates(&source);
    pb.finish_and_clear();
    let candidates = candidates?;

    if candidates.is_empty() {
        println!("{}", "No heading candidates".yellow());
        return Ok(());
    }

    println!("{}", "Heading Candidates".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for candidate in &candidates {
        println!(
            "{:>5}  {:>5.2}  {}",
            candidate.page + 1,
            candidate.score,
            candidate.text
        );
    }
    println!("\n{} {} candidates", "Done!".green().bold(), candidates.len());

    Ok(())
}

fn cmd_toc(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = LopdfSource::open(input)?;
    let entries = source.toc()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "Document has no outline".yellow());
        return Ok(());
    }

    for entry in &entries {
        let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
        let page = entry
            .start_page
            .map(|p| (p + 1).to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{}{} {}", indent, entry.title, page.dimmed());
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = LopdfSource::open(input)?;
    let info = source.info();
    let file_name = input.file_name().unwrap_or_default().to_string_lossy();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Title".bold(), info.display_title(&file_name));
    println!("{}: PDF {}", "Format".bold(), info.pdf_version);
    println!("{}: {}", "Pages".bold(), info.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if info.encrypted { "Yes" } else { "No" }
    );
    println!(
        "{}: {}",
        "Outline".bold(),
        if info.has_outline { "Yes" } else { "No" }
    );

    if let Some(ref author) = info.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = info.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref creator) = info.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = info.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = info.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = info.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unbook".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Chapter detection for book PDFs");
    println!();
    println!("License: MIT");
}
