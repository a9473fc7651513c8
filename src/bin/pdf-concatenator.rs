//! PDF Concatenator CLI tool
//!
//! A command-line shell for ordering and concatenating PDFs.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pdf_concatenator::config::{OutputSpec, APP_NAME, DEFAULT_OUTPUT_NAME};
use pdf_concatenator::order::FileOrderModel;
use pdf_concatenator::pdf::{concatenate, extract_metadata, ConcatOptions};
use pdf_concatenator::session::{finish_save, Command, Reply, Session, HELP};

/// How often the interactive save reports progress
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// PDF Concatenator - Put PDFs in order and join them into one
#[derive(Parser)]
#[command(name = "pdf-concatenator")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Concatenate two files into ~/Documents/Concatenated_Document.pdf
    pdf-concatenator concat intro.pdf chapter1.pdf

    # Concatenate numbered files in order, with a title-derived name
    pdf-concatenator concat --title \"Course Handout\" \"[0-9]*.pdf\"

    # Build the list interactively
    pdf-concatenator interactive -o handout.pdf")]
struct Cli {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate PDF files into one
    Concat {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path (".pdf" is appended when missing)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document title; also names the output when --output is omitted
        #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
        title: String,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Build and reorder the file list interactively
    Interactive {
        /// Output PDF file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document title
        #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
        title: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Concat {
            inputs,
            output,
            title,
            open,
        } => cmd_concat(inputs, output, title, open),
        Commands::Info { input } => cmd_info(&input),
        Commands::Interactive { output, title } => cmd_interactive(output, title),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "pdf_concatenator=debug,info"
    } else {
        "pdf_concatenator=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Build the output settings from the command line
fn output_spec(output: Option<PathBuf>, title: String) -> OutputSpec {
    match output {
        Some(path) => OutputSpec::from_path(&path, title),
        None => OutputSpec {
            title,
            ..OutputSpec::default()
        },
    }
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern are sorted; the order of the arguments is kept.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => tracing::warn!("glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Concatenate PDFs in the order given
fn cmd_concat(inputs: Vec<String>, output: Option<PathBuf>, title: String, open: bool) -> Result<()> {
    let mut files = FileOrderModel::new();
    for path in expand_globs(inputs)? {
        files.add(path);
    }

    let spec = output_spec(output, title);
    let options = ConcatOptions::from_model(&files, &spec);

    eprintln!("Concatenating {} PDF files...", files.len());
    let done = concatenate(&options).context("Failed to save PDF")?;
    eprintln!(
        "PDF saved as {} ({} pages)",
        done.output_path.display(),
        done.page_count
    );

    if open {
        open_file(&done.output_path)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> Result<()> {
    let metadata = extract_metadata(input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    let fields = [
        ("Title", metadata.title),
        ("Author", metadata.author),
        ("Creator", metadata.creator),
        ("Created", metadata.creation_date),
        ("Modified", metadata.mod_date),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }

    Ok(())
}

/// Run the session's save on its worker, printing dots until it finishes
fn save_with_progress(session: &Session) -> Result<Reply> {
    let worker = match session.start_save() {
        Ok(worker) => worker,
        Err(e) => return Ok(Reply::Failed(e)),
    };

    let mut stderr = io::stderr();
    eprint!("Concatenating {} PDF files", session.model().len());
    while !worker.is_finished() {
        eprint!(".");
        stderr.flush()?;
        thread::sleep(PROGRESS_INTERVAL);
    }
    eprintln!();

    Ok(finish_save(worker))
}

/// Line-oriented session: read commands, apply them, redraw
fn cmd_interactive(output: Option<PathBuf>, title: String) -> Result<()> {
    let mut session = Session::new(output_spec(output, title));
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{APP_NAME} - type `help` for commands");
    println!("{}", session.render());

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match line.trim().parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let reply = match command {
            Command::Save => save_with_progress(&session)?,
            command => session.execute(command),
        };
        if let Some(message) = reply.message() {
            println!("{message}");
        }
        match reply {
            Reply::Quit => break,
            Reply::Help => println!("{HELP}"),
            _ => println!("{}", session.render()),
        }
    }

    Ok(())
}
