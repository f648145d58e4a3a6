//! DOCX Watermark CLI tool
//!
//! A command-line tool for tiling a text watermark across Word documents.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;

use docx_watermark::watermark::{watermark_docx, WatermarkOptions};
use docx_watermark::{logging, Document};

/// DOCX Watermark - Tile a rotated text watermark across Word documents
#[derive(Parser)]
#[command(name = "docx-watermark")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Watermark one document
    docx-watermark apply report.docx -o report-draft.docx --text DRAFT

    # Watermark every document in a folder into out/
    docx-watermark batch \"contracts/*.docx\" --out-dir out --text CONFIDENTIAL

    # Show the header and watermark shapes of a document
    docx-watermark info report-draft.docx")]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a full-page watermark to a document
    Apply {
        /// Input .docx file
        input: PathBuf,

        /// Output .docx file path
        #[arg(short, long)]
        output: PathBuf,

        /// Watermark text
        #[arg(short, long)]
        text: String,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Watermark several documents into an output directory
    Batch {
        /// Input .docx files. Supports glob patterns like "*.docx"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Directory the watermarked copies are written to
        #[arg(short = 'd', long)]
        out_dir: PathBuf,

        /// Watermark text
        #[arg(short, long)]
        text: String,
    },

    /// Show information about a .docx file
    Info {
        /// .docx file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Apply { input, output, text, open } => cmd_apply(input, output, text, open),
        Commands::Batch { inputs, out_dir, text } => cmd_batch(inputs, out_dir, text),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = false;
            for entry in glob(&pattern).with_context(|| format!("invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => {
                        paths.push(path);
                        matched = true;
                    }
                    Err(e) => warn!("glob error for {}: {}", pattern, e),
                }
            }
            if !matched {
                bail!("No files matched pattern: {}", pattern);
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    // Sort paths for consistent ordering
    paths.sort();
    paths.dedup();

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Watermark a single document
fn cmd_apply(input: PathBuf, output: PathBuf, text: String, open: bool) -> Result<()> {
    let options = WatermarkOptions {
        input_path: input,
        output_path: output.clone(),
        text,
    };

    watermark_docx(&options)
        .with_context(|| format!("failed to watermark {}", options.input_path.display()))?;

    eprintln!("Output: {}", output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Watermark many documents, stopping at the first failure
fn cmd_batch(inputs: Vec<String>, out_dir: PathBuf, text: String) -> Result<()> {
    let inputs = expand_globs(inputs)?;

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    eprintln!("Watermarking {} documents...", inputs.len());

    for input in inputs {
        let file_name = input
            .file_name()
            .with_context(|| format!("not a file: {}", input.display()))?;
        let output = out_dir.join(file_name);
        if output == input {
            bail!("Output would overwrite input: {}", input.display());
        }

        let options = WatermarkOptions {
            input_path: input,
            output_path: output,
            text: text.clone(),
        };
        watermark_docx(&options)
            .with_context(|| format!("failed to watermark {}", options.input_path.display()))?;

        eprintln!("  {}", options.output_path.display());
    }

    Ok(())
}

/// Show information about a document
fn cmd_info(input: PathBuf) -> Result<()> {
    let doc = Document::open(&input)
        .with_context(|| format!("failed to open {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Main part: {}", doc.main_part());
    println!("Body paragraphs: {}", doc.body_paragraph_count());

    match doc.default_header() {
        Some(header) => {
            let shapes = header.watermark_shapes();
            println!("Default header: {}", header.part_name());
            println!("Header paragraphs: {}", header.paragraph_count());
            println!("Watermark shapes: {}", shapes.len());
            if let Some(text) = shapes.first().and_then(|s| s.text.as_deref()) {
                println!("Watermark text: {}", text.trim_end());
            }
        }
        None => println!("Default header: none"),
    }

    Ok(())
}
