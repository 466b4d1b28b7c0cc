//! docweave CLI - Word document conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use docweave::convert::{convert_upload, extract_upload, write_export, write_markup_package};
use docweave::{ConversionContext, ConvertedOutput, ExportFormat, JsonFormat, TraversalMode};

#[derive(Parser)]
#[command(name = "docweave")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert Word documents to HTML, HTML to Word, and export text", long_about = None)]
struct Cli {
    /// Highest heading level kept when building Word documents (1-6)
    #[arg(long, global = true, default_value = "2")]
    max_heading: u8,

    /// Do not repeat lists and tables nested inside other lists and tables
    #[arg(long, global = true)]
    top_level_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Word document to styled HTML
    #[command(alias = "html")]
    ToHtml {
        /// Input Word file (.docx)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert HTML to a Word document
    #[command(alias = "docx")]
    ToDocx {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (input name with .docx if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Extract plain text from a Word document
    Extract {
        /// Input Word file (.doc or .docx)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Extract text from a Word document and export it
    Export {
        /// Input Word file (.doc or .docx)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "pdf")]
        format: FormatArg,

        /// Output file (input name with the format extension if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Title used by the HTML and Markdown exports
        #[arg(long)]
        title: Option<String>,
    },

    /// Show the structured document built from HTML as JSON
    Inspect {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Paged PDF document
    Pdf,
    /// Standalone HTML page
    Html,
    /// Markdown
    Markdown,
    /// Plain text
    Text,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => ExportFormat::PageDoc,
            FormatArg::Html => ExportFormat::Markup,
            FormatArg::Markdown => ExportFormat::LightMarkup,
            FormatArg::Text => ExportFormat::PlainText,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let mut ctx = ConversionContext::new().with_log_target("docweave::cli");
    ctx.build = ctx.build.with_max_heading_level(cli.max_heading);
    if cli.top_level_only {
        ctx.build = ctx.build.with_traversal(TraversalMode::TopLevel);
    }
    log::debug!(target: ctx.target(), "build options: {:?}", ctx.build);

    let result = match cli.command {
        Commands::ToHtml { input, output } => cmd_to_html(&ctx, &input, output.as_deref()),
        Commands::ToDocx { input, output } => cmd_to_docx(&ctx, &input, output.as_deref()),
        Commands::Extract { input, output } => cmd_extract(&ctx, &input, output.as_deref()),
        Commands::Export {
            input,
            format,
            output,
            title,
        } => {
            if let Some(title) = title {
                ctx.export = ctx.export.with_title(title);
            }
            cmd_export(&ctx, &input, format.into(), output.as_deref())
        }
        Commands::Inspect { input, compact } => cmd_inspect(&ctx, &input, compact),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        // Library errors print their caller-safe message; the full
        // diagnostic is already in the log.
        let message = match e.downcast_ref::<docweave::Error>() {
            Some(err) => err.public_message(),
            None => e.to_string(),
        };
        eprintln!("{}: {}", "Error".red().bold(), message);
        std::process::exit(1);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_output(input: &Path, extension: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(docweave::detect::output_file_name(&stem, extension))
}

fn emit_text(text: &str, output: Option<&Path>) -> CliResult {
    if let Some(path) = output {
        fs::write(path, text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }
    Ok(())
}

fn cmd_to_html(ctx: &ConversionContext, input: &Path, output: Option<&Path>) -> CliResult {
    let bytes = fs::read(input)?;
    let result = convert_upload(ctx, &file_name(input), &bytes)?;
    match &result.output {
        ConvertedOutput::Markup(markup) => emit_text(markup, output),
        ConvertedOutput::Package(_) => Err("unexpected package output".into()),
    }
}

fn cmd_to_docx(ctx: &ConversionContext, input: &Path, output: Option<&Path>) -> CliResult {
    let markup = fs::read_to_string(input)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "docx"));

    let result = write_markup_package(ctx, &markup, &output)?;

    println!("{} {}", "Saved to".green(), output.display());
    if let Some(stats) = result.stats {
        println!(
            "  {} {} headings, {} paragraphs, {} list items, {} tables",
            "├─".dimmed(),
            stats.heading_count,
            stats.paragraph_count,
            stats.list_item_count,
            stats.table_count
        );
        println!("  {} {} words", "└─".dimmed(), stats.word_count);
    }
    Ok(())
}

fn extract(ctx: &ConversionContext, input: &Path) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    Ok(extract_upload(ctx, &file_name(input), &bytes)?.into_text())
}

fn cmd_extract(ctx: &ConversionContext, input: &Path, output: Option<&Path>) -> CliResult {
    match extract(ctx, input)? {
        Some(text) => emit_text(&text, output),
        None => {
            eprintln!("{}", "No text could be extracted from this document.".yellow());
            Ok(())
        }
    }
}

fn cmd_export(
    ctx: &ConversionContext,
    input: &Path,
    format: ExportFormat,
    output: Option<&Path>,
) -> CliResult {
    let text = match extract(ctx, input)? {
        Some(text) => text,
        None => {
            return Err(docweave::Error::Conversion(
                "no text could be extracted from this document".into(),
            )
            .into())
        }
    };
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, format.extension()));

    let result = write_export(ctx, &text, format, &output)?;
    println!(
        "{} {} ({} paragraphs, {} bytes)",
        "Saved to".green(),
        output.display(),
        result.paragraph_count,
        result.len()
    );
    Ok(())
}

fn cmd_inspect(ctx: &ConversionContext, input: &Path, compact: bool) -> CliResult {
    let markup = fs::read_to_string(input)?;
    let doc = docweave::convert::convert_markup_to_document(ctx, &markup)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", docweave::render::to_json(&doc, format)?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docweave".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word document conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docweave".dimmed());
    println!("License: MIT");
}
