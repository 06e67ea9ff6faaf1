use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use lektion_core::lesson::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};
use lektion_core::{
    ExtractorConfig, FeedConfig, LessonConfig, LessonService, LessonSource, NoiseConfig, SelectorList, ServiceConfig,
    SourceText,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for `--extract-only`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Turn a news article, a PDF or a random feed article into a German reading lesson
#[derive(Parser, Debug)]
#[command(name = "lektion")]
#[command(version)]
#[command(about = "Turn articles and PDFs into German reading lessons", long_about = None)]
struct Args {
    /// URL, local .pdf or .html file, "-" for HTML on stdin, or "random"
    #[arg(value_name = "INPUT")]
    input: String,

    /// Print the extracted text instead of generating a lesson
    #[arg(long)]
    extract_only: bool,

    /// Output format for --extract-only (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// API key for the chat-completion endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat model used to write the lesson
    #[arg(long, default_value = DEFAULT_LLM_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, default_value = DEFAULT_LLM_BASE_URL, value_name = "URL")]
    base_url: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout for page fetches in seconds
    #[arg(long, default_value = "15", value_name = "SECS")]
    timeout: u64,

    /// Skip the reader-proxy fallback
    #[arg(long)]
    no_reader: bool,

    /// Replace the built-in content selectors with the ones in FILE
    #[arg(long, value_name = "FILE")]
    selectors: Option<PathBuf>,

    /// Replace the built-in class/id noise rules with the ones in FILE
    #[arg(long, value_name = "FILE")]
    noise_rules: Option<PathBuf>,

    /// RSS feed used for "random"
    #[arg(long, value_name = "URL")]
    feed: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// What the INPUT argument refers to.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Source(LessonSource),
    /// Pre-downloaded HTML: a file path or stdin
    Html { label: String },
}

fn is_pdf_path(input: &str) -> bool {
    Path::new(input).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn is_html_path(input: &str) -> bool {
    Path::new(input)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Explicit paths, or a bare "page.html" with no host part.
fn looks_like_path(input: &str) -> bool {
    input.starts_with('/') || input.starts_with("./") || input.starts_with("../") || (is_html_path(input) && !input.contains('/'))
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Classifies INPUT. `pdf_data` is only read for local PDF files.
fn resolve_input(input: &str, pdf_data: impl FnOnce(&Path) -> anyhow::Result<String>) -> anyhow::Result<Input> {
    if input == "random" {
        return Ok(Input::Source(LessonSource::Random));
    }
    if input == "-" {
        return Ok(Input::Html { label: "stdin".to_string() });
    }
    if is_url(input) {
        return Ok(Input::Source(LessonSource::Url { url: input.to_string() }));
    }

    let path = Path::new(input);
    if path.is_file() {
        if is_pdf_path(input) {
            let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            return Ok(Input::Source(LessonSource::Pdf { data: pdf_data(path)?, filename }));
        }
        return Ok(Input::Html { label: input.to_string() });
    }
    if is_pdf_path(input) {
        bail!("PDF file not found: {}", input);
    }
    if looks_like_path(input) {
        bail!("File not found: {}", input);
    }

    // Bare hosts such as "tagesschau.de/inland" are normalized by the extractor.
    Ok(Input::Source(LessonSource::Url { url: input.to_string() }))
}

fn read_pdf_base64(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

fn read_html(label: &str) -> anyhow::Result<String> {
    if label == "stdin" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(label).with_context(|| format!("Failed to read file: {}", label))
    }
}

fn service_config(args: &Args) -> anyhow::Result<ServiceConfig> {
    let mut extractor = ExtractorConfig::builder().timeout(args.timeout).use_reader(!args.no_reader);
    if let Some(path) = &args.selectors {
        extractor = extractor.selectors(SelectorList::parse_file(path)?);
    }
    if let Some(path) = &args.noise_rules {
        extractor = extractor.noise(NoiseConfig::with_rules_file(path)?);
    }

    let mut feed = FeedConfig::default();
    if let Some(url) = &args.feed {
        feed.url = url.clone();
    }

    Ok(ServiceConfig {
        extractor: extractor.build(),
        feed,
        lesson: LessonConfig { base_url: args.base_url.clone(), model: args.model.clone(), ..Default::default() },
        ..Default::default()
    })
}

fn init_logging(verbose: bool) {
    let default = if verbose { "lektion_core=debug" } else { "lektion_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn render_extraction(text: &SourceText, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => format!("{}\n\n{}\n", text.extraction.title, text.extraction.content),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "source_url": text.source_url,
                "title": text.extraction.title,
                "content": text.extraction.content,
            });
            serde_json::to_string_pretty(&value)? + "\n"
        }
    })
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Args::parse()).await {
        echo::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    init_logging(args.verbose);
    let started = Instant::now();
    let mut timings: Vec<(String, Duration)> = Vec::new();
    let total_steps = if args.extract_only { 2 } else { 3 };

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    // Fail before any network work when a lesson is requested without a key.
    let api_key = match (&args.api_key, args.extract_only) {
        (_, true) => String::new(),
        (Some(key), false) if !key.trim().is_empty() => key.trim().to_string(),
        _ => bail!("API key is required (pass --api-key or set GROQ_API_KEY)"),
    };

    let service = LessonService::new(service_config(&args)?)?;
    let input = resolve_input(&args.input, read_pdf_base64)?;

    if args.verbose {
        let what = match &input {
            Input::Source(LessonSource::Random) => "Picking a random feed article".to_string(),
            Input::Source(LessonSource::Url { url }) => format!("Extracting {}", url.bright_white().underline()),
            Input::Source(LessonSource::Pdf { filename, .. }) => format!("Reading PDF {}", filename.bright_white()),
            Input::Html { label } => format!("Parsing HTML from {}", label.bright_white()),
        };
        echo::print_step(1, total_steps, &what);
    }

    let step = Instant::now();
    let text = match input {
        Input::Source(source) => service.gather(&source).await?,
        Input::Html { label } => {
            let html = read_html(&label)?;
            if args.verbose {
                eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
            }
            let extraction = service
                .extractor()
                .parse(&html)
                .map_err(|miss| anyhow!("No readable content in {}: {}", label, miss))?;
            SourceText { source_url: label, extraction }
        }
    };
    timings.push(("Extraction".to_string(), step.elapsed()));

    if args.verbose {
        echo::print_source_details(&text);
    }

    let output = if args.extract_only {
        render_extraction(&text, args.format)?
    } else {
        if args.verbose {
            echo::print_step(2, total_steps, &format!("Generating lesson with {}", args.model.bright_white()));
        }
        let step = Instant::now();
        let lesson = service.compose(&api_key, text).await?;
        timings.push(("Lesson".to_string(), step.elapsed()));
        serde_json::to_string_pretty(&lesson)? + "\n"
    };

    if args.verbose {
        echo::print_step(total_steps, total_steps, "Writing output");
        echo::print_timing_summary(started.elapsed(), &timings);
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", output),
    }

    Ok(())
}
