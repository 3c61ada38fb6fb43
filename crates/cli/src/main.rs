use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Parser;
use fieldprobe_core::{
    Document, ExtractConfig, Extraction, FetchConfig, FragmentExtractor, JsonConfig, MarkupSource, SearchMode,
    TextConfig, acquire, convert_to_json, convert_to_text,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{Progress, format_size};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that overrides the log filter.
const LOG_ENV: &str = "FIELDPROBE_LOG";

/// Output format for extracted fragments
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

/// Find the smallest HTML block that holds a label and its value
#[derive(Parser, Debug)]
#[command(name = "fieldprobe")]
#[command(version = "0.1.0")]
#[command(about = "Find the smallest HTML block that holds a label and its value", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// LABEL VALUE, or just VALUE with --value-only
    #[arg(value_name = "TEXT", required = true, num_args = 1..=2)]
    texts: Vec<String>,

    /// Where to match (text, element, cleaned)
    #[arg(short, long, default_value = "text", value_name = "MODE")]
    mode: SearchMode,

    /// Match the label as a substring
    #[arg(long)]
    partial_label: bool,

    /// Match the value as a substring
    #[arg(long)]
    partial_value: bool,

    /// Compare without case folding
    #[arg(long)]
    case_sensitive: bool,

    /// Stop at the first fragment
    #[arg(long)]
    first: bool,

    /// Extract the containers of VALUE alone
    #[arg(long)]
    value_only: bool,

    /// Include the CSS path of each fragment
    #[arg(long)]
    details: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Extra request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Trace every label/value pair
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Splits the positional texts into (label, value).
    fn queries(&self) -> anyhow::Result<(Option<&str>, &str)> {
        match (self.texts.as_slice(), self.value_only) {
            ([value], true) => Ok((None, value.as_str())),
            ([label, value], false) => Ok((Some(label.as_str()), value.as_str())),
            (_, true) => bail!("--value-only takes a single VALUE"),
            (_, false) => bail!("expected both LABEL and VALUE (use --value-only to search for VALUE alone)"),
        }
    }

    fn extract_config(&self) -> ExtractConfig {
        ExtractConfig::builder()
            .exact_label(!self.partial_label)
            .exact_value(!self.partial_value)
            .case_sensitive(self.case_sensitive)
            .all_matches(!self.first)
            .verbose(self.verbose)
            .search_mode(self.mode)
            .build()
    }

    fn fetch_config(&self) -> anyhow::Result<FetchConfig> {
        let mut config = FetchConfig { timeout: self.timeout, ..Default::default() };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        for header in &self.headers {
            let (name, value) = header
                .split_once(':')
                .with_context(|| format!("Invalid header '{}', expected 'Name: value'", header))?;
            config.headers.push((name.trim().to_string(), value.trim().to_string()));
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "warn,fieldprobe=info,fieldprobe_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn render(args: &Args, extraction: &Extraction, label: Option<&str>, value: &str) -> anyhow::Result<String> {
    match args.format {
        OutputFormat::Text => {
            let config = TextConfig { include_details: args.details };
            Ok(convert_to_text(extraction, &config))
        }
        OutputFormat::Json => {
            let config = JsonConfig { include_details: args.details, pretty: true };
            convert_to_json(extraction, label, value, args.mode, &config).context("Failed to convert to JSON")
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let (label, value) = args.queries()?;
    let fetch_config = args.fetch_config()?;
    let mut progress = Progress::new(args.verbose, 4);

    progress.banner(&[
        ("Search mode", args.mode.to_string()),
        ("Label", label.map_or_else(|| "(value only)".to_string(), |l| format!("{:?}", l))),
        ("Value", format!("{:?}", value)),
    ]);

    let source = MarkupSource::from_input(&args.input, &fetch_config)
        .with_context(|| format!("Cannot read input '{}'", args.input))?;
    progress.step(&format!("Reading from {}", source.describe().bright_white()));

    let started = Instant::now();
    let html = acquire(&source)
        .await
        .with_context(|| format!("Failed to read {}", source.describe()))?;
    progress.record("Acquire", started.elapsed());
    tracing::info!(source = %source.describe(), bytes = html.len(), "acquired markup");
    progress.detail("Size", &format_size(html.len()));

    progress.step("Parsing HTML document");
    let doc = progress.timed("Parse", || Document::parse(&html));
    if let Some(title) = doc.title() {
        progress.detail("Title", &title);
    }

    progress.step("Pairing label and value matches");
    let extractor = FragmentExtractor::with_config(args.extract_config());
    let extraction = progress
        .timed("Extract", || match label {
            Some(label) => extractor.extract_document_detailed(&doc, label, value),
            None => extractor.extract_value_fragments(&doc, value),
        })
        .context("Failed to extract fragments")?;
    tracing::info!(
        fragments = extraction.fragments.len(),
        label_matches = extraction.label_matches,
        value_matches = extraction.value_matches,
        pairs = extraction.pairs_tried,
        "extraction finished"
    );

    progress.extraction(&extraction);
    if args.verbose && extraction.is_empty() {
        progress.warn("No label/value pair shares an ancestor below <body>");
    }

    progress.step("Writing output");
    let output = render(&args, &extraction, label, value)?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", output))
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "wrote output file");
            progress.success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", output),
    }

    progress.finish();

    Ok(())
}
