//! CLI binary for doc2sft.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `GenerationConfig`, runs the generator, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use doc2sft::{
    generate, plan, DocumentReport, GenerationConfig, GenerationProgressCallback,
    OpenAiCompatibleClient, ProcessingMode, ProgressCallback, Route, RunReport,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over documents, plus a log line per
/// chunk and per finished document printed above it.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_run_start` tells us how many documents there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning input directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Generating");
        self.bar.reset_eta();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_documents} document(s)"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(display_name(path));
    }

    fn on_chunk_complete(
        &self,
        _document_index: usize,
        chunk_index: usize,
        total_chunks: usize,
        pairs: usize,
    ) {
        self.bar.println(format!(
            "    {} chunk {:>3}/{:<3}  {}",
            dim("·"),
            chunk_index,
            total_chunks,
            dim(&format!("{pairs} pairs")),
        ));
    }

    fn on_document_complete(&self, index: usize, total: usize, report: &DocumentReport) {
        let name = display_name(&report.source);
        let timing = dim(&format!("{:.1}s", report.duration_ms as f64 / 1000.0));
        let line = if report.is_written() {
            format!(
                "  {} {:>3}/{:<3}  {}  {}  {}",
                green("✓"),
                index,
                total,
                name,
                dim(&format!("{} pairs", report.pairs)),
                timing,
            )
        } else {
            let reason = report
                .failures
                .last()
                .map(|f| truncate(f, 80))
                .unwrap_or_else(|| "no pairs".to_string());
            format!(
                "  {} {:>3}/{:<3}  {}  {}  {}",
                red("✗"),
                index,
                total,
                name,
                red(&reason),
                timing,
            )
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_run_complete(&self, report: &RunReport) {
        self.bar.finish_and_clear();
        let attempted = report.documents.len();
        eprintln!(
            "{} {} QA pairs from {}/{} documents",
            if report.files_written == attempted {
                green("✔")
            } else if report.files_written == 0 {
                red("✘")
            } else {
                cyan("⚠")
            },
            bold(&report.total_pairs.to_string()),
            report.files_written,
            attempted,
        );
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process ./pdf into ./output
  doc2sft

  # Custom directories
  doc2sft --input-dir papers --output-dir dataset

  # See what would be processed, and how (no API key needed)
  doc2sft --list

  # English answers, more pairs per chunk, no pause between calls
  doc2sft --language English --pairs-per-chunk 8 --delay-ms 0

  # Full run report as JSON
  doc2sft --json > report.json

OUTPUT FORMAT:
  One <stem>.txt per document, one JSON object per line:
    {"role":"user","content":"<question>"}
    {"role":"assistant","content":"<answer>"}

ROUTING:
  Files up to --size-threshold-mb (default 20) are extracted locally and sent
  in --chunk-size character chunks. Larger files are uploaded whole, queried
  once, and deleted from the service afterwards.

ENVIRONMENT VARIABLES:
  DEEPSEEK_API_KEY     API key (required unless --list)
  DEEPSEEK_API_BASE    OpenAI-compatible base URL
  DOC2SFT_MODEL        Chat model ID
  DOC2SFT_INPUT_DIR    Input directory
  DOC2SFT_OUTPUT_DIR   Output directory
  RUST_LOG             Override log filter (e.g. doc2sft=debug)
"#;

/// Generate QA fine-tuning data from PDF and Word documents.
#[derive(Parser, Debug)]
#[command(
    name = "doc2sft",
    version,
    about = "Generate question/answer fine-tuning data from PDF and Word documents",
    long_about = "Scan a directory for PDF and Word (.docx) documents, ask an OpenAI-compatible \
chat model to write question/answer pairs about each one, and save them as JSON-lines \
conversation records ready for supervised fine-tuning.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory scanned for *.pdf and *.docx.
    #[arg(short, long, env = "DOC2SFT_INPUT_DIR", default_value = "pdf")]
    input_dir: PathBuf,

    /// Directory receiving one <stem>.txt per document.
    #[arg(short, long, env = "DOC2SFT_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// API key for the completion service.
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "DEEPSEEK_API_BASE", default_value = doc2sft::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Chat model ID.
    #[arg(short, long, env = "DOC2SFT_MODEL", default_value = doc2sft::config::DEFAULT_MODEL)]
    model: String,

    /// Files larger than this many MiB are uploaded instead of chunked.
    #[arg(long, default_value_t = 20,
          value_parser = clap::value_parser!(u64).range(1..))]
    size_threshold_mb: u64,

    /// Maximum chunk length in characters.
    #[arg(long, default_value_t = 40_000)]
    chunk_size: usize,

    /// Characters repeated between consecutive chunks.
    #[arg(long, default_value_t = 200)]
    chunk_overlap: usize,

    /// Pause after every API call, in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    delay_ms: u64,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    /// Max output tokens per completion.
    #[arg(long, default_value_t = 8_192)]
    max_tokens: usize,

    /// QA pairs requested per chunk.
    #[arg(long, default_value_t = 5)]
    pairs_per_chunk: usize,

    /// QA pairs requested per uploaded file.
    #[arg(long, default_value_t = 10)]
    pairs_per_file: usize,

    /// Language questions and answers are written in.
    #[arg(long, default_value = "Chinese")]
    language: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 300)]
    api_timeout: u64,

    /// List documents and their routing, then exit without calling the API.
    #[arg(long)]
    list: bool,

    /// Print the run report (or the --list plan) as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list {
        let planned = plan(&config).await.context("Failed to scan input")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&planned).context("Failed to serialise plan")?
            );
        } else {
            for p in &planned {
                let route = match p.route {
                    Route::Direct => "direct",
                    Route::Upload => "upload",
                };
                println!(
                    "{:<7} {:<5} {:>12}  {}",
                    route,
                    p.document.kind.to_string(),
                    p.size_bytes,
                    p.document.path.display()
                );
            }
            eprintln!(
                "{} document(s) in {}",
                planned.len(),
                config.input_dir.display()
            );
        }
        return Ok(());
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let client = OpenAiCompatibleClient::from_config(&config)?;
    let report = generate(&config, Arc::new(client))
        .await
        .context("Generation failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet && !show_progress {
        print_summary(&report, &config);
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .input_dir(&cli.input_dir)
        .output_dir(&cli.output_dir)
        .api_base(&cli.api_base)
        .model(&cli.model)
        .size_threshold_mb(cli.size_threshold_mb)
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .request_delay_ms(cli.delay_ms)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .direct_pairs_target(cli.pairs_per_chunk)
        .upload_pairs_target(cli.pairs_per_file)
        .answer_language(&cli.language)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &RunReport, config: &GenerationConfig) {
    eprintln!(
        "Generated {} QA pairs from {}/{} documents in {}ms  →  {}",
        report.total_pairs,
        report.files_written,
        report.documents.len(),
        report.duration_ms,
        config.output_dir.display()
    );
    for doc in report.unproductive() {
        let why = match doc.mode {
            ProcessingMode::Skipped => "no text",
            ProcessingMode::Direct { .. } | ProcessingMode::Upload => "no pairs",
        };
        eprintln!("  {} {} ({})", red("✗"), doc.source.display(), why);
        for failure in &doc.failures {
            eprintln!("      {}", dim(failure));
        }
    }
}
