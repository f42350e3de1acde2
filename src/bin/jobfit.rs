//! CLI binary for jobfit.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnalysisConfig` and prints the three tabs.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use jobfit::{
    analyze, resolve_input, AnalysisConfig, AnalysisProgressCallback, AnalysisReport, AnalysisTab,
    ProgressCallback, ScorePolicy, TabResult, Visualization,
};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

/// Spinner plus one log line per finished tab. Tabs finish in any order.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<AnalysisTab, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Rendering resume…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed_secs(&self, tab: AnalysisTab) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&tab))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_analysis_start(&self, tabs: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:20.green/238}] {pos}/{len} tabs  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(tabs as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Analysing");
    }

    fn on_tab_start(&self, tab: AnalysisTab) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(tab, Instant::now());
        }
    }

    fn on_tab_complete(&self, tab: AnalysisTab, response_len: usize) {
        let secs = self.elapsed_secs(tab);
        self.bar.println(format!(
            "  {} {:<15} {}  {}",
            green("✓"),
            tab.title(),
            dim(&format!("{response_len:>5} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_tab_error(&self, tab: AnalysisTab, error: &str) {
        let secs = self.elapsed_secs(tab);
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:<15} {}  {}",
            red("✗"),
            tab.title(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_analysis_complete(&self, tabs: usize, success_count: usize) {
        self.bar.finish_and_clear();
        if success_count < tabs {
            eprintln!(
                "{} {}/{} tabs completed",
                if success_count == 0 { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                tabs
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Job description inline
  jobfit resume.pdf --job "Senior backend engineer with Go experience"

  # Job description from a file, or '-' for stdin
  jobfit resume.pdf --job-file posting.txt
  pbpaste | jobfit resume.pdf --job-file -

  # Resume from a URL, JSON output
  jobfit https://example.com/cv.pdf --job-file posting.txt --json > report.json

  # Another provider
  jobfit --provider openai --model gpt-4.1-mini resume.pdf --job-file posting.txt

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      Google Gemini API key (default provider)
  OPENAI_API_KEY      OpenAI API key
  ANTHROPIC_API_KEY   Anthropic API key
  JOBFIT_PROVIDER     Override provider (gemini, openai, anthropic, ollama)
  JOBFIT_MODEL        Override model ID
  PDFIUM_LIB_PATH     Directory or file of the pdfium shared library

  Variables may also be placed in a .env file in the working directory.
"#;

/// Score a resume against a job description using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "jobfit",
    version,
    about = "Score a resume against a job description using Vision LLMs",
    long_about = "Render the first page of a resume PDF and ask a vision model for an HR \
summary, skill-improvement advice, and an ATS-style match percentage against a job description.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Resume PDF: local path or HTTP/HTTPS URL.
    resume: Option<String>,

    /// Job description text.
    #[arg(short, long, env = "JOBFIT_JOB", conflicts_with = "job_file")]
    job: Option<String>,

    /// Read the job description from a file ('-' for stdin).
    #[arg(long, env = "JOBFIT_JOB_FILE")]
    job_file: Option<PathBuf>,

    /// LLM model ID (default: gemini-1.5-flash).
    #[arg(long, env = "JOBFIT_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "JOBFIT_PROVIDER")]
    provider: Option<String>,

    /// Rendering DPI (72–400).
    #[arg(long, env = "JOBFIT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// What to do with a match score above 100%.
    #[arg(long, env = "JOBFIT_SCORE_POLICY", value_enum, default_value = "clamp")]
    score_policy: ScorePolicyArg,

    /// Max LLM output tokens per tab.
    #[arg(long, env = "JOBFIT_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0). Provider default when unset.
    #[arg(long, env = "JOBFIT_TEMPERATURE")]
    temperature: Option<f32>,

    /// PDF user password for encrypted resumes.
    #[arg(long, env = "JOBFIT_PASSWORD")]
    password: Option<String>,

    /// Output the full report as JSON.
    #[arg(long, env = "JOBFIT_JSON")]
    json: bool,

    /// Disable progress spinner.
    #[arg(long, env = "JOBFIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "JOBFIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the report and errors.
    #[arg(short, long, env = "JOBFIT_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "JOBFIT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-tab LLM call timeout in seconds.
    #[arg(long, env = "JOBFIT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ScorePolicyArg {
    Clamp,
    Reject,
    PassThrough,
}

impl From<ScorePolicyArg> for ScorePolicy {
    fn from(v: ScorePolicyArg) -> Self {
        match v {
            ScorePolicyArg::Clamp => ScorePolicy::Clamp,
            ScorePolicyArg::Reject => ScorePolicy::Reject,
            ScorePolicyArg::PassThrough => ScorePolicy::PassThrough,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers progress; keep INFO logs out of its way.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    let job_description = read_job_description(&cli)?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let document = match cli.resume.as_deref() {
        Some(input) => Some(
            resolve_input(input, config.download_timeout_secs)
                .await
                .context("Failed to load resume")?,
        ),
        None => None,
    };

    let report = analyze(document.as_ref(), &job_description, &config)
        .await
        .context("Analysis failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        print_report(&report);
        if !cli.quiet {
            eprintln!(
                "   {} tokens in  /  {} tokens out  —  {}ms total",
                dim(&report.stats.total_input_tokens.to_string()),
                dim(&report.stats.total_output_tokens.to_string()),
                report.stats.total_duration_ms,
            );
        }
    }

    if report.stats.succeeded_tabs == 0 {
        anyhow::bail!("All model calls failed");
    }
    Ok(())
}

/// `--job` wins; otherwise `--job-file`, where `-` means stdin.
fn read_job_description(cli: &Cli) -> Result<String> {
    if let Some(ref text) = cli.job {
        return Ok(text.clone());
    }
    match cli.job_file.as_deref() {
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read job description from stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job description from {:?}", path)),
        // Empty: the library reports the missing input.
        None => Ok(String::new()),
    }
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .dpi(cli.dpi)
        .max_tokens(cli.max_tokens)
        .score_policy(cli.score_policy.into())
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_report(report: &AnalysisReport) {
    for tab in report.tabs() {
        println!("{}", bold(&format!("── {} ──", tab.tab.title())));
        match tab.tab {
            AnalysisTab::MatchScore => print_match_tab(tab, &report.visualization),
            _ => print_tab_body(tab),
        }
        println!();
    }
}

fn print_tab_body(tab: &TabResult) {
    match tab.error {
        None => print!("{}", tab.display_text),
        Some(ref e) => println!("{}", red(&e.to_string())),
    }
}

fn print_match_tab(tab: &TabResult, visualization: &Visualization) {
    if tab.error.is_some() {
        print_tab_body(tab);
        return;
    }
    match visualization {
        Visualization::Donut(spec) => println!("{}\n", green(&spec.gauge(30))),
        Visualization::Unavailable(reason) => println!("{}\n", yellow(&reason.to_string())),
    }
    print_tab_body(tab);
}
