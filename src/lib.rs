//! # jobfit
//!
//! Score a resume against a job description using Vision Language Models
//! (VLMs).
//!
//! The first page of the resume PDF is rasterised and sent, together with
//! the job description, to a vision model three times: once for an HR-style
//! summary, once for skill-improvement advice, and once as an ATS scorer that
//! answers with `Match Score: NN%`. That score drives a two-segment donut
//! chart (match vs gap).
//!
//! ## Pipeline Overview
//!
//! ```text
//! resume.pdf + job description
//!  │
//!  ├─ 1. Input   read local file or download from URL
//!  ├─ 2. Render  rasterise page 1 via pdfium (spawn_blocking)
//!  ├─ 3. Encode  JPEG → base64 payload
//!  ├─ 4. VLM     three concurrent calls (summary / improve / score)
//!  ├─ 5. Score   regex `Match Score: NN%` → MatchScore
//!  └─ 6. Chart   donut spec or an "unavailable" reason
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobfit::{analyze, AnalysisConfig, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = AnalysisConfig::default();
//!     let resume = UploadedDocument::new(std::fs::read("resume.pdf")?).with_name("resume.pdf");
//!     let report = analyze(Some(&resume), "Senior backend engineer, Go", &config).await?;
//!     println!("{}", report.summary.display_text);
//!     if let Some(chart) = report.visualization.chart() {
//!         println!("{}", chart.gauge(20));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `jobfit` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! jobfit = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod chart;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_file, analyze_image, analyze_sync};
pub use chart::{
    build_donut_spec, build_donut_spec_with, DonutChartSpec, ScorePolicy, Segment, Unavailable,
    Visualization,
};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, RasterOptions, DEFAULT_MODEL};
pub use error::{JobFitError, TabError};
pub use output::{AnalysisReport, AnalysisStats, AnalysisTab, TabResult};
pub use pipeline::encode::ImagePayload;
pub use pipeline::input::{resolve_input, UploadedDocument};
pub use pipeline::llm::{LlmModelClient, ModelClient, ModelResponse};
pub use pipeline::render::{rasterize, rasterize_with};
pub use pipeline::score::{extract_score, MatchScore};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{analyze_stream, TabStream};
