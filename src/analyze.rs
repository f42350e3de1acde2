//! Eager analysis entry points: run all three tabs, then return the report.
//!
//! Use [`crate::stream::analyze_stream`] instead to show each tab as soon as
//! its model call returns.

use crate::chart::build_donut_spec_with;
use crate::config::{AnalysisConfig, DEFAULT_MODEL};
use crate::error::JobFitError;
use crate::output::{AnalysisReport, AnalysisStats, AnalysisTab, TabResult};
use crate::pipeline::encode::ImagePayload;
use crate::pipeline::input::{resolve_input, UploadedDocument};
use crate::pipeline::llm::{process_tab, LlmModelClient, ModelClient};
use crate::pipeline::render::rasterize_with;
use crate::pipeline::score::extract_score;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Analyse a resume against a job description.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(JobFitError)` only for fatal errors:
/// - resume or job description missing
/// - the resume is not a usable PDF
/// - no model provider could be configured
///
/// A failing tab is *not* fatal; check `report.stats.failed_tabs` or each
/// tab's `error`.
pub async fn analyze(
    document: Option<&UploadedDocument>,
    job_description: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, JobFitError> {
    let total_start = Instant::now();
    let document = validate_inputs(document, job_description)?;
    info!(
        "Starting analysis of {} ({} bytes)",
        document.name.as_deref().unwrap_or("<upload>"),
        document.len()
    );

    let client = resolve_client(config)?;

    let render_start = Instant::now();
    let image = rasterize_blocking(document, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered first page in {}ms", render_duration_ms);

    let mut report = run_tabs(&client, &image, job_description, config).await;
    report.document_name = document.name.clone();
    report.stats.render_duration_ms = render_duration_ms;
    report.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(report)
}

/// Analyse an already rasterised resume page.
pub async fn analyze_image(
    image: ImagePayload,
    job_description: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, JobFitError> {
    let total_start = Instant::now();
    if job_description.trim().is_empty() {
        return Err(JobFitError::missing("job description"));
    }
    let client = resolve_client(config)?;

    let mut report = run_tabs(&client, &image, job_description, config).await;
    report.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(report)
}

/// Load the resume from a path or URL, then [`analyze`] it.
pub async fn analyze_file(
    input: impl AsRef<str>,
    job_description: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, JobFitError> {
    if job_description.trim().is_empty() {
        return Err(JobFitError::missing("job description"));
    }
    let document = resolve_input(input.as_ref(), config.download_timeout_secs).await?;
    analyze(Some(&document), job_description, config).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally; do not call from async code.
pub fn analyze_sync(
    document: Option<&UploadedDocument>,
    job_description: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, JobFitError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| JobFitError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(document, job_description, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Both inputs are required; report every missing one at once.
pub(crate) fn validate_inputs<'a>(
    document: Option<&'a UploadedDocument>,
    job_description: &str,
) -> Result<&'a UploadedDocument, JobFitError> {
    let jd_missing = job_description.trim().is_empty();
    match (document, jd_missing) {
        (None, true) => Err(JobFitError::missing("resume PDF and job description")),
        (None, false) => Err(JobFitError::missing("resume PDF")),
        (Some(_), true) => Err(JobFitError::missing("job description")),
        (Some(doc), false) => Ok(doc),
    }
}

/// Rasterise on the blocking pool; pdfium is CPU-bound and not async-aware.
pub(crate) async fn rasterize_blocking(
    document: &UploadedDocument,
    config: &AnalysisConfig,
) -> Result<ImagePayload, JobFitError> {
    let document = document.clone();
    let options = config.raster_options();
    tokio::task::spawn_blocking(move || rasterize_with(Some(&document), &options))
        .await
        .map_err(|e| JobFitError::Internal(format!("Render task panicked: {}", e)))?
}

/// Run the three tabs concurrently and assemble the report.
async fn run_tabs(
    client: &Arc<dyn ModelClient>,
    image: &ImagePayload,
    job_description: &str,
    config: &AnalysisConfig,
) -> AnalysisReport {
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start(AnalysisTab::ALL.len());
    }

    let llm_start = Instant::now();
    let (summary, improvements, match_report) = tokio::join!(
        run_tab(client, AnalysisTab::Summary, job_description, image, config),
        run_tab(client, AnalysisTab::Improvements, job_description, image, config),
        run_tab(client, AnalysisTab::MatchScore, job_description, image, config),
    );
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    let score = extract_score(&match_report.response);
    if match_report.is_ok() && score.is_none() {
        warn!("Match-score response contained no 'Match Score: NN%' line");
    }
    let visualization = build_donut_spec_with(score, config.score_policy);
    debug!("Score {:?} → {:?}", score, visualization);

    let mut stats = AnalysisStats::from_tabs(&[&summary, &improvements, &match_report]);
    stats.llm_duration_ms = llm_duration_ms;

    info!(
        "Analysis complete: {}/{} tabs, {}ms in model calls",
        stats.succeeded_tabs,
        AnalysisTab::ALL.len(),
        llm_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(AnalysisTab::ALL.len(), stats.succeeded_tabs);
    }

    AnalysisReport {
        document_name: None,
        summary,
        improvements,
        match_report,
        score,
        visualization,
        stats,
    }
}

/// One tab with progress events around it.
pub(crate) async fn run_tab(
    client: &Arc<dyn ModelClient>,
    tab: AnalysisTab,
    job_description: &str,
    image: &ImagePayload,
    config: &AnalysisConfig,
) -> TabResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_tab_start(tab);
    }
    let result = process_tab(client, tab, job_description, image, config).await;
    if let Some(ref cb) = config.progress_callback {
        match &result.error {
            None => cb.on_tab_complete(tab, result.response.len()),
            Some(e) => cb.on_tab_error(tab, &e.to_string()),
        }
    }
    result
}

/// Resolve the model collaborator, from most-specific to least-specific:
///
/// 1. **Custom client** (`config.model_client`), used as-is (tests, caching
///    layers, non-LLM backends).
/// 2. **Pre-built provider** (`config.provider`).
/// 3. **Named provider** (`config.provider_name`) with `config.model` or
///    [`DEFAULT_MODEL`]; the API key is read from the provider's usual
///    environment variable.
/// 4. **Environment pair** `JOBFIT_PROVIDER` + `JOBFIT_MODEL`.
/// 5. **Gemini** when `GEMINI_API_KEY` is set.
/// 6. **Full auto-detection** (`ProviderFactory::from_env`).
pub(crate) fn resolve_client(config: &AnalysisConfig) -> Result<Arc<dyn ModelClient>, JobFitError> {
    if let Some(ref client) = config.model_client {
        return Ok(Arc::clone(client));
    }
    let provider = resolve_provider(config)?;
    Ok(Arc::new(LlmModelClient::new(provider, config)))
}

fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn LLMProvider>, JobFitError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("JOBFIT_PROVIDER"),
        std::env::var("JOBFIT_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_vision_provider(&prov, &env_model);
        }
    }

    if std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_vision_provider("gemini", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| JobFitError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_vision_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, JobFitError> {
    debug!("Creating provider '{}' with model '{}'", provider_name, model);
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        JobFitError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Visualization;
    use crate::pipeline::llm::ModelResponse;
    use async_trait::async_trait;

    struct FixedClient;

    #[async_trait]
    impl ModelClient for FixedClient {
        async fn generate(&self, prompt: &str, _: &ImagePayload) -> Result<ModelResponse, JobFitError> {
            if prompt.contains("ATS system") {
                Ok(ModelResponse::text("Match Score: 90%\nGreat fit."))
            } else {
                Ok(ModelResponse::text("fine"))
            }
        }
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig::builder()
            .model_client(Arc::new(FixedClient))
            .build()
            .unwrap()
    }

    #[test]
    fn validate_reports_both_missing() {
        match validate_inputs(None, "   ") {
            Err(JobFitError::MissingInput { what }) => {
                assert_eq!(what, "resume PDF and job description")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validate_reports_missing_job_description() {
        let doc = UploadedDocument::new(b"%PDF".to_vec());
        assert!(matches!(
            validate_inputs(Some(&doc), ""),
            Err(JobFitError::MissingInput { what }) if what == "job description"
        ));
        assert!(validate_inputs(Some(&doc), "Rust engineer").is_ok());
    }

    #[test]
    fn injected_client_wins() {
        assert!(resolve_client(&config()).is_ok());
    }

    #[tokio::test]
    async fn analyze_requires_document() {
        let err = analyze(None, "Rust engineer", &config()).await.unwrap_err();
        assert!(matches!(err, JobFitError::MissingInput { .. }));
    }

    #[tokio::test]
    async fn analyze_rejects_non_pdf_before_calling_model() {
        let doc = UploadedDocument::new(b"hello world".to_vec());
        let err = analyze(Some(&doc), "Rust engineer", &config()).await.unwrap_err();
        assert!(matches!(err, JobFitError::InvalidDocument { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn analyze_image_builds_chart() {
        let image = ImagePayload {
            mime_type: "image/jpeg".into(),
            data: "AAAA".into(),
        };
        let report = analyze_image(image, "Rust engineer", &config()).await.unwrap();
        assert_eq!(report.score.map(|s| s.value()), Some(90));
        match report.visualization {
            Visualization::Donut(ref spec) => assert_eq!(spec.gap_value(), Some(10)),
            ref other => panic!("expected donut, got {other:?}"),
        }
        assert_eq!(report.stats.succeeded_tabs, 3);
        assert_eq!(report.summary.response, "fine");
    }

    #[tokio::test]
    async fn analyze_image_requires_job_description() {
        let image = ImagePayload {
            mime_type: "image/jpeg".into(),
            data: "AAAA".into(),
        };
        let err = analyze_image(image, "", &config()).await.unwrap_err();
        assert!(matches!(err, JobFitError::MissingInput { .. }));
    }
}
