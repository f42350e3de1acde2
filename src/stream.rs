//! Streaming analysis API: emit tabs as they complete.
//!
//! The three model calls run concurrently and take anywhere from a second to
//! a minute each. [`analyze_stream`] yields each [`TabResult`] the moment its
//! call returns, so a UI can show the summary while the score is still
//! pending. Tabs arrive in completion order; match on `result.tab`.
//!
//! Unlike [`crate::analyze::analyze`], no report is assembled. Call
//! [`crate::extract_score`] on the match-score tab's `response` to build the
//! chart yourself.

use crate::analyze::{rasterize_blocking, resolve_client, run_tab, validate_inputs};
use crate::config::AnalysisConfig;
use crate::error::JobFitError;
use crate::output::{AnalysisTab, TabResult};
use crate::pipeline::encode::ImagePayload;
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::llm::ModelClient;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of tab results.
pub type TabStream = Pin<Box<dyn Stream<Item = TabResult> + Send>>;

/// Analyse a resume, streaming each tab as it is ready.
///
/// Input validation, provider resolution and rendering happen before this
/// returns, so fatal errors surface here rather than inside the stream.
/// Per-tab failures are items with `error` set.
///
/// # Example
/// ```rust,no_run
/// use jobfit::{analyze_stream, AnalysisConfig, UploadedDocument};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let resume = UploadedDocument::new(std::fs::read("resume.pdf")?);
/// let config = AnalysisConfig::default();
/// let mut tabs = analyze_stream(Some(&resume), "Senior Rust engineer", &config).await?;
/// while let Some(tab) = tabs.next().await {
///     match tab.error {
///         None => println!("## {}\n{}", tab.tab, tab.display_text),
///         Some(e) => eprintln!("{e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn analyze_stream(
    document: Option<&UploadedDocument>,
    job_description: &str,
    config: &AnalysisConfig,
) -> Result<TabStream, JobFitError> {
    let document = validate_inputs(document, job_description)?;
    info!(
        "Starting streaming analysis of {}",
        document.name.as_deref().unwrap_or("<upload>")
    );

    let client = resolve_client(config)?;
    let image = rasterize_blocking(document, config).await?;

    Ok(stream_tabs(client, image, job_description, config))
}

/// Fan the three tabs out and yield them as they finish.
///
/// `on_analysis_complete` fires once the last tab has been yielded, so it
/// is only seen by callers that drain the stream.
pub(crate) fn stream_tabs(
    client: Arc<dyn ModelClient>,
    image: ImagePayload,
    job_description: &str,
    config: &AnalysisConfig,
) -> TabStream {
    let total = AnalysisTab::ALL.len();
    let callback = config.progress_callback.clone();
    if let Some(ref cb) = callback {
        cb.on_analysis_start(total);
    }

    let job_description = Arc::new(job_description.to_string());
    let image = Arc::new(image);
    let config = config.clone();
    let succeeded = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&succeeded);

    let tabs = stream::iter(AnalysisTab::ALL.into_iter().map(move |tab| {
        let client = Arc::clone(&client);
        let jd = Arc::clone(&job_description);
        let image = Arc::clone(&image);
        let cfg = config.clone();
        async move { run_tab(&client, tab, &jd, &image, &cfg).await }
    }))
    .buffer_unordered(total)
    .inspect(move |result| {
        if result.is_ok() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let finished = stream::once(async move {
        if let Some(cb) = callback {
            cb.on_analysis_complete(total, succeeded.load(Ordering::SeqCst));
        }
    })
    .filter_map(|()| async { None::<TabResult> });

    Box::pin(tabs.chain(finished))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::ModelResponse;
    use crate::progress::AnalysisProgressCallback;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct NeverCalled;

    #[async_trait]
    impl ModelClient for NeverCalled {
        async fn generate(&self, _: &str, _: &ImagePayload) -> Result<ModelResponse, JobFitError> {
            panic!("model must not be called for invalid input");
        }
    }

    #[tokio::test]
    async fn invalid_input_fails_before_streaming() {
        let config = AnalysisConfig::builder()
            .model_client(Arc::new(NeverCalled))
            .build()
            .unwrap();

        let result = analyze_stream(None, "Rust engineer", &config).await;
        assert!(matches!(result, Err(JobFitError::MissingInput { .. })));

        let doc = UploadedDocument::new(b"not a pdf".to_vec());
        let result = analyze_stream(Some(&doc), "Rust engineer", &config).await;
        assert!(matches!(result, Err(JobFitError::InvalidDocument { .. })));
    }

    /// Fails the improvements tab only.
    struct FlakyClient;

    #[async_trait]
    impl ModelClient for FlakyClient {
        async fn generate(&self, prompt: &str, _: &ImagePayload) -> Result<ModelResponse, JobFitError> {
            if prompt.contains("career coach") {
                Err(JobFitError::ExternalService {
                    message: "quota exceeded".into(),
                })
            } else {
                Ok(ModelResponse::text("Match Score: 50%"))
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl AnalysisProgressCallback for Recorder {
        fn on_analysis_start(&self, tabs: usize) {
            self.events.lock().unwrap().push(format!("start {tabs}"));
        }

        fn on_analysis_complete(&self, tabs: usize, success_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete {success_count}/{tabs}"));
        }
    }

    #[tokio::test]
    async fn drained_stream_reports_completion() {
        let recorder = Arc::new(Recorder::default());
        let config = AnalysisConfig::builder()
            .progress_callback(recorder.clone())
            .build()
            .unwrap();
        let image = ImagePayload {
            mime_type: "image/jpeg".into(),
            data: "AAAA".into(),
        };

        let mut tabs = stream_tabs(Arc::new(FlakyClient), image, "Rust engineer", &config);
        assert_eq!(*recorder.events.lock().unwrap(), vec!["start 3".to_string()]);

        let mut seen = Vec::new();
        while let Some(result) = tabs.next().await {
            seen.push(result);
        }

        assert_eq!(seen.len(), 3);
        assert_eq!(seen.iter().filter(|r| r.is_ok()).count(), 2);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["start 3".to_string(), "complete 2/3".to_string()]
        );
    }
}
