//! Model interaction: the [`ModelClient`] seam and the per-tab call.
//!
//! The pipeline only ever needs "prompt + one image → text". That contract is
//! the [`ModelClient`] trait; [`LlmModelClient`] implements it on top of any
//! `edgequake-llm` provider, and tests plug in fakes.
//!
//! There are no retries: a failing tab is reported to the user as-is while
//! the other tabs carry on.

use crate::config::AnalysisConfig;
use crate::error::{JobFitError, TabError};
use crate::output::{AnalysisTab, TabResult};
use crate::pipeline::encode::ImagePayload;
use crate::pipeline::postprocess::clean_response;
use crate::prompts::full_prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Text returned by the model for one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl ModelResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// A vision-capable text generator.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Answer `prompt` about `image`.
    ///
    /// Failures must be reported as [`JobFitError::ExternalService`].
    async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<ModelResponse, JobFitError>;
}

/// [`ModelClient`] backed by an `edgequake-llm` provider.
pub struct LlmModelClient {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmModelClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AnalysisConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

#[async_trait]
impl ModelClient for LlmModelClient {
    async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<ModelResponse, JobFitError> {
        let messages = vec![ChatMessage::user_with_images(prompt, vec![image.clone().into()])];

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| JobFitError::ExternalService {
                message: e.to_string(),
            })?;

        Ok(ModelResponse {
            content: response.content,
            input_tokens: response.prompt_tokens as usize,
            output_tokens: response.completion_tokens as usize,
        })
    }
}

fn build_options(config: &AnalysisConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Run one tab against the model.
///
/// Never returns an error: failures are stored in `TabResult::error` so the
/// caller can keep the other tabs.
pub async fn process_tab(
    client: &Arc<dyn ModelClient>,
    tab: AnalysisTab,
    job_description: &str,
    image: &ImagePayload,
    config: &AnalysisConfig,
) -> TabResult {
    let start = Instant::now();
    let prompt = full_prompt(job_description, tab.prompt());
    let limit = Duration::from_secs(config.api_timeout_secs);

    let outcome = timeout(limit, client.generate(&prompt, image)).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(response)) => {
            debug!(
                "{}: {} input tokens, {} output tokens, {}ms",
                tab, response.input_tokens, response.output_tokens, duration_ms
            );
            TabResult {
                tab,
                display_text: clean_response(&response.content),
                response: response.content,
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
                duration_ms,
                error: None,
            }
        }
        Ok(Err(e)) => {
            warn!("{}: model call failed: {}", tab, e);
            TabResult::failed(
                tab,
                TabError::ExternalService {
                    tab: tab.to_string(),
                    detail: e.to_string(),
                },
                duration_ms,
            )
        }
        Err(_) => {
            warn!("{}: model call timed out after {}s", tab, config.api_timeout_secs);
            TabResult::failed(
                tab,
                TabError::Timeout {
                    tab: tab.to_string(),
                    secs: config.api_timeout_secs,
                },
                duration_ms,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoClient {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ModelClient for EchoClient {
        async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<ModelResponse, JobFitError> {
            assert_eq!(image.mime_type, "image/jpeg");
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(ModelResponse {
                content: "Match Score: 40%\r\nok   ".into(),
                input_tokens: 12,
                output_tokens: 3,
            })
        }
    }

    struct FailingClient;

    #[async_trait]
    impl ModelClient for FailingClient {
        async fn generate(&self, _: &str, _: &ImagePayload) -> Result<ModelResponse, JobFitError> {
            Err(JobFitError::ExternalService {
                message: "429 quota exceeded".into(),
            })
        }
    }

    struct SlowClient;

    #[async_trait]
    impl ModelClient for SlowClient {
        async fn generate(&self, _: &str, _: &ImagePayload) -> Result<ModelResponse, JobFitError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ModelResponse::text("too late"))
        }
    }

    fn payload() -> ImagePayload {
        ImagePayload {
            mime_type: "image/jpeg".into(),
            data: "AAAA".into(),
        }
    }

    #[test]
    fn build_options_defaults() {
        let config = AnalysisConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, None);
        assert_eq!(opts.max_tokens, Some(2048));
    }

    #[tokio::test]
    async fn successful_tab_keeps_raw_and_cleaned_text() {
        let echo = Arc::new(EchoClient {
            prompts: Mutex::new(Vec::new()),
        });
        let client: Arc<dyn ModelClient> = echo.clone();
        let config = AnalysisConfig::default();

        let result = process_tab(&client, AnalysisTab::MatchScore, "Rust dev", &payload(), &config).await;

        assert!(result.is_ok());
        assert_eq!(result.response, "Match Score: 40%\r\nok   ");
        assert_eq!(result.display_text, "Match Score: 40%\nok\n");
        assert_eq!(result.input_tokens, 12);

        let prompts = echo.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("Job Description:\nRust dev\n\nInstruction:\n"));
        assert!(prompts[0].contains("You are an ATS system"));
    }

    #[tokio::test]
    async fn failing_tab_is_captured() {
        let client: Arc<dyn ModelClient> = Arc::new(FailingClient);
        let result = process_tab(
            &client,
            AnalysisTab::Summary,
            "jd",
            &payload(),
            &AnalysisConfig::default(),
        )
        .await;

        match result.error {
            Some(TabError::ExternalService { tab, detail }) => {
                assert_eq!(tab, "Summary");
                assert!(detail.contains("quota"));
            }
            other => panic!("expected ExternalService, got {other:?}"),
        }
        assert!(result.response.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tab_times_out() {
        let client: Arc<dyn ModelClient> = Arc::new(SlowClient);
        let config = AnalysisConfig::builder().api_timeout_secs(5).build().unwrap();

        let result = process_tab(&client, AnalysisTab::Improvements, "jd", &payload(), &config).await;

        assert_eq!(
            result.error,
            Some(TabError::Timeout {
                tab: "Improve Skills".into(),
                secs: 5
            })
        );
    }
}
