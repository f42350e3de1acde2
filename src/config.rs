//! Configuration types for resume analysis.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. The config is an ordinary value passed to
//! [`crate::analyze::analyze`]; nothing is read from process-wide state
//! except during provider auto-detection, and tests can bypass that entirely
//! by injecting a [`ModelClient`].

use crate::chart::ScorePolicy;
use crate::error::JobFitError;
use crate::pipeline::encode::DEFAULT_JPEG_QUALITY;
use crate::pipeline::llm::ModelClient;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Options for rasterising the first resume page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterOptions {
    /// Rendering resolution. Default: 200 (the common PDF-to-image default).
    pub dpi: u32,
    /// Cap on either rendered dimension, in pixels. Default: 2000.
    ///
    /// Keeps a poster-sized "resume" from allocating a huge bitmap.
    pub max_rendered_pixels: u32,
    /// JPEG quality 1–100. Default: 75.
    pub jpeg_quality: u8,
    /// User password for encrypted PDFs.
    pub password: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 2000,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            password: None,
        }
    }
}

/// Configuration for one resume analysis.
///
/// # Example
/// ```rust
/// use jobfit::{AnalysisConfig, ScorePolicy};
///
/// let config = AnalysisConfig::builder()
///     .dpi(150)
///     .model("gemini-1.5-flash")
///     .score_policy(ScorePolicy::Reject)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Rendering DPI. Range: 72–400. Default: 200.
    pub dpi: u32,

    /// Maximum rendered image dimension. Default: 2000.
    pub max_rendered_pixels: u32,

    /// JPEG quality of the page image. Default: 75.
    pub jpeg_quality: u8,

    /// PDF user password for encrypted resumes.
    pub password: Option<String>,

    /// LLM model identifier. If None, [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Fully custom model collaborator. Takes precedence over everything else.
    pub model_client: Option<Arc<dyn ModelClient>>,

    /// Sampling temperature. None leaves the provider default.
    pub temperature: Option<f32>,

    /// Maximum tokens per tab response. Default: 2048.
    pub max_tokens: usize,

    /// Per-call model timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Download timeout for URL resumes in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Handling of scores above 100. Default: [`ScorePolicy::Clamp`].
    pub score_policy: ScorePolicy,

    /// Optional per-tab progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let raster = RasterOptions::default();
        Self {
            dpi: raster.dpi,
            max_rendered_pixels: raster.max_rendered_pixels,
            jpeg_quality: raster.jpeg_quality,
            password: None,
            model: None,
            provider_name: None,
            provider: None,
            model_client: None,
            temperature: None,
            max_tokens: 2048,
            api_timeout_secs: 60,
            download_timeout_secs: 120,
            score_policy: ScorePolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("model_client", &self.model_client.as_ref().map(|_| "<dyn ModelClient>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("score_policy", &self.score_policy)
            .finish()
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// The subset of options the rasteriser needs.
    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            dpi: self.dpi,
            max_rendered_pixels: self.max_rendered_pixels,
            jpeg_quality: self.jpeg_quality,
            password: self.password.clone(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl fmt::Debug for AnalysisConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnalysisConfigBuilder").field(&self.config).finish()
    }
}

impl AnalysisConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn model_client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.config.model_client = Some(client);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn score_policy(mut self, policy: ScorePolicy) -> Self {
        self.config.score_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, JobFitError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(JobFitError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.max_tokens == 0 {
            return Err(JobFitError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(JobFitError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
