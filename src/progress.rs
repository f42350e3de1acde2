//! Progress-callback trait for per-tab analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! events as the three tabs run. The three model calls are issued
//! concurrently, so `on_tab_*` methods may be called in any order and from
//! different threads.
//!
//! # Example
//!
//! ```rust
//! use jobfit::{AnalysisConfig, AnalysisProgressCallback, AnalysisTab};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl AnalysisProgressCallback for CountingCallback {
//!     fn on_tab_complete(&self, tab: AnalysisTab, response_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} done ({} chars)", tab, response_len);
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::AnalysisTab;
use std::sync::Arc;

/// Called by the analysis pipeline as it processes each tab.
///
/// All methods default to no-ops so callers only override what they need.
pub trait AnalysisProgressCallback: Send + Sync {
    /// The resume was rasterised and `tabs` model calls are about to start.
    fn on_analysis_start(&self, tabs: usize) {
        let _ = tabs;
    }

    /// Just before the model request for `tab` is sent.
    fn on_tab_start(&self, tab: AnalysisTab) {
        let _ = tab;
    }

    /// `tab` returned a response of `response_len` bytes.
    fn on_tab_complete(&self, tab: AnalysisTab, response_len: usize) {
        let _ = (tab, response_len);
    }

    /// `tab` failed; the other tabs continue.
    fn on_tab_error(&self, tab: AnalysisTab, error: &str) {
        let _ = (tab, error);
    }

    /// All tabs have finished, `success_count` of them without error.
    fn on_analysis_complete(&self, tabs: usize, success_count: usize) {
        let _ = (tabs, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
