//! Output types of an analysis: one [`TabResult`] per tab plus the
//! extracted score and its visualisation, bundled in an [`AnalysisReport`].

use crate::chart::Visualization;
use crate::error::TabError;
use crate::pipeline::score::MatchScore;
use crate::prompts::{IMPROVEMENT_PROMPT, MATCH_SCORE_PROMPT, SUMMARY_PROMPT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three independent analyses run for every resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTab {
    Summary,
    Improvements,
    MatchScore,
}

impl AnalysisTab {
    /// Display order.
    pub const ALL: [AnalysisTab; 3] = [
        AnalysisTab::Summary,
        AnalysisTab::Improvements,
        AnalysisTab::MatchScore,
    ];

    /// Instruction sent to the model for this tab.
    pub fn prompt(self) -> &'static str {
        match self {
            AnalysisTab::Summary => SUMMARY_PROMPT,
            AnalysisTab::Improvements => IMPROVEMENT_PROMPT,
            AnalysisTab::MatchScore => MATCH_SCORE_PROMPT,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AnalysisTab::Summary => "Summary",
            AnalysisTab::Improvements => "Improve Skills",
            AnalysisTab::MatchScore => "Match Score",
        }
    }
}

impl fmt::Display for AnalysisTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Outcome of one tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabResult {
    pub tab: AnalysisTab,
    /// Model text exactly as returned. Empty on error.
    pub response: String,
    /// `response` after [`crate::pipeline::postprocess::clean_response`].
    pub display_text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub error: Option<TabError>,
}

impl TabResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub(crate) fn failed(tab: AnalysisTab, error: TabError, duration_ms: u64) -> Self {
        Self {
            tab,
            response: String::new(),
            display_text: String::new(),
            input_tokens: 0,
            output_tokens: 0,
            duration_ms,
            error: Some(error),
        }
    }
}

/// Timing and token statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub succeeded_tabs: usize,
    pub failed_tabs: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub render_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl AnalysisStats {
    pub(crate) fn from_tabs(tabs: &[&TabResult]) -> Self {
        Self {
            succeeded_tabs: tabs.iter().filter(|t| t.is_ok()).count(),
            failed_tabs: tabs.iter().filter(|t| !t.is_ok()).count(),
            total_input_tokens: tabs.iter().map(|t| t.input_tokens as u64).sum(),
            total_output_tokens: tabs.iter().map(|t| t.output_tokens as u64).sum(),
            ..Default::default()
        }
    }
}

/// Full result of analysing one resume against one job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// File name or URL of the resume, when known.
    pub document_name: Option<String>,
    pub summary: TabResult,
    pub improvements: TabResult,
    pub match_report: TabResult,
    /// Score parsed from the raw match-tab response.
    pub score: Option<MatchScore>,
    pub visualization: Visualization,
    pub stats: AnalysisStats,
}

impl AnalysisReport {
    /// Tabs in display order.
    pub fn tabs(&self) -> [&TabResult; 3] {
        [&self.summary, &self.improvements, &self.match_report]
    }

    pub fn tab(&self, tab: AnalysisTab) -> &TabResult {
        match tab {
            AnalysisTab::Summary => &self.summary,
            AnalysisTab::Improvements => &self.improvements,
            AnalysisTab::MatchScore => &self.match_report,
        }
    }
}
