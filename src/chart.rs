//! Match-score visualisation: a two-segment donut chart description.
//!
//! The chart is pure data. Rendering belongs to whoever displays the report:
//! a web front-end can feed [`DonutChartSpec::to_plotly_json`] straight into
//! Plotly, and the CLI draws [`DonutChartSpec::gauge`] in the terminal.

use crate::pipeline::score::MatchScore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Inner-hole ratio; 0 would be a pie.
pub const DONUT_HOLE: f32 = 0.6;
pub const MATCH_COLOR: &str = "#00CC96";
pub const GAP_COLOR: &str = "#FF6361";
pub const CENTER_FONT_SIZE: u32 = 20;

/// What to do with a score outside 0–100.
///
/// Models occasionally answer `Match Score: 150%`. Drawing that literally
/// gives a negative "Gap" slice, which chart libraries render as garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// Clamp to 100 (default).
    #[default]
    Clamp,
    /// Refuse to draw; the caller shows a warning instead.
    Reject,
    /// Draw the raw value, even if `Gap` goes negative.
    PassThrough,
}

/// One slice of the donut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub label: String,
    pub value: i64,
    pub color: String,
}

/// Everything a renderer needs to draw the match-score donut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutChartSpec {
    /// Always `[Match, Gap]`, in that order.
    pub segments: Vec<Segment>,
    pub hole: f32,
    pub show_legend: bool,
    /// Centre annotation, e.g. `"85%"`.
    pub center_label: String,
    pub center_font_size: u32,
}

/// Why no chart could be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unavailable {
    /// The response contained no `Match Score: NN%` line.
    NoScore,
    /// The score exceeded 100 under [`ScorePolicy::Reject`].
    OutOfRange { score: u32 },
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailable::NoScore => write!(f, "Couldn't extract a match score from the response."),
            Unavailable::OutOfRange { score } => {
                write!(f, "The model reported an impossible match score of {score}%.")
            }
        }
    }
}

/// Outcome of visualising a (possibly absent) score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Visualization {
    Donut(DonutChartSpec),
    Unavailable(Unavailable),
}

impl Visualization {
    pub fn chart(&self) -> Option<&DonutChartSpec> {
        match self {
            Visualization::Donut(spec) => Some(spec),
            Visualization::Unavailable(_) => None,
        }
    }
}

/// Build the donut using [`ScorePolicy::default`].
pub fn build_donut_spec(score: Option<MatchScore>) -> Visualization {
    build_donut_spec_with(score, ScorePolicy::default())
}

pub fn build_donut_spec_with(score: Option<MatchScore>, policy: ScorePolicy) -> Visualization {
    let Some(score) = score else {
        return Visualization::Unavailable(Unavailable::NoScore);
    };

    let value = match policy {
        _ if score.is_in_range() => score.value(),
        ScorePolicy::Clamp => 100,
        ScorePolicy::Reject => {
            return Visualization::Unavailable(Unavailable::OutOfRange {
                score: score.value(),
            })
        }
        ScorePolicy::PassThrough => score.value(),
    };

    Visualization::Donut(DonutChartSpec::new(value))
}

impl DonutChartSpec {
    fn new(score: u32) -> Self {
        let matched = i64::from(score);
        Self {
            segments: vec![
                Segment {
                    label: "Match".into(),
                    value: matched,
                    color: MATCH_COLOR.into(),
                },
                Segment {
                    label: "Gap".into(),
                    value: 100 - matched,
                    color: GAP_COLOR.into(),
                },
            ],
            hole: DONUT_HOLE,
            show_legend: false,
            center_label: format!("{score}%"),
            center_font_size: CENTER_FONT_SIZE,
        }
    }

    /// Value of the `Match` segment; `None` for a hand-built or
    /// deserialised spec that lacks it.
    pub fn match_value(&self) -> Option<i64> {
        self.segment_value("Match")
    }

    pub fn gap_value(&self) -> Option<i64> {
        self.segment_value("Gap")
    }

    fn segment_value(&self, label: &str) -> Option<i64> {
        self.segments.iter().find(|s| s.label == label).map(|s| s.value)
    }

    /// A Plotly figure (`{data, layout}`) equivalent to this spec.
    pub fn to_plotly_json(&self) -> Value {
        let labels: Vec<&str> = self.segments.iter().map(|s| s.label.as_str()).collect();
        let values: Vec<i64> = self.segments.iter().map(|s| s.value).collect();
        let colors: Vec<&str> = self.segments.iter().map(|s| s.color.as_str()).collect();

        json!({
            "data": [{
                "type": "pie",
                "labels": labels,
                "values": values,
                "hole": self.hole,
                "marker": { "colors": colors },
                "textinfo": "none",
            }],
            "layout": {
                "showlegend": self.show_legend,
                "margin": { "t": 0, "b": 0, "l": 0, "r": 0 },
                "annotations": [{
                    "text": self.center_label,
                    "x": 0.5,
                    "y": 0.5,
                    "font": { "size": self.center_font_size },
                    "showarrow": false,
                }],
            },
        })
    }

    /// Flat text gauge `width` cells wide, e.g. `███████░░░ 72%`.
    ///
    /// Negative or oversized segments (pass-through policy) saturate at the
    /// ends of the bar.
    pub fn gauge(&self, width: usize) -> String {
        let width = width.max(1);
        let matched = self.match_value().unwrap_or(0).clamp(0, 100) as usize;
        let filled = (matched * width + 50) / 100;
        format!(
            "{}{} {}",
            "█".repeat(filled),
            "░".repeat(width - filled),
            self.center_label
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donut(score: u32, policy: ScorePolicy) -> DonutChartSpec {
        match build_donut_spec_with(Some(MatchScore::new(score)), policy) {
            Visualization::Donut(spec) => spec,
            other => panic!("expected donut, got {other:?}"),
        }
    }

    #[test]
    fn eighty_five() {
        let spec = donut(85, ScorePolicy::Clamp);
        let pairs: Vec<(&str, i64)> = spec
            .segments
            .iter()
            .map(|s| (s.label.as_str(), s.value))
            .collect();
        assert_eq!(pairs, vec![("Match", 85), ("Gap", 15)]);
        assert_eq!(spec.center_label, "85%");
        assert_eq!(spec.hole, 0.6);
        assert!(!spec.show_legend);
        assert_eq!(spec.segments[0].color, MATCH_COLOR);
        assert_eq!(spec.segments[1].color, GAP_COLOR);
    }

    #[test]
    fn absent_score_is_unavailable() {
        assert_eq!(
            build_donut_spec(None),
            Visualization::Unavailable(Unavailable::NoScore)
        );
    }

    #[test]
    fn bounds_are_drawable() {
        let zero = donut(0, ScorePolicy::Reject);
        assert_eq!((zero.match_value(), zero.gap_value()), (Some(0), Some(100)));
        let full = donut(100, ScorePolicy::Reject);
        assert_eq!((full.match_value(), full.gap_value()), (Some(100), Some(0)));
    }

    #[test]
    fn clamp_policy_caps_at_hundred() {
        let spec = donut(150, ScorePolicy::Clamp);
        assert_eq!((spec.match_value(), spec.gap_value()), (Some(100), Some(0)));
        assert_eq!(spec.center_label, "100%");
    }

    #[test]
    fn reject_policy_refuses() {
        assert_eq!(
            build_donut_spec_with(Some(MatchScore::new(150)), ScorePolicy::Reject),
            Visualization::Unavailable(Unavailable::OutOfRange { score: 150 })
        );
    }

    #[test]
    fn pass_through_allows_negative_gap() {
        let spec = donut(150, ScorePolicy::PassThrough);
        assert_eq!((spec.match_value(), spec.gap_value()), (Some(150), Some(-50)));
        assert_eq!(spec.center_label, "150%");
    }

    #[test]
    fn plotly_figure_shape() {
        let fig = donut(72, ScorePolicy::Clamp).to_plotly_json();
        assert_eq!(fig["data"][0]["values"], json!([72, 28]));
        assert_eq!(fig["data"][0]["labels"], json!(["Match", "Gap"]));
        assert_eq!(fig["data"][0]["textinfo"], "none");
        assert_eq!(fig["layout"]["showlegend"], false);
        assert_eq!(fig["layout"]["annotations"][0]["text"], "72%");
        assert_eq!(fig["layout"]["annotations"][0]["font"]["size"], 20);
    }

    #[test]
    fn gauge_rendering() {
        assert_eq!(donut(50, ScorePolicy::Clamp).gauge(10), "█████░░░░░ 50%");
        assert_eq!(donut(0, ScorePolicy::Clamp).gauge(4), "░░░░ 0%");
        assert_eq!(donut(150, ScorePolicy::PassThrough).gauge(4), "████ 150%");
    }

    #[test]
    fn deserialised_spec_without_segments() {
        let spec: DonutChartSpec = serde_json::from_value(json!({
            "segments": [],
            "hole": 0.6,
            "show_legend": false,
            "center_label": "?",
            "center_font_size": 20,
        }))
        .unwrap();
        assert_eq!(spec.match_value(), None);
        assert_eq!(spec.gap_value(), None);
        assert_eq!(spec.gauge(4), "░░░░ ?");
    }

    #[test]
    fn visualization_serialises_tagged() {
        let v = build_donut_spec(None);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "unavailable");
        assert_eq!(json["value"]["reason"], "no_score");
    }
}
