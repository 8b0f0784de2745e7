//! Structured analysis results.
//!
//! Every field defaults so partially shaped model output still parses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectedValue {
    pub id: String,
    pub name: String,
    /// Phase the value surfaced in (`envy`, `rage`, `loss`).
    pub source: String,
    pub confidence: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowInsight {
    pub hidden_desire: String,
    pub core_rule: String,
    pub identity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShadowAnalysis {
    pub values: Vec<DetectedValue>,
    pub analysis: ShadowInsight,
    pub summary: String,
}

impl ShadowAnalysis {
    pub fn fallback() -> Self {
        Self {
            values: vec![DetectedValue {
                id: "V003".into(),
                name: "Growth".into(),
                source: "loss".into(),
                confidence: 50.0,
                evidence: "Your answers keep returning to becoming more than you are now.".into(),
            }],
            analysis: ShadowInsight {
                hidden_desire: "To be recognized for who you are becoming.".into(),
                core_rule: "Effort and honesty must be respected.".into(),
                identity: "Someone who keeps moving forward.".into(),
            },
            summary: "The detailed verdict is unavailable right now. Your testimony points \
                      toward growth; revisit the analysis later for a fuller reading."
                .into(),
        }
    }

    /// Name of the strongest value, if any.
    pub fn primary_value(&self) -> Option<&str> {
        self.values
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|v| v.name.as_str())
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoredValue {
    pub id: String,
    pub name: String,
    pub confidence: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryValues {
    pub category_id: String,
    pub category_name: String,
    pub values: Vec<ScoredValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SentenceAnalysis {
    pub categories: Vec<CategoryValues>,
    pub primary_value: Option<ScoredValue>,
    pub summary: String,
}

impl SentenceAnalysis {
    pub fn fallback() -> Self {
        Self {
            categories: Vec::new(),
            primary_value: Some(ScoredValue {
                id: "V027".into(),
                name: "Genuineness".into(),
                confidence: 50.0,
                evidence: String::new(),
            }),
            summary: "The detailed analysis is unavailable right now. Your sentences suggest \
                      you care about living as your real self."
                .into(),
        }
    }

    pub fn primary_value(&self) -> Option<&str> {
        self.primary_value
            .as_ref()
            .map(|v| v.name.as_str())
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub description: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CciAnalysis {
    pub themes: Vec<Theme>,
    pub life_narrative: String,
    pub core_values: Vec<String>,
    pub career_advice: String,
}

impl CciAnalysis {
    pub fn fallback() -> Self {
        Self {
            themes: vec![Theme {
                id: "growth".into(),
                name: "Growth".into(),
                description: "You keep learning and trying to become a better version of yourself."
                    .into(),
                frequency: 3,
            }],
            life_narrative: "Your answers tell a story of valuing growth and change.".into(),
            core_values: vec!["Growth".into(), "Challenge".into(), "Integrity".into()],
            career_advice: "Look for places where you can keep learning and grow at your own pace."
                .into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObstaclePlan {
    pub if_then_plan: String,
    pub suggestions: Vec<String>,
}

impl ObstaclePlan {
    pub fn fallback(obstacle: &str) -> Self {
        Self {
            if_then_plan: format!(
                "If {} comes up, then I will do just the first two minutes of my goal.",
                obstacle.trim()
            ),
            suggestions: vec![
                "Shrink the goal until it feels almost too easy.".into(),
                "Prepare what you need the night before.".into(),
                "Remove the trigger of the obstacle from your surroundings.".into(),
            ],
        }
    }
}
