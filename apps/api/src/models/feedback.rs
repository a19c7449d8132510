use serde::{Deserialize, Serialize};

/// Scored resume analysis as produced by the AI service or the sample fallback.
///
/// Scores are nominally 0 to 100 but are not range-checked: fractional and
/// negative values are kept as produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub overall_score: f64,
    #[serde(rename = "ATS")]
    pub ats: Category,
    pub tone_and_style: Category,
    pub content: Category,
    pub structure: Category,
    pub skills: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub score: f64,
    #[serde(default)]
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Good,
    Improve,
}

impl Tip {
    pub fn good(tip: &str) -> Self {
        Self {
            kind: TipKind::Good,
            tip: tip.to_string(),
            explanation: None,
        }
    }

    pub fn improve(tip: &str) -> Self {
        Self {
            kind: TipKind::Improve,
            tip: tip.to_string(),
            explanation: None,
        }
    }

    pub fn explained(mut self, explanation: &str) -> Self {
        self.explanation = Some(explanation.to_string());
        self
    }
}
