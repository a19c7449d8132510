//! Presentation models for the review screen.

use serde::Serialize;

use crate::models::{Category, Feedback, Tip};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Badge {
    #[serde(rename = "Strong")]
    Strong,
    #[serde(rename = "Good Start")]
    GoodStart,
    #[serde(rename = "Needs Work")]
    NeedsWork,
}

impl Badge {
    pub fn for_score(score: f64) -> Self {
        if score > 69.0 {
            Badge::Strong
        } else if score > 49.0 {
            Badge::GoodStart
        } else {
            Badge::NeedsWork
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Good,
    Warning,
    Bad,
}

impl Tone {
    pub fn for_score(score: f64) -> Self {
        match Badge::for_score(score) {
            Badge::Strong => Tone::Good,
            Badge::GoodStart => Tone::Warning,
            Badge::NeedsWork => Tone::Bad,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRow {
    pub title: &'static str,
    pub score: f64,
    pub badge: Badge,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub overall_score: f64,
    pub headline: &'static str,
    pub note: &'static str,
    pub categories: Vec<ScoreRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsPanel {
    pub score: f64,
    pub tone: Tone,
    pub headline: String,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub suggestions: Vec<Tip>,
    pub closing: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSection {
    pub title: &'static str,
    pub score: f64,
    pub badge: Badge,
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub summary: Summary,
    pub ats: AtsPanel,
    pub details: Vec<DetailSection>,
}

/// The four categories shown in both the summary and the details panel.
fn sections(feedback: &Feedback) -> [(&'static str, &Category); 4] {
    [
        ("Tone & Style", &feedback.tone_and_style),
        ("Content", &feedback.content),
        ("Structure", &feedback.structure),
        ("Skills", &feedback.skills),
    ]
}

impl FeedbackView {
    pub fn new(feedback: &Feedback) -> Self {
        let summary = Summary {
            overall_score: feedback.overall_score,
            headline: "Your Resume Score",
            note: "This score is calculated based on the variables listed below.",
            categories: sections(feedback)
                .into_iter()
                .map(|(title, category)| ScoreRow {
                    title,
                    score: category.score,
                    badge: Badge::for_score(category.score),
                })
                .collect(),
        };

        let ats = AtsPanel {
            score: feedback.ats.score,
            tone: Tone::for_score(feedback.ats.score),
            headline: format!("ATS Score - {}/100", feedback.ats.score),
            subtitle: "How well does your resume pass through Applicant Tracking Systems?",
            description: "Your resume was scanned like an employer would. Here's how it performed:",
            suggestions: feedback.ats.tips.clone(),
            closing: "Want a better score? Improve your resume by applying the suggestions listed below.",
        };

        let details = sections(feedback)
            .into_iter()
            .map(|(title, category)| DetailSection {
                title,
                score: category.score,
                badge: Badge::for_score(category.score),
                tips: category.tips.clone(),
            })
            .collect();

        Self {
            summary,
            ats,
            details,
        }
    }
}
