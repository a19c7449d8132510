use crate::models::{Category, Feedback, Tip};

/// Canned feedback stored when the AI service refuses on quota grounds.
pub fn sample_feedback() -> Feedback {
    Feedback {
        overall_score: 75.0,
        ats: Category {
            score: 80.0,
            tips: vec![
                Tip::good("Good use of keywords"),
                Tip::improve("Add more technical skills"),
            ],
        },
        tone_and_style: Category {
            score: 70.0,
            tips: vec![
                Tip::good("Professional tone maintained throughout").explained(
                    "Your resume maintains a consistent professional tone that's appropriate for the industry.",
                ),
                Tip::improve("Use more action-oriented language").explained(
                    "Replace passive phrases with strong action verbs to make your achievements more impactful.",
                ),
                Tip::improve("Avoid overly casual expressions").explained(
                    "Some phrases could be more formal to maintain professional standards expected in resumes.",
                ),
            ],
        },
        content: Category {
            score: 75.0,
            tips: vec![
                Tip::good("Clear achievement descriptions").explained(
                    "Your accomplishments are well-articulated with specific examples and measurable results.",
                ),
                Tip::improve("Add more quantifiable metrics").explained(
                    "Include specific numbers, percentages, or dollar amounts to demonstrate the impact of your work.",
                ),
                Tip::improve("Expand on recent role responsibilities").explained(
                    "Your most recent position could benefit from more detailed description of key responsibilities and achievements.",
                ),
            ],
        },
        structure: Category {
            score: 80.0,
            tips: vec![
                Tip::good("Well-organized sections").explained(
                    "Your resume follows a logical structure with clearly defined sections that are easy to navigate.",
                ),
                Tip::good("Appropriate length").explained(
                    "The resume length is appropriate for your experience level and doesn't overwhelm the reader.",
                ),
                Tip::improve("Consider reordering sections").explained(
                    "Moving your skills section closer to the top could help highlight your key competencies earlier.",
                ),
            ],
        },
        skills: Category {
            score: 65.0,
            tips: vec![
                Tip::improve("Add more technical skills").explained(
                    "Include additional technical skills that are relevant to your target role to better match job requirements.",
                ),
                Tip::improve("Categorize your skills").explained(
                    "Group skills into categories (e.g., Programming Languages, Tools, Soft Skills) for better organization.",
                ),
                Tip::good("Relevant skill selection").explained(
                    "The skills listed are relevant to your field and demonstrate good technical foundation.",
                ),
                Tip::improve("Include proficiency levels").explained(
                    "Consider adding proficiency levels (Beginner, Intermediate, Advanced) to give better context for your skills.",
                ),
            ],
        },
    }
}
