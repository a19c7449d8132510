// Feedback prompt. The response format mirrors `models::Feedback` exactly;
// keep them in sync.

pub const FEEDBACK_RESPONSE_FORMAT: &str = r#"interface Feedback {
  overallScore: number; // max 100
  ATS: {
    score: number; // rate based on ATS suitability
    tips: {
      type: "good" | "improve";
      tip: string; // give 3-4 tips
    }[];
  };
  toneAndStyle: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string; // make it a short "title" for the actual explanation
      explanation: string; // explain in detail here
    }[]; // give 3-4 tips
  };
  content: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string;
      explanation: string;
    }[]; // give 3-4 tips
  };
  structure: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string;
      explanation: string;
    }[]; // give 3-4 tips
  };
  skills: {
    score: number; // max 100
    tips: {
      type: "good" | "improve";
      tip: string;
      explanation: string;
    }[]; // give 3-4 tips
  };
}"#;

/// Builds the instruction string sent alongside the resume file.
///
/// User text is inserted in a single pass, so braces inside it are kept
/// literally.
pub fn prepare_instructions(job_title: &str, job_description: &str) -> String {
    format!(
        "\
You are an expert in ATS (Applicant Tracking System) and resume analysis. \
Analyze and rate the attached resume and suggest how to improve it. \
The rating can be low if the resume is bad. \
Be thorough and detailed. Do not hesitate to point out mistakes or areas for improvement. \
If there is a lot to improve, do not hesitate to give low scores. \
If available, use the job description for the job the user is applying to \
when judging the resume.

The job title is: {job_title}
The job description is: {job_description}

Provide the feedback using the following format:
{response_format}

Return the analysis as a JSON object, without any other text and without backticks. \
Do not include any other text or comments.",
        job_title = job_title.trim(),
        job_description = job_description.trim(),
        response_format = FEEDBACK_RESPONSE_FORMAT,
    )
}
