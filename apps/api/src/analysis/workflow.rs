//! Upload-and-analyze workflow.
//!
//! Linear: upload the PDF, rasterize a preview, upload the preview, store a
//! record with empty feedback, ask the AI for feedback, store the result.
//! Each step reports a status; the first failure halts the run. Nothing is
//! retried and a started run cannot be cancelled.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::analysis::sample::sample_feedback;
use crate::analysis::status::{StatusReporter, WorkflowStatus};
use crate::llm_client::{prompts::prepare_instructions, strip_json_fences, AiError};
use crate::models::{Feedback, FeedbackSlot, FileHandle, ResumeRecord};
use crate::platform::{KvError, KvStore, Platform};

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub file: FileHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// AI feedback stored.
    Completed { id: String },
    /// The AI refused on quota grounds; sample feedback stored instead.
    SampleFeedback { id: String },
    /// The run stopped. `id` is set when a record had already been stored.
    Halted {
        status: WorkflowStatus,
        id: Option<String>,
    },
}

impl AnalysisOutcome {
    pub fn id(&self) -> Option<&str> {
        match self {
            AnalysisOutcome::Completed { id } | AnalysisOutcome::SampleFeedback { id } => Some(id),
            AnalysisOutcome::Halted { id, .. } => id.as_deref(),
        }
    }

    /// Review page to navigate to. Halted runs stay put.
    pub fn redirect(&self) -> Option<String> {
        match self {
            AnalysisOutcome::Completed { id } | AnalysisOutcome::SampleFeedback { id } => {
                Some(review_path(id))
            }
            AnalysisOutcome::Halted { .. } => None,
        }
    }
}

pub fn review_path(id: &str) -> String {
    format!("/resume/{id}")
}

pub async fn analyze_resume(
    platform: &Platform,
    request: AnalyzeRequest,
    status: &dyn StatusReporter,
) -> AnalysisOutcome {
    let halt = |next: WorkflowStatus, id: Option<&str>| {
        status.report(&next);
        AnalysisOutcome::Halted {
            status: next,
            id: id.map(String::from),
        }
    };

    status.report(&WorkflowStatus::Uploading);
    let uploaded_file = match platform.fs.upload(&request.file).await {
        Ok(stored) => stored,
        Err(e) => {
            error!("File upload failed: {e}");
            return halt(WorkflowStatus::UploadFailed, None);
        }
    };
    info!("File uploaded: {}", uploaded_file.path);

    status.report(&WorkflowStatus::Converting);
    let image = match platform.raster.rasterize(&request.file).await {
        Ok(image) => image,
        Err(e) => {
            error!("PDF conversion failed: {e}");
            return halt(WorkflowStatus::ConversionFailed, None);
        }
    };

    status.report(&WorkflowStatus::UploadingImage);
    let uploaded_image = match platform.fs.upload(&image).await {
        Ok(stored) => stored,
        Err(e) => {
            error!("Image upload failed: {e}");
            return halt(WorkflowStatus::ImageUploadFailed, None);
        }
    };
    info!("Image uploaded: {}", uploaded_image.path);

    status.report(&WorkflowStatus::Preparing);
    let id = platform.ids.generate();
    let mut record = ResumeRecord {
        id: id.clone(),
        resume_path: uploaded_file.path.clone(),
        image_path: uploaded_image.path,
        company_name: request.company_name,
        job_title: request.job_title,
        job_description: request.job_description,
        feedback: FeedbackSlot::default(),
        created_at: Some(Utc::now()),
    };
    if let Err(e) = save_record(platform.kv.as_ref(), &record).await {
        error!("Saving initial record {id} failed: {e}");
        return halt(WorkflowStatus::InitialSaveFailed, None);
    }
    info!("Stored record {id} with empty feedback");

    status.report(&WorkflowStatus::Analyzing);
    let instructions = prepare_instructions(&record.job_title, &record.job_description);
    let response = match platform.ai.feedback(&uploaded_file.path, &instructions).await {
        Ok(response) => response,
        Err(AiError::QuotaExceeded(message)) => {
            warn!("AI quota exceeded ({message}); storing sample feedback for {id}");
            return store_sample(platform.kv.as_ref(), record, status).await;
        }
        Err(e) => {
            error!("AI feedback failed: {e}");
            let next = WorkflowStatus::for_ai_error(&e).unwrap_or(WorkflowStatus::ServiceUnavailable);
            return halt(next, Some(&id));
        }
    };

    let Some(text) = response.text() else {
        error!("AI response for {id} carried no text content");
        return halt(WorkflowStatus::EmptyResponse, Some(&id));
    };

    let feedback: Feedback = match serde_json::from_str(strip_json_fences(text)) {
        Ok(feedback) => feedback,
        Err(e) => {
            error!("AI feedback for {id} is not valid feedback JSON: {e}");
            return halt(WorkflowStatus::InvalidFormat, Some(&id));
        }
    };

    record.feedback = match FeedbackSlot::structured(&feedback) {
        Ok(slot) => slot,
        Err(e) => {
            error!("Encoding feedback for {id} failed: {e}");
            return halt(WorkflowStatus::ResultSaveFailed, Some(&id));
        }
    };
    if let Err(e) = save_record(platform.kv.as_ref(), &record).await {
        error!("Saving analysis for {id} failed: {e}");
        return halt(WorkflowStatus::ResultSaveFailed, Some(&id));
    }

    info!(
        "Analysis for {id} complete (overall score {})",
        feedback.overall_score
    );
    status.report(&WorkflowStatus::Complete);
    AnalysisOutcome::Completed { id }
}

async fn store_sample(
    kv: &dyn KvStore,
    mut record: ResumeRecord,
    status: &dyn StatusReporter,
) -> AnalysisOutcome {
    let id = record.id.clone();
    let saved = match FeedbackSlot::encoded(&sample_feedback()) {
        Ok(slot) => {
            record.feedback = slot;
            save_record(kv, &record).await
        }
        Err(e) => Err(SaveError::Encode(e)),
    };

    match saved {
        Ok(()) => {
            status.report(&WorkflowStatus::SampleFeedback);
            AnalysisOutcome::SampleFeedback { id }
        }
        Err(e) => {
            error!("Saving sample feedback for {id} failed: {e}");
            status.report(&WorkflowStatus::SampleSaveFailed);
            AnalysisOutcome::Halted {
                status: WorkflowStatus::SampleSaveFailed,
                id: Some(id),
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum SaveError {
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Kv(#[from] KvError),
}

async fn save_record(kv: &dyn KvStore, record: &ResumeRecord) -> Result<(), SaveError> {
    let value = serde_json::to_string(record)?;
    kv.set(&record.key(), &value).await?;
    Ok(())
}
