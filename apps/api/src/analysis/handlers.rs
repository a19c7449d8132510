//! Axum route handlers for the upload screen.

use std::convert::Infallible;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{stream, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::analysis::status::{StatusLog, StatusReporter, WorkflowStatus};
use crate::analysis::workflow::{analyze_resume, AnalysisOutcome, AnalyzeRequest};
use crate::errors::AppError;
use crate::models::file::PDF_MIME;
use crate::models::FileHandle;
use crate::state::AppState;
use crate::uploader::{format_size, FileSelector, Rejection, MAX_FILE_SIZE};

/// Multipart body limit. Leaves room for the form fields around a
/// maximum-size PDF.
pub const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE as usize + 5 * 1024 * 1024;

#[derive(Debug, Default)]
struct UploadForm {
    company_name: String,
    job_title: String,
    job_description: String,
    files: Vec<FileHandle>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub outcome: &'static str,
    pub status: String,
    pub history: Vec<String>,
    pub resume_id: Option<String>,
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RejectedUpload {
    pub message: String,
    pub rejected: Vec<Rejection>,
}

/// POST /api/v1/resumes
///
/// Multipart fields: `company-name`, `job-title`, `job-description`, `file`.
/// Runs the whole workflow before responding.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let request = accept_upload(read_form(&mut multipart).await?)?;

    let log = StatusLog::new();
    let outcome = analyze_resume(&state.platform, request, &log).await;
    let (code, response) = summarize(&outcome, &log);
    Ok((code, Json(response)))
}

/// POST /api/v1/uploads/stream
///
/// Same form as `handle_analyze`. Each status is sent as a `status` event
/// while the run progresses, followed by one `done` event carrying the
/// `AnalyzeResponse`. The run continues if the client disconnects.
pub async fn handle_analyze_stream(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let request = accept_upload(read_form(&mut multipart).await?)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let platform = state.platform.clone();
    tokio::spawn(async move {
        let reporter = ChannelReporter {
            tx: tx.clone(),
            log: StatusLog::new(),
        };
        let outcome = analyze_resume(&platform, request, &reporter).await;
        let (_, response) = summarize(&outcome, &reporter.log);
        let _ = tx.send(Update::Done(response));
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|update| (update, rx))
    })
    .map(|update| Ok::<Event, Infallible>(update.into_event()));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

enum Update {
    Status(WorkflowStatus),
    Done(AnalyzeResponse),
}

impl Update {
    fn into_event(self) -> Event {
        match self {
            Update::Status(status) => Event::default().event("status").data(status.to_string()),
            Update::Done(response) => Event::default()
                .event("done")
                .data(serde_json::to_string(&response).unwrap_or_default()),
        }
    }
}

/// Forwards every status to the stream and keeps the history for the
/// final summary.
struct ChannelReporter {
    tx: mpsc::UnboundedSender<Update>,
    log: StatusLog,
}

impl StatusReporter for ChannelReporter {
    fn report(&self, status: &WorkflowStatus) {
        self.log.report(status);
        // A closed receiver only means the client went away.
        let _ = self.tx.send(Update::Status(status.clone()));
    }
}

/// Runs the dropped files through the selector; exactly one accepted PDF
/// becomes the workflow request.
fn accept_upload(form: UploadForm) -> Result<AnalyzeRequest, AppError> {
    let mut selector = FileSelector::new(None);
    let rejected = selector.drop_files(form.files);
    let Some(file) = selector.selected().cloned() else {
        let reasons = serde_json::to_string(&RejectedUpload {
            message: format!("A single {} is required", FileSelector::hint()),
            rejected,
        })
        .unwrap_or_default();
        return Err(AppError::Validation(reasons));
    };
    info!(
        "Analyzing {} ({}) for {} at {}",
        file.name,
        format_size(file.size()),
        form.job_title,
        form.company_name
    );

    Ok(AnalyzeRequest {
        company_name: form.company_name,
        job_title: form.job_title,
        job_description: form.job_description,
        file,
    })
}

fn summarize(outcome: &AnalysisOutcome, log: &StatusLog) -> (StatusCode, AnalyzeResponse) {
    let (code, label) = match outcome {
        AnalysisOutcome::Completed { .. } => (StatusCode::CREATED, "completed"),
        AnalysisOutcome::SampleFeedback { .. } => (StatusCode::CREATED, "sample_feedback"),
        AnalysisOutcome::Halted { .. } => (StatusCode::BAD_GATEWAY, "halted"),
    };
    let current = log.current();
    if let Some(status) = current.as_ref().filter(|s| s.is_error()) {
        warn!("Analysis halted: {status}");
    }

    (
        code,
        AnalyzeResponse {
            outcome: label,
            status: current.map(|s| s.to_string()).unwrap_or_default(),
            history: log.history().iter().map(ToString::to_string).collect(),
            resume_id: outcome.id().map(String::from),
            redirect: outcome.redirect(),
        },
    )
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "company-name" => form.company_name = field.text().await?,
            "job-title" => form.job_title = field.text().await?,
            "job-description" => form.job_description = field.text().await?,
            "file" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field
                    .content_type()
                    .map(String::from)
                    .unwrap_or_else(|| guess_content_type(&file_name).to_string());
                let bytes = field.bytes().await?;
                form.files.push(FileHandle::new(file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    Ok(form)
}

fn guess_content_type(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".pdf") {
        PDF_MIME
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("CV.PDF"), PDF_MIME);
        assert_eq!(guess_content_type("cv.docx"), "application/octet-stream");
    }
}
