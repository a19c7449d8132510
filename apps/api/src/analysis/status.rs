use std::fmt;
use std::sync::Mutex;

use crate::llm_client::AiError;

/// Every status the analysis workflow can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStatus {
    Uploading,
    Converting,
    UploadingImage,
    Preparing,
    Analyzing,
    Complete,
    SampleFeedback,
    UploadFailed,
    ConversionFailed,
    ImageUploadFailed,
    InitialSaveFailed,
    EmptyResponse,
    ServiceError,
    ServiceUnavailable,
    ServiceFailed(String),
    InvalidFormat,
    ResultSaveFailed,
    SampleSaveFailed,
}

impl WorkflowStatus {
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            WorkflowStatus::Uploading
                | WorkflowStatus::Converting
                | WorkflowStatus::UploadingImage
                | WorkflowStatus::Preparing
                | WorkflowStatus::Analyzing
                | WorkflowStatus::Complete
                | WorkflowStatus::SampleFeedback
        )
    }

    /// Status for an AI failure that has no fallback.
    pub fn for_ai_error(error: &AiError) -> Option<Self> {
        match error {
            AiError::QuotaExceeded(_) => None,
            AiError::BadRequest(_) => Some(WorkflowStatus::ServiceError),
            AiError::Unavailable(_) => Some(WorkflowStatus::ServiceUnavailable),
            AiError::Unknown(message) => Some(WorkflowStatus::ServiceFailed(message.clone())),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStatus::Uploading => f.write_str("Uploading the file..."),
            WorkflowStatus::Converting => f.write_str("Converting to image..."),
            WorkflowStatus::UploadingImage => f.write_str("Uploading the image..."),
            WorkflowStatus::Preparing => f.write_str("Preparing data..."),
            WorkflowStatus::Analyzing => f.write_str("Analyzing..."),
            WorkflowStatus::Complete => f.write_str("Analysis complete, redirecting..."),
            WorkflowStatus::SampleFeedback => f.write_str(
                "Resume uploaded! (AI analysis unavailable - using sample feedback)",
            ),
            WorkflowStatus::UploadFailed => f.write_str("Error: Failed to upload file"),
            WorkflowStatus::ConversionFailed => {
                f.write_str("Error: Failed to convert PDF to image")
            }
            WorkflowStatus::ImageUploadFailed => f.write_str("Error: Failed to upload image"),
            WorkflowStatus::InitialSaveFailed => f.write_str(
                "Error: Something went wrong during analysis. Please try again.",
            ),
            WorkflowStatus::EmptyResponse => {
                f.write_str("Error: AI analysis returned invalid data")
            }
            WorkflowStatus::ServiceError => f.write_str(
                "AI service error. Please try again or contact support if the issue persists.",
            ),
            WorkflowStatus::ServiceUnavailable => {
                f.write_str("Error: AI analysis service unavailable")
            }
            WorkflowStatus::ServiceFailed(message) => {
                let message = if message.trim().is_empty() {
                    "Unknown error"
                } else {
                    message
                };
                write!(f, "Error: AI service failed - {message}")
            }
            WorkflowStatus::InvalidFormat => {
                f.write_str("Error: Invalid response format from AI analysis")
            }
            WorkflowStatus::ResultSaveFailed => {
                f.write_str("Error: Failed to save analysis results")
            }
            WorkflowStatus::SampleSaveFailed => f.write_str("Error: Failed to save resume data"),
        }
    }
}

/// Receives progress updates. The status text is the only progress signal.
pub trait StatusReporter: Send + Sync {
    fn report(&self, status: &WorkflowStatus);
}

/// Keeps every reported status in order.
#[derive(Debug, Default)]
pub struct StatusLog {
    entries: Mutex<Vec<WorkflowStatus>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<WorkflowStatus> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn current(&self) -> Option<WorkflowStatus> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.last().cloned())
    }
}

impl StatusReporter for StatusLog {
    fn report(&self, status: &WorkflowStatus) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(status.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_error_mapping() {
        assert_eq!(
            WorkflowStatus::for_ai_error(&AiError::QuotaExceeded("usage-limited-chat".into())),
            None
        );
        assert_eq!(
            WorkflowStatus::for_ai_error(&AiError::BadRequest("400".into()))
                .unwrap()
                .to_string(),
            "AI service error. Please try again or contact support if the issue persists."
        );
        assert_eq!(
            WorkflowStatus::for_ai_error(&AiError::Unavailable(String::new()))
                .unwrap()
                .to_string(),
            "Error: AI analysis service unavailable"
        );
        assert_eq!(
            WorkflowStatus::for_ai_error(&AiError::Unknown("boom".into()))
                .unwrap()
                .to_string(),
            "Error: AI service failed - boom"
        );
        assert_eq!(
            WorkflowStatus::ServiceFailed(" ".into()).to_string(),
            "Error: AI service failed - Unknown error"
        );
    }

    #[test]
    fn test_status_log_keeps_order() {
        let log = StatusLog::new();
        assert_eq!(log.current(), None);
        log.report(&WorkflowStatus::Uploading);
        log.report(&WorkflowStatus::UploadFailed);
        assert_eq!(
            log.history(),
            vec![WorkflowStatus::Uploading, WorkflowStatus::UploadFailed]
        );
        assert!(log.current().unwrap().is_error());
        assert!(!WorkflowStatus::Complete.is_error());
    }
}
