//! Loads a stored record and resolves everything the review screen shows.
//!
//! Missing records or blobs yield `None` rather than an error. Feedback
//! that fails to decode is treated as not yet available.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::errors::AppError;
use crate::models::file::{PDF_MIME, PNG_MIME};
use crate::models::resume::{record_key, RECORD_PATTERN};
use crate::models::ResumeRecord;
use crate::platform::{Platform, StorageError};
use crate::review::view::FeedbackView;

/// A stored blob resolved to something the client can display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    pub path: String,
    pub url: String,
    pub content_type: &'static str,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub id: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub resume: BlobRef,
    pub image: BlobRef,
    /// `None` renders the loading placeholder.
    pub feedback: Option<FeedbackView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeListItem {
    pub id: String,
    pub company_name: String,
    pub job_title: String,
    pub image_url: String,
    pub overall_score: Option<f64>,
    pub review_path: String,
}

pub fn file_url(path: &str) -> String {
    format!("/api/v1/files/{path}")
}

pub fn content_type_for(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        PDF_MIME
    } else if lower.ends_with(".png") {
        PNG_MIME
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

pub async fn load_record(platform: &Platform, id: &str) -> Result<Option<ResumeRecord>, AppError> {
    let Some(raw) = platform.kv.get(&record_key(id)).await? else {
        debug!("No record stored for {id}");
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!("Record {id} is not readable: {e}");
            Ok(None)
        }
    }
}

async fn resolve_blob(
    platform: &Platform,
    path: &str,
    content_type: &'static str,
) -> Result<Option<BlobRef>, AppError> {
    match platform.fs.stat(path).await {
        Ok(entry) => Ok(Some(BlobRef {
            url: file_url(&entry.path),
            path: entry.path,
            content_type,
            size: entry.size,
        })),
        Err(StorageError::NotFound(_)) => {
            warn!("Blob {path} referenced by a record is missing");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn load_review(platform: &Platform, id: &str) -> Result<Option<ReviewPage>, AppError> {
    let Some(record) = load_record(platform, id).await? else {
        return Ok(None);
    };

    let Some(resume) = resolve_blob(platform, &record.resume_path, PDF_MIME).await? else {
        return Ok(None);
    };
    let Some(image) =
        resolve_blob(platform, &record.image_path, content_type_for(&record.image_path)).await?
    else {
        return Ok(None);
    };

    let feedback = match record.feedback.decode() {
        Ok(feedback) => feedback.as_ref().map(FeedbackView::new),
        Err(e) => {
            error!("Error parsing feedback for {id}: {e}");
            None
        }
    };

    Ok(Some(ReviewPage {
        id: record.id,
        company_name: record.company_name,
        job_title: record.job_title,
        job_description: record.job_description,
        resume,
        image,
        feedback,
    }))
}

/// Every readable stored record, newest first when timestamps are known.
pub async fn list_records(platform: &Platform) -> Result<Vec<ResumeListItem>, AppError> {
    let mut records = Vec::new();
    for key in platform.kv.list(RECORD_PATTERN).await? {
        let Some(raw) = platform.kv.get(&key).await? else {
            continue;
        };
        match serde_json::from_str::<ResumeRecord>(&raw) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unreadable record {key}: {e}"),
        }
    }
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(records
        .into_iter()
        .map(|record| ResumeListItem {
            overall_score: record
                .feedback
                .decode()
                .ok()
                .flatten()
                .map(|f| f.overall_score),
            image_url: file_url(&record.image_path),
            review_path: crate::analysis::workflow::review_path(&record.id),
            id: record.id,
            company_name: record.company_name,
            job_title: record.job_title,
        })
        .collect())
}
