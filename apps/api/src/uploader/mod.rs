#![allow(dead_code)]

//! Resume file selection: a single PDF of at most 20 MB, chosen by drop or
//! picker click.
//!
//! The selector either owns its selection or mirrors a value supplied by
//! its caller. The mode is fixed at construction; a controlled selector
//! never mutates its own value and only notifies.

use serde::Serialize;

use crate::models::file::PDF_MIME;
use crate::models::FileHandle;

pub const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

pub type OnSelect = Box<dyn FnMut(Option<FileHandle>) + Send>;

/// A click as seen by nested handlers. Handlers may stop it from reaching
/// the drop zone underneath.
#[derive(Debug, Default)]
pub struct PointerEvent {
    default_prevented: bool,
    propagation_stopped: bool,
}

impl PointerEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[derive(Debug, Clone)]
enum Selection {
    Internal(Option<FileHandle>),
    Controlled(Option<FileHandle>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    FileInvalidType,
    FileTooLarge,
    TooManyFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

/// What the selected-file row shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    pub name: String,
    pub size: String,
}

pub struct FileSelector {
    selection: Selection,
    on_select: Option<OnSelect>,
    picker_opens: usize,
}

impl FileSelector {
    /// A selector that keeps its own selection.
    pub fn new(on_select: Option<OnSelect>) -> Self {
        Self {
            selection: Selection::Internal(None),
            on_select,
            picker_opens: 0,
        }
    }

    /// A selector whose selection is owned by the caller, `None` included.
    pub fn controlled(value: Option<FileHandle>, on_select: Option<OnSelect>) -> Self {
        Self {
            selection: Selection::Controlled(value),
            on_select,
            picker_opens: 0,
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.selection, Selection::Controlled(_))
    }

    pub fn selected(&self) -> Option<&FileHandle> {
        match &self.selection {
            Selection::Internal(file) | Selection::Controlled(file) => file.as_ref(),
        }
    }

    /// Caller-side update of a controlled value. Ignored in internal mode.
    pub fn set_value(&mut self, value: Option<FileHandle>) {
        if let Selection::Controlled(current) = &mut self.selection {
            *current = value;
        }
    }

    pub fn check(file: &FileHandle) -> Result<(), RejectReason> {
        if file.content_type != PDF_MIME {
            return Err(RejectReason::FileInvalidType);
        }
        if file.size() > MAX_FILE_SIZE {
            return Err(RejectReason::FileTooLarge);
        }
        Ok(())
    }

    /// Handles a drop or picker result. The first accepted file, or none,
    /// becomes the selection and is passed to the callback. Rejected files
    /// are returned and never reach the callback.
    pub fn drop_files(&mut self, files: Vec<FileHandle>) -> Vec<Rejection> {
        let mut rejections = Vec::new();
        let mut accepted = None;

        if files.len() > 1 {
            rejections.extend(files.into_iter().map(|f| Rejection {
                name: f.name,
                reason: RejectReason::TooManyFiles,
            }));
        } else {
            for file in files {
                match Self::check(&file) {
                    Ok(()) => accepted = Some(file),
                    Err(reason) => rejections.push(Rejection {
                        name: file.name,
                        reason,
                    }),
                }
            }
        }

        self.select(accepted);
        rejections
    }

    /// The remove button. Swallows the click so the picker does not open.
    pub fn remove(&mut self, event: &mut PointerEvent) {
        event.prevent_default();
        event.stop_propagation();
        self.select(None);
    }

    /// A click that reached the drop zone. Opens the picker unless a
    /// nested handler stopped it.
    pub fn click(&mut self, event: &PointerEvent) -> bool {
        if event.is_propagation_stopped() {
            return false;
        }
        self.picker_opens += 1;
        true
    }

    pub fn picker_opens(&self) -> usize {
        self.picker_opens
    }

    pub fn summary(&self) -> Option<SelectionSummary> {
        self.selected().map(|file| SelectionSummary {
            name: file.name.clone(),
            size: format_size(file.size()),
        })
    }

    /// Hint shown in the empty drop zone.
    pub fn hint() -> String {
        format!("PDF (max {})", format_size(MAX_FILE_SIZE))
    }

    fn select(&mut self, file: Option<FileHandle>) {
        if let Selection::Internal(current) = &mut self.selection {
            *current = file.clone();
        }
        if let Some(callback) = self.on_select.as_mut() {
            callback(file);
        }
    }
}

/// Human-readable size with up to two decimals: "0 Bytes", "1.5 KB", "20 MB".
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;

    use super::*;
    use crate::models::file::PNG_MIME;

    type Calls = Arc<Mutex<Vec<Option<String>>>>;

    fn recorder() -> (Calls, OnSelect) {
        let calls: Calls = Arc::default();
        let sink = calls.clone();
        let callback: OnSelect = Box::new(move |file: Option<FileHandle>| {
            sink.lock().unwrap().push(file.map(|f| f.name));
        });
        (calls, callback)
    }

    fn pdf(name: &str) -> FileHandle {
        FileHandle::new(name, PDF_MIME, Bytes::from_static(b"%PDF"))
    }

    fn sized_pdf(name: &str, size: usize) -> FileHandle {
        FileHandle::new(name, PDF_MIME, Bytes::from(vec![0u8; size]))
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(MAX_FILE_SIZE), "20 MB");
        assert_eq!(format_size(1_234_567), "1.18 MB");
        assert_eq!(FileSelector::hint(), "PDF (max 20 MB)");
    }

    #[test]
    fn test_accepts_pdf_and_notifies() {
        let (calls, callback) = recorder();
        let mut selector = FileSelector::new(Some(callback));
        let rejected = selector.drop_files(vec![pdf("cv.pdf")]);
        assert!(rejected.is_empty());
        assert_eq!(selector.selected().map(|f| f.name.as_str()), Some("cv.pdf"));
        assert_eq!(*calls.lock().unwrap(), vec![Some("cv.pdf".to_string())]);
        assert_eq!(
            selector.summary(),
            Some(SelectionSummary {
                name: "cv.pdf".to_string(),
                size: "4 Bytes".to_string()
            })
        );
    }

    #[test]
    fn test_rejected_files_never_reach_callback() {
        let (calls, callback) = recorder();
        let mut selector = FileSelector::new(Some(callback));

        let image = FileHandle::new("photo.png", PNG_MIME, Bytes::from_static(b"png"));
        let rejected = selector.drop_files(vec![image]);
        assert_eq!(rejected[0].reason, RejectReason::FileInvalidType);

        let rejected = selector.drop_files(vec![sized_pdf("huge.pdf", MAX_FILE_SIZE as usize + 1)]);
        assert_eq!(rejected[0].reason, RejectReason::FileTooLarge);

        let rejected = selector.drop_files(vec![pdf("a.pdf"), pdf("b.pdf")]);
        assert!(rejected.iter().all(|r| r.reason == RejectReason::TooManyFiles));

        assert!(calls.lock().unwrap().iter().all(|c| c.is_none()));
        assert!(selector.selected().is_none());
    }

    #[test]
    fn test_exactly_max_size_is_accepted() {
        let mut selector = FileSelector::new(None);
        let rejected = selector.drop_files(vec![sized_pdf("edge.pdf", MAX_FILE_SIZE as usize)]);
        assert!(rejected.is_empty());
        assert!(selector.selected().is_some());
    }

    #[test]
    fn test_remove_clears_and_does_not_open_picker() {
        let (calls, callback) = recorder();
        let mut selector = FileSelector::new(Some(callback));
        selector.drop_files(vec![pdf("cv.pdf")]);

        let mut event = PointerEvent::new();
        selector.remove(&mut event);
        let opened = selector.click(&event);

        assert!(!opened);
        assert_eq!(selector.picker_opens(), 0);
        assert!(event.is_default_prevented());
        assert!(selector.selected().is_none());
        assert_eq!(calls.lock().unwrap().last(), Some(&None));
    }

    #[test]
    fn test_plain_click_opens_picker() {
        let mut selector = FileSelector::new(None);
        assert!(selector.click(&PointerEvent::new()));
        assert_eq!(selector.picker_opens(), 1);
    }

    #[test]
    fn test_controlled_selector_never_diverges() {
        let (calls, callback) = recorder();
        let mut selector = FileSelector::controlled(None, Some(callback));
        assert!(selector.is_controlled());

        selector.drop_files(vec![pdf("cv.pdf")]);
        assert!(selector.selected().is_none());
        assert_eq!(*calls.lock().unwrap(), vec![Some("cv.pdf".to_string())]);

        selector.set_value(Some(pdf("parent.pdf")));
        let mut event = PointerEvent::new();
        selector.remove(&mut event);
        assert_eq!(selector.selected().map(|f| f.name.as_str()), Some("parent.pdf"));
        assert_eq!(calls.lock().unwrap().last(), Some(&None));
    }

    #[test]
    fn test_internal_selector_ignores_set_value() {
        let mut selector = FileSelector::new(None);
        selector.set_value(Some(pdf("x.pdf")));
        assert!(selector.selected().is_none());
    }
}
