use bytes::Bytes;

pub const PDF_MIME: &str = "application/pdf";
pub const PNG_MIME: &str = "image/png";

/// An in-memory file on its way through selection and upload.
#[derive(Clone)]
pub struct FileHandle {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_strips_last_extension() {
        let file = FileHandle::new("jane.doe.pdf", PDF_MIME, Bytes::new());
        assert_eq!(file.stem(), "jane.doe");
        let hidden = FileHandle::new(".pdf", PDF_MIME, Bytes::new());
        assert_eq!(hidden.stem(), ".pdf");
    }
}
