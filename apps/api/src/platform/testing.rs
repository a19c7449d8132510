//! Fakes for the platform collaborators, shared by the test modules.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use super::*;
use crate::llm_client::{AiError, ChatResponse, MessageContent};
use crate::models::file::{PDF_MIME, PNG_MIME};
use crate::models::resume::RECORD_PATTERN;
use crate::models::FileHandle;

pub struct SequenceIds(AtomicUsize);

impl SequenceIds {
    pub fn new() -> Self {
        Self(AtomicUsize::new(0))
    }
}

impl IdGenerator for SequenceIds {
    fn generate(&self) -> String {
        format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Returns a fixed reply and remembers what the store held at call time.
pub struct ScriptedAi {
    reply: Result<ChatResponse, AiError>,
    kv: Arc<dyn KvStore>,
    pub calls: Mutex<Vec<(String, String)>>,
    pub records_at_call: Mutex<Vec<String>>,
}

#[async_trait]
impl FeedbackService for ScriptedAi {
    async fn feedback(&self, path: &str, instructions: &str) -> Result<ChatResponse, AiError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), instructions.to_string()));
        for key in self.kv.list(RECORD_PATTERN).await.unwrap() {
            if let Some(value) = self.kv.get(&key).await.unwrap() {
                self.records_at_call.lock().unwrap().push(value);
            }
        }
        self.reply.clone()
    }
}

pub struct FakeRaster {
    pub fail: bool,
}

#[async_trait]
impl PdfRasterizer for FakeRaster {
    async fn rasterize(&self, pdf: &FileHandle) -> Result<FileHandle, RasterError> {
        if self.fail {
            return Err(RasterError::Failed("corrupt pdf".to_string()));
        }
        Ok(FileHandle::new(
            format!("{}.png", pdf.stem()),
            PNG_MIME,
            Bytes::from_static(b"\x89PNG"),
        ))
    }
}

/// Memory storage with injectable failures.
#[derive(Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    pub fail_uploads_after: Option<usize>,
    pub fail_delete_of: Mutex<HashSet<String>>,
    pub fail_read_dir: bool,
    pub uploads: AtomicUsize,
    pub reads: AtomicUsize,
    pub deletes_attempted: Mutex<Vec<String>>,
}

#[async_trait]
impl FileStorage for FlakyStorage {
    async fn upload(&self, file: &FileHandle) -> Result<StoredFile, StorageError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads_after.is_some_and(|limit| n >= limit) {
            return Err(StorageError::Backend("quota full".to_string()));
        }
        self.inner.upload(file).await
    }

    async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path).await
    }

    async fn stat(&self, path: &str) -> Result<DirEntry, StorageError> {
        self.inner.stat(path).await
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.deletes_attempted.lock().unwrap().push(path.to_string());
        if self.fail_delete_of.lock().unwrap().contains(path) {
            return Err(StorageError::Backend("locked".to_string()));
        }
        self.inner.delete(path).await
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StorageError> {
        if self.fail_read_dir {
            return Err(StorageError::Backend("listing unavailable".to_string()));
        }
        self.inner.read_dir(path).await
    }
}

/// Memory key-value store whose writes start failing after a number of calls.
#[derive(Default)]
pub struct FlakyKv {
    pub inner: MemoryKv,
    pub fail_sets_after: Option<usize>,
    pub sets: AtomicUsize,
}

#[async_trait]
impl KvStore for FlakyKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let n = self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets_after.is_some_and(|limit| n >= limit) {
            return Err(KvError::Backend("READONLY replica".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn list(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        self.inner.list(pattern).await
    }

    async fn flush(&self) -> Result<(), KvError> {
        self.inner.flush().await
    }
}

pub struct TestPlatform {
    pub platform: Platform,
    pub fs: Arc<FlakyStorage>,
    pub kv: Arc<FlakyKv>,
    pub ai: Arc<ScriptedAi>,
}

pub struct TestPlatformBuilder {
    reply: Result<ChatResponse, AiError>,
    storage: FlakyStorage,
    kv: FlakyKv,
    raster_fails: bool,
    tokens: Vec<String>,
}

impl TestPlatformBuilder {
    pub fn reply_text(mut self, text: &str) -> Self {
        self.reply = Ok(ChatResponse::assistant(MessageContent::Text(text.to_string())));
        self
    }

    pub fn reply(mut self, reply: Result<ChatResponse, AiError>) -> Self {
        self.reply = reply;
        self
    }

    pub fn storage(mut self, storage: FlakyStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn kv(mut self, kv: FlakyKv) -> Self {
        self.kv = kv;
        self
    }

    pub fn raster_fails(mut self) -> Self {
        self.raster_fails = true;
        self
    }

    pub fn tokens(mut self, tokens: &[&str]) -> Self {
        self.tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn build(self) -> TestPlatform {
        let fs = Arc::new(self.storage);
        let kv = Arc::new(self.kv);
        let ai = Arc::new(ScriptedAi {
            reply: self.reply,
            kv: kv.clone(),
            calls: Mutex::new(Vec::new()),
            records_at_call: Mutex::new(Vec::new()),
        });
        let platform = Platform {
            auth: Arc::new(TokenAuth::new(&self.tokens)),
            fs: fs.clone(),
            kv: kv.clone(),
            ai: ai.clone(),
            raster: Arc::new(FakeRaster {
                fail: self.raster_fails,
            }),
            ids: Arc::new(SequenceIds::new()),
        };
        TestPlatform {
            platform,
            fs,
            kv,
            ai,
        }
    }
}

pub fn test_platform() -> TestPlatformBuilder {
    TestPlatformBuilder {
        reply: Err(AiError::Unavailable("no reply scripted".to_string())),
        storage: FlakyStorage::default(),
        kv: FlakyKv::default(),
        raster_fails: false,
        tokens: Vec::new(),
    }
}

pub fn pdf(name: &str) -> FileHandle {
    FileHandle::new(name, PDF_MIME, Bytes::from_static(b"%PDF-1.7 test resume"))
}
