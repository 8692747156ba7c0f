//! Shared test fixtures for store/controller/config test modules.

use crate::error::ColorSourceError;
use crate::source::ColorSource;
use crate::theme::Theme;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Theme the scripted source hands out at bootstrap.
pub fn bootstrap_theme() -> Theme {
    Theme::parse("#000000", "#ffffff", "#ff0000").expect("bootstrap fixture")
}

/// Theme a mocked async fetch resolves with.
pub fn mocked_theme() -> Theme {
    Theme::parse("#111111", "#eeeeee", "#00ff00").expect("mocked fixture")
}

type ScriptedReply = Result<Theme, ColorSourceError>;

/// Color source whose async replies are released by the test.
///
/// Each [`ScriptedColorSource::expect_call`] queues one pending reply; the
/// n-th `generate_async` call waits on the n-th queued reply, so tests pick
/// the resolution order independently of the issue order.
#[derive(Debug)]
pub struct ScriptedColorSource {
    initial: Theme,
    calls: AtomicUsize,
    script: Mutex<VecDeque<oneshot::Receiver<ScriptedReply>>>,
}

impl ScriptedColorSource {
    pub fn new(initial: Theme) -> Self {
        Self {
            initial,
            calls: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue the reply for the next async call and return its trigger.
    pub fn expect_call(&self) -> oneshot::Sender<ScriptedReply> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().expect("script lock").push_back(rx);
        tx
    }

    /// Number of async calls started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ColorSource for ScriptedColorSource {
    fn generate(&self) -> Result<Theme, ColorSourceError> {
        Ok(self.initial)
    }

    async fn generate_async(&self) -> Result<Theme, ColorSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ColorSourceError::new("scripted reply dropped"))),
            None => Err(ColorSourceError::new("no scripted reply queued")),
        }
    }

    fn preset(&self, name: &str) -> Option<Theme> {
        (name == "mocked").then(mocked_theme)
    }

    fn preset_names(&self) -> Vec<String> {
        vec!["mocked".to_string()]
    }
}

/// Color source that always fails, including at bootstrap.
#[derive(Debug, Default)]
pub struct FailingColorSource;

#[async_trait]
impl ColorSource for FailingColorSource {
    fn generate(&self) -> Result<Theme, ColorSourceError> {
        Err(ColorSourceError::new("generator unavailable"))
    }
}

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("colorcard-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
