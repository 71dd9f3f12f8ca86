//! Debounced mirroring of the value set into a location.
//!
//! Every change is sent to a background task which waits for the configured
//! idle delay. A change arriving before the delay elapses re-arms the timer,
//! so only the most recent value set is ever written and there is at most one
//! pending write.
//!
//! The write itself goes through [`LocationWriter`], the single place where
//! state leaves the process. It replaces the previous location rather than
//! appending to a history. Writers may block, so each write runs on the
//! blocking pool and the debounce timer keeps its own worker.

use crate::query::to_query;
use crate::types::MetaConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Idle delay used when nothing else is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination of the serialized query string.
pub trait LocationWriter: Send + 'static {
    fn write_location(&mut self, query: &str) -> Result<(), SyncError>;
}

/// Writes the shareable URL into a file, replacing its previous contents.
pub struct FileLocation {
    path: PathBuf,
    base_url: String,
}

impl FileLocation {
    pub fn new(path: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            path: path.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, query: &str) -> String {
        if query.is_empty() {
            format!("{}/", self.base_url)
        } else {
            format!("{}/?{}", self.base_url, query)
        }
    }

    /// Previously written location, if the file exists.
    pub fn read(path: &Path) -> Result<Option<String>, SyncError> {
        match fs::read_to_string(path) {
            Ok(s) => Ok(Some(s.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl LocationWriter for FileLocation {
    fn write_location(&mut self, query: &str) -> Result<(), SyncError> {
        // Rename over the old file so readers never see a half-written URL.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, format!("{}\n", self.url_for(query)))?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Handle to the debouncing task.
pub struct UrlSynchronizer {
    tx: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl UrlSynchronizer {
    /// Start the task on the current tokio runtime.
    pub fn spawn<W: LocationWriter>(writer: W, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(writer, delay, rx));
        Self { tx, task }
    }

    /// Schedule a write of `values`, cancelling any pending one.
    pub fn notify(&self, values: &MetaConfig) {
        self.notify_query(to_query(values));
    }

    pub fn notify_query(&self, query: String) {
        // The task only stops after `close`, which consumes the handle.
        let _ = self.tx.send(query);
    }

    /// Flush a pending write, if any, and wait for the task to finish.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            warn!(error = %e, "location sync task failed");
        }
    }
}

async fn run<W: LocationWriter>(
    mut writer: W,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(mut latest) = rx.recv().await {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        let closed = loop {
            tokio::select! {
                _ = &mut sleep => break false,
                next = rx.recv() => match next {
                    Some(query) => {
                        latest = query;
                        sleep.as_mut().reset(Instant::now() + delay);
                    }
                    None => break true,
                },
            }
        };

        let written = tokio::task::spawn_blocking(move || {
            let result = writer.write_location(&latest);
            (writer, latest, result)
        })
        .await;
        let (returned, query, result) = match written {
            Ok(done) => done,
            Err(e) => {
                warn!(error = %e, "location writer panicked");
                break;
            }
        };
        writer = returned;
        match result {
            Ok(()) => debug!(%query, "location replaced"),
            Err(e) => warn!(error = %e, "failed to write location"),
        }
        if closed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::from_query;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn writes(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl LocationWriter for Recorder {
        fn write_location(&mut self, query: &str) -> Result<(), SyncError> {
            self.0.lock().unwrap().push(query.to_string());
            Ok(())
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn writes_after_idle_delay() {
        let rec = Recorder::default();
        let sync = UrlSynchronizer::spawn(rec.clone(), DEFAULT_DEBOUNCE);

        sync.notify_query("a=1".into());
        tokio::time::sleep(ms(100)).await;
        assert!(rec.writes().is_empty());

        tokio::time::sleep(ms(100)).await;
        assert_eq!(rec.writes(), vec!["a=1"]);
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn burst_writes_only_latest() {
        let rec = Recorder::default();
        let sync = UrlSynchronizer::spawn(rec.clone(), DEFAULT_DEBOUNCE);

        for q in ["t=H", "t=He", "t=Hel", "t=Hello"] {
            sync.notify_query(q.into());
            tokio::time::sleep(ms(20)).await;
        }
        tokio::time::sleep(ms(500)).await;
        assert_eq!(rec.writes(), vec!["t=Hello"]);
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn new_change_cancels_pending_write() {
        let rec = Recorder::default();
        let sync = UrlSynchronizer::spawn(rec.clone(), DEFAULT_DEBOUNCE);

        sync.notify_query("a".into());
        tokio::time::sleep(ms(100)).await;
        sync.notify_query("b".into());
        tokio::time::sleep(ms(100)).await;
        // 200ms since "a", only 100ms since "b": nothing yet.
        assert!(rec.writes().is_empty());

        tokio::time::sleep(ms(100)).await;
        assert_eq!(rec.writes(), vec!["b"]);
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn separate_pauses_write_separately() {
        let rec = Recorder::default();
        let sync = UrlSynchronizer::spawn(rec.clone(), DEFAULT_DEBOUNCE);

        sync.notify_query("a".into());
        tokio::time::sleep(ms(300)).await;
        sync.notify_query("b".into());
        tokio::time::sleep(ms(300)).await;
        assert_eq!(rec.writes(), vec!["a", "b"]);
        sync.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn close_flushes_pending_write() {
        let rec = Recorder::default();
        let sync = UrlSynchronizer::spawn(rec.clone(), DEFAULT_DEBOUNCE);

        sync.notify(&MetaConfig::default());
        sync.close().await;
        assert_eq!(rec.writes(), vec![to_query(&MetaConfig::default())]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_without_changes_writes_nothing() {
        let rec = Recorder::default();
        let sync = UrlSynchronizer::spawn(rec.clone(), DEFAULT_DEBOUNCE);
        sync.close().await;
        assert!(rec.writes().is_empty());
    }

    #[tokio::test]
    async fn synchronizer_writes_file_location() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.url");
        let sync = UrlSynchronizer::spawn(FileLocation::new(&path, "http://h/"), ms(10));

        sync.notify_query("title=One".into());
        sync.notify_query("title=Two".into());
        sync.close().await;

        let content = FileLocation::read(&path).unwrap().unwrap();
        assert_eq!(content, "http://h/?title=Two");
    }

    #[tokio::test(start_paused = true)]
    async fn failing_writer_keeps_task_alive() {
        struct Flaky {
            calls: Arc<Mutex<u32>>,
        }
        impl LocationWriter for Flaky {
            fn write_location(&mut self, _query: &str) -> Result<(), SyncError> {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                if *calls == 1 {
                    return Err(std::io::Error::other("disk full").into());
                }
                Ok(())
            }
        }

        let calls = Arc::new(Mutex::new(0));
        let sync = UrlSynchronizer::spawn(Flaky { calls: calls.clone() }, DEFAULT_DEBOUNCE);
        sync.notify_query("a".into());
        tokio::time::sleep(ms(300)).await;
        sync.notify_query("b".into());
        sync.close().await;
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn file_location_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.url");
        let mut loc = FileLocation::new(&path, "http://localhost:3000/");

        loc.write_location("title=One").unwrap();
        loc.write_location("title=Two").unwrap();

        let content = FileLocation::read(&path).unwrap().unwrap();
        assert_eq!(content, "http://localhost:3000/?title=Two");
        assert_eq!(from_query(&content, &MetaConfig::default()).title, "Two");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn file_location_read_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(FileLocation::read(&tmp.path().join("missing")).unwrap().is_none());
    }

    #[test]
    fn empty_query_is_bare_base() {
        let loc = FileLocation::new("x", "http://h");
        assert_eq!(loc.url_for(""), "http://h/");
    }
}
