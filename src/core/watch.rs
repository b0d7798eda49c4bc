//! Live refresh: filtered file-system events, debounced into refresh signals.
//!
//! The watcher owns one pending deadline. Every relevant event pushes the
//! deadline out by the debounce delay; the refresh callback fires once the
//! deadline passes with no further events. `start` on a new root stops the
//! previous watch first.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::event::ModifyKind;
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, trace, warn};

use crate::error::{TlogError, TlogResult};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "ts", "jsx", "tsx", "vue", "py", "java", "c", "cpp", "cs", "php", "rb", "go", "rs",
    "swift", "kt", "dart",
];

pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".vscode",
    "dist",
    "build",
    "out",
    "coverage",
    ".next",
    ".nuxt",
    ".cache",
    "tmp",
    "temp",
];

/// Longest wait between checks of the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Decides which paths may trigger a rescan.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    excluded_dirs: Vec<String>,
    extensions: GlobSet,
}

impl WatchFilter {
    pub fn new(excluded_dirs: &[String], extensions: &[String]) -> TlogResult<Self> {
        let pattern = format!("**/*.{{{}}}", extensions.join(","));
        let glob = Glob::new(&pattern)
            .map_err(|e| TlogError::Config(format!("watch.extensions: {e}")))?;
        let extensions = GlobSetBuilder::new()
            .add(glob)
            .build()
            .map_err(|e| TlogError::Config(format!("watch.extensions: {e}")))?;

        Ok(Self { excluded_dirs: excluded_dirs.to_vec(), extensions })
    }

    /// True if any `/`- or `\`-separated segment equals an excluded name.
    /// Matching is exact and case-sensitive.
    pub fn is_excluded(&self, path: &str) -> bool {
        path.split(['/', '\\'])
            .any(|seg| self.excluded_dirs.iter().any(|d| d == seg))
    }

    pub fn has_watched_extension(&self, path: &str) -> bool {
        self.extensions.is_match(path)
    }

    pub fn accepts(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.has_watched_extension(&text) && !self.is_excluded(&text)
    }

    /// Relevant kind and at least one accepted path.
    pub fn accepts_event(&self, event: &Event) -> bool {
        is_relevant_kind(&event.kind) && event.paths.iter().any(|p| self.accepts(p))
    }
}

impl Default for WatchFilter {
    fn default() -> Self {
        let excluded: Vec<String> = DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect();
        let extensions: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
        Self::new(&excluded, &extensions).unwrap_or_else(|_| Self {
            excluded_dirs: excluded.clone(),
            extensions: GlobSet::empty(),
        })
    }
}

/// Saves, creations, deletions and renames. Metadata-only changes are ignored.
pub fn is_relevant_kind(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any) => true,
        _ => false,
    }
}

/// Single pending deadline, reset on every poke.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Restart the countdown from `now`.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Time left before the pending deadline, if one is set.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Clears and returns `true` once the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

struct ActiveWatch {
    root: PathBuf,
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
}

/// Recursive watcher over one workspace root.
pub struct FileWatcher {
    filter: WatchFilter,
    debouncer: Debouncer,
    active: Option<ActiveWatch>,
}

impl FileWatcher {
    pub fn new(filter: WatchFilter, delay: Duration) -> Self {
        Self { filter, debouncer: Debouncer::new(delay), active: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.root.as_path())
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Watch `root`, replacing any earlier watch.
    pub fn start(&mut self, root: &Path) -> TlogResult<()> {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            NotifyConfig::default(),
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        info!(root = %root.display(), "watching for changes");
        self.active = Some(ActiveWatch { root: root.to_path_buf(), _watcher: watcher, events: rx });
        Ok(())
    }

    /// Drop the OS watch and any pending refresh.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(root = %active.root.display(), "watch stopped");
        }
        self.debouncer.cancel();
    }

    /// Feed one event; returns whether it restarted the countdown.
    pub fn observe(&mut self, event: &Event, now: Instant) -> bool {
        if !self.filter.accepts_event(event) {
            trace!(kind = ?event.kind, paths = ?event.paths, "ignored event");
            return false;
        }
        self.debouncer.poke(now);
        true
    }

    /// Pump events on the current thread until `stop` is set or the watch
    /// ends, calling `on_refresh` once per debounced burst.
    pub fn run<F: FnMut()>(&mut self, stop: &AtomicBool, mut on_refresh: F) -> TlogResult<()> {
        while !stop.load(Ordering::Relaxed) {
            let wait = self
                .debouncer
                .time_until(Instant::now())
                .map_or(POLL_INTERVAL, |left| left.min(POLL_INTERVAL));

            let received = match &self.active {
                Some(active) => active.events.recv_timeout(wait),
                None => break,
            };

            match received {
                Ok(Ok(event)) => {
                    self.observe(&event, Instant::now());
                }
                Ok(Err(e)) => warn!(error = %e, "watch error"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if self.debouncer.fire_if_due(Instant::now()) {
                debug!("debounced refresh");
                on_refresh();
            }
        }
        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
