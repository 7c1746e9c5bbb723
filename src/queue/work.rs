// src/queue/work.rs
// =============================================================================
// A deduplicating, completion-counting work queue.
//
// How it works:
// 1. Seeds are queued up front; `pending` counts queued-but-not-done URLs
// 2. Workers pull from one shared receiver (guarded by an async Mutex)
// 3. New URLs are added through `AddFn`; each URL is only ever queued once
// 4. Workers call `DoneFn(1)` per URL; at zero pending the sender is dropped
//    and every worker's `recv()` returns None
//
// Directory expansion:
// - A worker "refers back" a directory it found (200 on /admin/)
// - The URL was already seen, so instead of re-queueing it we queue
//   /admin/<word> for every wordlist entry, once per directory
//
// Rust concepts:
// - Arc<Mutex<..>>: Shared, mutable state between many tasks
// - Trait objects: `Arc<dyn Fn(Url)>` lets callers pass plain closures
// - Dropping a Sender closes the channel for all receivers
// =============================================================================

use crate::paths::url_is_dir;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, trace};
use url::Url;

/// Queues a URL for scanning
pub type AddFn = Arc<dyn Fn(Url) + Send + Sync>;
/// Marks N units of work finished
pub type DoneFn = Arc<dyn Fn(usize) + Send + Sync>;
/// The receiving end every worker pulls from
pub type SharedSource = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Url>>>;

struct QueueState {
    // None once all work is done
    sender: Option<mpsc::UnboundedSender<Url>>,
    seen: HashSet<Url>,
    expanded: HashSet<Url>,
    pending: usize,
    scope: HashSet<String>,
    words: Vec<String>,
}

impl QueueState {
    fn add(&mut self, mut url: Url) {
        url.set_fragment(None);

        let in_scope = url
            .host_str()
            .map(|host| self.scope.contains(host))
            .unwrap_or(false);
        if !in_scope {
            trace!(%url, "Out of scope, dropping");
            return;
        }

        if !self.seen.contains(&url) {
            self.enqueue(url);
            return;
        }

        // Already scanned; a directory coming back means "expand me"
        if url_is_dir(&url) && !self.words.is_empty() && self.expanded.insert(url.clone()) {
            debug!(%url, words = self.words.len(), "Expanding directory");
            let children: Vec<Url> = self
                .words
                .iter()
                .filter_map(|word| url.join(word.trim_start_matches('/')).ok())
                .collect();
            for child in children {
                self.enqueue(child);
            }
        }
    }

    fn enqueue(&mut self, url: Url) {
        if !self.seen.insert(url.clone()) {
            return;
        }
        if let Some(sender) = &self.sender {
            if sender.send(url).is_ok() {
                self.pending += 1;
            }
        }
    }

    fn done(&mut self, n: usize) {
        self.pending = self.pending.saturating_sub(n);
        if self.pending == 0 && self.sender.take().is_some() {
            debug!("All work done, closing queue");
        }
    }
}

pub struct WorkQueue {
    state: Arc<Mutex<QueueState>>,
    source: SharedSource,
}

impl WorkQueue {
    // Creates a queue holding `seeds`
    //
    // Parameters:
    //   seeds: starting URLs; their hosts define the scan scope
    //   words: names to try inside every directory that is referred back
    pub fn new(seeds: &[Url], words: Vec<String>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut state = QueueState {
            sender: Some(sender),
            seen: HashSet::new(),
            expanded: HashSet::new(),
            pending: 0,
            scope: seeds
                .iter()
                .filter_map(|u| u.host_str().map(str::to_string))
                .collect(),
            words,
        };
        for seed in seeds {
            state.add(seed.clone());
        }
        // Nothing to do at all: close right away
        if state.pending == 0 {
            state.sender = None;
        }

        Self {
            state: Arc::new(Mutex::new(state)),
            source: Arc::new(tokio::sync::Mutex::new(receiver)),
        }
    }

    pub fn source(&self) -> SharedSource {
        Arc::clone(&self.source)
    }

    pub fn adder(&self) -> AddFn {
        let state = Arc::clone(&self.state);
        Arc::new(move |url: Url| lock(&state).add(url))
    }

    pub fn doner(&self) -> DoneFn {
        let state = Arc::clone(&self.state);
        Arc::new(move |n: usize| lock(&state).done(n))
    }

    /// URLs queued but not yet marked done
    pub fn pending(&self) -> usize {
        lock(&self.state).pending
    }

    /// Distinct URLs ever queued
    pub fn seen(&self) -> usize {
        lock(&self.state).seen.len()
    }
}

// Poisoned locks are recovered: every QueueState update is a single step.
fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Parses wordlist text: one word per line, blank lines and #comments skipped
pub fn parse_wordlist(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Two kinds of Mutex?
//    - std::sync::Mutex guards QueueState; it is only held for a few
//      instructions and never across an .await
//    - tokio::sync::Mutex guards the receiver, because a worker holds it
//      while awaiting the next URL
//
// 2. How does the scan end?
//    - Each URL adds 1 to `pending` when queued and subtracts 1 when done
//    - New URLs are always added before the URL that found them is done,
//      so `pending` only reaches 0 when there is truly nothing left
// -----------------------------------------------------------------------------
