// src/worker/scan.rs
// =============================================================================
// The Worker: the unit of concurrency in a scan.
//
// For every URL it pulls from the queue, a worker:
// 1. Fetches the raw URL
// 2. If it is not a directory:
//    a. tries backup-file variants of it (if the raw fetch looked "found")
//    b. if it has no extension, tries URL.ext for every configured extension,
//       and backup-file variants of each one that looked "found"
// 3. Marks the URL done exactly once
//
// Every single fetch produces exactly one ScanResult.
//
// Rust concepts:
// - Generics: Worker<T: Transport> works with the real or a mock transport
// - tokio::select!: Wait for "next URL" and "stop" at the same time
// - watch channels: A cheap broadcast of the stop flag
// =============================================================================

use super::{PageWorker, WorkerHandle};
use crate::mangle::mangle;
use crate::paths::{split_basename, url_has_extension, url_is_dir};
use crate::queue::{AddFn, DoneFn, SharedSource};
use crate::results::{ResultSink, ScanResult};
use crate::settings::ScanSettings;
use crate::transport::Transport;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

pub struct Worker<T: Transport> {
    // client for connections
    transport: T,
    settings: Arc<ScanSettings>,
    // URLs to scan
    src: SharedSource,
    // queue future work
    adder: AddFn,
    // mark work done
    done: DoneFn,
    results: ResultSink,
    page_worker: Option<Arc<dyn PageWorker>>,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
}

impl<T: Transport + 'static> Worker<T> {
    pub fn new(
        settings: Arc<ScanSettings>,
        transport: T,
        src: SharedSource,
        adder: AddFn,
        done: DoneFn,
        results: ResultSink,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            transport,
            settings,
            src,
            adder,
            done,
            results,
            page_worker: None,
            stop_tx: Arc::new(stop_tx),
            stop_rx,
        }
    }

    pub fn set_page_worker(&mut self, page_worker: Arc<dyn PageWorker>) {
        self.page_worker = Some(page_worker);
    }

    // Pulls URLs until the queue closes or a stop is requested
    //
    // A stop is only noticed between URLs: the URL being handled always
    // finishes, including all of its variants.
    pub async fn run(mut self) {
        loop {
            let next = tokio::select! {
                biased;
                Ok(()) = self.stop_rx.changed() => {
                    debug!("Stop requested, worker exiting");
                    return;
                }
                next = next_url(&self.src) => next,
            };

            match next {
                Some(task) => self.handle_url(task).await,
                None => {
                    debug!("Queue closed, worker exiting");
                    return;
                }
            }
        }
    }

    // Spawns `run` on the tokio runtime
    pub fn run_in_background(self) -> WorkerHandle {
        let stop = Arc::clone(&self.stop_tx);
        let task = tokio::spawn(self.run());
        WorkerHandle::new(stop, task)
    }

    // Handles one URL from the queue, including all of its variants
    pub async fn handle_url(&self, task: Url) {
        debug!(url = %task, "Trying raw URL (unmangled)");
        let with_mangle = self.try_url(&task).await;

        if !url_is_dir(&task) {
            if with_mangle {
                self.try_mangle_url(&task).await;
            }
            if !url_has_extension(&task) {
                for ext in &self.settings.extensions {
                    let mut variant = task.clone();
                    variant.set_path(&format!("{}.{}", task.path(), ext));
                    if self.try_url(&variant).await {
                        self.try_mangle_url(&variant).await;
                    }
                }
            }
        }

        // One dequeued URL is one unit of work, however many fetches it took
        (self.done)(1);
    }

    // Tries every backup-file name for the last path segment of `task`
    //
    // The variants are fetched directly and never mangled or extended
    // themselves.
    pub async fn try_mangle_url(&self, task: &Url) {
        if !self.settings.mangle {
            return;
        }
        let Some((dirname, basename)) = split_basename(task) else {
            return;
        };

        for newname in mangle(basename) {
            let mut variant = task.clone();
            variant.set_path(&format!("{}/{}", dirname, newname));
            self.try_url(&variant).await;
        }
    }

    // Fetches one URL and reports it
    //
    // Returns: true when the status code is a spider code, meaning the
    // caller should go on to try variants of this URL.
    pub async fn try_url(&self, task: &Url) -> bool {
        info!(url = %task, "Trying");

        let keep_going = match self.transport.fetch(task).await {
            Err(err) => {
                debug!(url = %task, error = %err, "Request failed");
                self.emit(ScanResult::failed(task.clone(), err)).await;
                false
            }
            Ok(response) => {
                let keep_going = self.settings.keep_spidering(response.status);

                if url_is_dir(task) && keep_going {
                    debug!(url = %task, "Referring back for spidering");
                    (self.adder)(task.clone());
                }
                if let Some(redirect) = &response.redirect {
                    debug!(url = %task, redirect = %redirect, "Referring redirect back");
                    (self.adder)(redirect.clone());
                }

                let result = ScanResult::fetched(task.clone(), &response);

                // The body is either handed to the page worker or dropped
                // here, which releases the connection either way
                if let Some(page_worker) = &self.page_worker {
                    if page_worker.eligible(&response) {
                        page_worker.handle(task, response.body).await;
                    }
                }

                self.emit(result).await;
                keep_going
            }
        };

        if !self.settings.sleep.is_zero() {
            tokio::time::sleep(self.settings.sleep).await;
        }
        keep_going
    }

    async fn emit(&self, result: ScanResult) {
        if self.results.send(result).await.is_err() {
            warn!("Results channel closed, dropping result");
        }
    }
}

// Waits for the next URL; None once the queue has closed
async fn next_url(src: &SharedSource) -> Option<Url> {
    src.lock().await.recv().await
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `(self.adder)(url)` and not `self.adder(url)`?
//    - `adder` is a field holding a closure, not a method
//    - The parentheses tell Rust "call the value in this field"
//
// 2. What does `biased;` do in tokio::select!?
//    - Normally select! picks a random ready branch
//    - `biased` checks branches top to bottom, so a pending stop always
//      wins over a URL that is also ready
//
// 3. Where is the response body closed?
//    - FetchResponse owns the body; when `response` goes out of scope it is
//      dropped and the connection is released
//    - Moving `response.body` into the page worker hands that job over
//
// 4. Why Arc<ScanSettings>?
//    - Every worker reads the same settings
//    - Arc shares one copy; since nobody can get `&mut` to it, no lock is needed
// -----------------------------------------------------------------------------
