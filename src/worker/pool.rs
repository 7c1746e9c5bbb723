// src/worker/pool.rs
// =============================================================================
// Starts a batch of workers and keeps handles to them.
//
// Every worker gets:
// - its own Transport from the factory (never shared between workers)
// - the same queue source, add and done functions
// - a clone of the results sender
// - an HtmlWorker, when HTML parsing is switched on
//
// The number of workers is also the maximum number of requests in flight.
// =============================================================================

use super::{HtmlWorker, PageWorker, Worker};
use crate::queue::{AddFn, DoneFn, SharedSource};
use crate::results::ResultSink;
use crate::settings::ScanSettings;
use crate::transport::{TransportError, TransportFactory};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

// A running worker
pub struct WorkerHandle {
    stop: Arc<watch::Sender<bool>>,
    // None once the task has been awaited to completion
    task: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub(super) fn new(stop: Arc<watch::Sender<bool>>, task: JoinHandle<()>) -> Self {
        Self {
            stop,
            task: Some(task),
        }
    }

    /// Asks the worker to exit after the URL it is currently handling
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Waits for the worker task to exit
    ///
    /// Safe to cancel and call again; returns at once after the first
    /// completed wait.
    pub async fn wait(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        let outcome = task.await;
        self.task = None;
        if let Err(e) = outcome {
            warn!(error = %e, "Worker task ended abnormally");
        }
    }
}

// Starts `settings.workers` workers, all pulling from `src`
//
// Returns: one handle per worker, or the error from building a transport
pub fn start_workers<F: TransportFactory>(
    settings: Arc<ScanSettings>,
    factory: &F,
    src: SharedSource,
    adder: AddFn,
    done: DoneFn,
    results: ResultSink,
) -> Result<Vec<WorkerHandle>, TransportError> {
    let count = settings.workers;

    // Build every transport before starting anything, so a failure leaves
    // no half-started pool behind
    let transports = (0..count)
        .map(|_| factory.build())
        .collect::<Result<Vec<_>, _>>()?;

    let page_worker: Option<Arc<dyn PageWorker>> = if settings.parse_html {
        Some(Arc::new(HtmlWorker::new(Arc::clone(&adder))))
    } else {
        None
    };

    let handles = transports
        .into_iter()
        .map(|transport| {
            let mut worker = Worker::new(
                Arc::clone(&settings),
                transport,
                Arc::clone(&src),
                Arc::clone(&adder),
                Arc::clone(&done),
                results.clone(),
            );
            if let Some(page_worker) = &page_worker {
                worker.set_page_worker(Arc::clone(page_worker));
            }
            worker.run_in_background()
        })
        .collect();

    info!(workers = count, parse_html = settings.parse_html, "Workers started");
    Ok(handles)
}

/// Requests a stop on every worker
pub fn stop_all(handles: &[WorkerHandle]) {
    for handle in handles {
        handle.stop();
    }
}

/// Waits until every worker has exited
pub async fn wait_all(handles: &mut [WorkerHandle]) {
    join_all(handles.iter_mut().map(|handle| handle.wait())).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::WorkQueue;
    use crate::results::ScanResult;
    use crate::worker::testing::{MockFactory, MockReply, MockTransport};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use url::Url;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn collect(rx: &mut mpsc::Receiver<ScanResult>) -> Vec<String> {
        let mut paths = Vec::new();
        while let Ok(result) = rx.try_recv() {
            paths.push(result.url.path().to_string());
        }
        paths.sort();
        paths
    }

    #[tokio::test]
    async fn test_pool_drains_queue_and_exits() {
        let transport = MockTransport::new(&[
            ("/", MockReply::Status(200)),
            ("/admin", MockReply::Status(200)),
        ]);
        let settings = Arc::new(ScanSettings {
            workers: 3,
            ..ScanSettings::default()
        });
        let queue = WorkQueue::new(&[url("http://x/")], vec!["admin".to_string()]);
        let (tx, mut rx) = mpsc::channel(64);

        let mut handles = start_workers(
            settings,
            &MockFactory(transport.clone()),
            queue.source(),
            queue.adder(),
            queue.doner(),
            tx,
        )
        .unwrap();
        assert_eq!(handles.len(), 3);

        tokio::time::timeout(Duration::from_secs(5), wait_all(&mut handles))
            .await
            .expect("workers should exit once the queue drains");

        assert_eq!(
            collect(&mut rx),
            vec!["/", "/.admin.swp", "/admin", "/admin.bak", "/admin.orig", "/admin~"]
        );
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_pool_attaches_html_worker() {
        let transport = MockTransport::new(&[
            ("/", MockReply::Html(r#"<a href="/linked">x</a><a href="http://other/">y</a>"#)),
            ("/linked", MockReply::Status(200)),
        ]);
        let settings = Arc::new(ScanSettings {
            workers: 2,
            mangle: false,
            parse_html: true,
            ..ScanSettings::default()
        });
        let queue = WorkQueue::new(&[url("http://x/")], vec![]);
        let (tx, mut rx) = mpsc::channel(64);

        let mut handles = start_workers(
            settings,
            &MockFactory(transport),
            queue.source(),
            queue.adder(),
            queue.doner(),
            tx,
        )
        .unwrap();
        tokio::time::timeout(Duration::from_secs(5), wait_all(&mut handles))
            .await
            .unwrap();

        assert_eq!(collect(&mut rx), vec!["/", "/linked"]);
    }

    #[tokio::test]
    async fn test_stop_ends_idle_workers() {
        // Keep the sender alive so the source never closes on its own
        let (_keep_open, receiver) = mpsc::unbounded_channel::<Url>();
        let src: SharedSource = Arc::new(tokio::sync::Mutex::new(receiver));
        let (tx, _rx) = mpsc::channel(8);

        let mut handles = start_workers(
            Arc::new(ScanSettings {
                workers: 4,
                ..ScanSettings::default()
            }),
            &MockFactory(MockTransport::default()),
            src,
            Arc::new(|_: Url| {}),
            Arc::new(|_: usize| {}),
            tx,
        )
        .unwrap();

        stop_all(&handles);

        tokio::time::timeout(Duration::from_secs(5), wait_all(&mut handles))
            .await
            .expect("stopped workers should exit");
    }

    #[tokio::test]
    async fn test_stop_lets_current_url_finish() {
        let transport = MockTransport::new(&[("/admin", MockReply::Status(200))]);
        let settings = Arc::new(ScanSettings {
            workers: 1,
            sleep: Duration::from_millis(30),
            ..ScanSettings::default()
        });
        let queue = WorkQueue::new(&[url("http://x/admin"), url("http://x/other")], vec![]);
        let (tx, mut rx) = mpsc::channel(64);

        let mut handles = start_workers(
            settings,
            &MockFactory(transport.clone()),
            queue.source(),
            queue.adder(),
            queue.doner(),
            tx,
        )
        .unwrap();

        // Lands while /admin is still working through its backup names
        tokio::time::sleep(Duration::from_millis(40)).await;
        stop_all(&handles);

        tokio::time::timeout(Duration::from_secs(5), wait_all(&mut handles))
            .await
            .expect("stopped worker should exit");

        assert_eq!(
            collect(&mut rx),
            vec!["/.admin.swp", "/admin", "/admin.bak", "/admin.orig", "/admin~"]
        );
        assert_eq!(queue.pending(), 1);
        assert!(!transport.requested_paths().contains(&"/other".to_string()));
    }

    #[tokio::test]
    async fn test_wait_all_resumes_after_cancel() {
        let (_keep_open, receiver) = mpsc::unbounded_channel::<Url>();
        let src: SharedSource = Arc::new(tokio::sync::Mutex::new(receiver));
        let (tx, _rx) = mpsc::channel(8);

        let mut handles = start_workers(
            Arc::new(ScanSettings {
                workers: 2,
                ..ScanSettings::default()
            }),
            &MockFactory(MockTransport::default()),
            src,
            Arc::new(|_: Url| {}),
            Arc::new(|_: usize| {}),
            tx,
        )
        .unwrap();

        // Workers are idle on an open source, so this gives up
        let gave_up = tokio::time::timeout(Duration::from_millis(20), wait_all(&mut handles)).await;
        assert!(gave_up.is_err());

        stop_all(&handles);
        tokio::time::timeout(Duration::from_secs(5), wait_all(&mut handles))
            .await
            .expect("stopped workers should exit");

        // Already joined: returns straight away
        wait_all(&mut handles).await;
    }

    #[tokio::test]
    async fn test_factory_error_starts_nothing() {
        struct Broken;
        impl TransportFactory for Broken {
            type Transport = MockTransport;
            fn build(&self) -> Result<MockTransport, TransportError> {
                Err(TransportError::Build {
                    message: "no TLS backend".to_string(),
                })
            }
        }

        let queue = WorkQueue::new(&[url("http://x/")], vec![]);
        let (tx, _rx) = mpsc::channel(8);

        let result = start_workers(
            Arc::new(ScanSettings::default()),
            &Broken,
            queue.source(),
            queue.adder(),
            queue.doner(),
            tx,
        );

        assert!(matches!(result, Err(TransportError::Build { .. })));
    }
}
