// src/worker/mod.rs
// =============================================================================
// This module contains the workers that do the actual fetching.
//
// Submodules:
// - scan: The Worker itself: pulls URLs, fetches them, tries variants
// - html: A PageWorker that pulls more URLs out of HTML responses
// - pool: Starts N workers and hands back handles to stop them
//
// Data flow:
//   WorkQueue -> Worker -> Transport -> Worker decides ->
//     { WorkQueue (new URLs), results channel, PageWorker (body) }
// =============================================================================

mod html;
mod pool;
mod scan;

use crate::transport::{FetchResponse, ResponseBody};
use async_trait::async_trait;
use url::Url;

pub use html::HtmlWorker;
pub use pool::{start_workers, stop_all, wait_all, WorkerHandle};
pub use scan::Worker;

// Optional extra processing of a response body
//
// A worker may carry zero or one PageWorker. The worker never reads bodies
// itself; when `eligible` says yes, the body is handed over.
#[async_trait]
pub trait PageWorker: Send + Sync {
    /// Whether this response is worth handing to `handle`
    fn eligible(&self, response: &FetchResponse) -> bool;

    /// Consumes the body of a response for `url`
    async fn handle(&self, url: &Url, body: ResponseBody);
}

#[cfg(test)]
pub(crate) mod testing {
    // In-memory transport for driving workers in tests.
    //
    // Paths are looked up in a route table; anything unknown is a 404.
    // Every requested URL is recorded in order.

    use crate::transport::{FetchResponse, Transport, TransportError, TransportFactory};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use url::Url;

    #[derive(Debug, Clone)]
    pub enum MockReply {
        Status(u16),
        Redirect(u16, &'static str),
        Html(&'static str),
        Fail(TransportError),
    }

    #[derive(Clone, Default)]
    pub struct MockTransport {
        routes: Arc<HashMap<String, MockReply>>,
        pub requests: Arc<Mutex<Vec<Url>>>,
    }

    impl MockTransport {
        pub fn new(routes: &[(&str, MockReply)]) -> Self {
            Self {
                routes: Arc::new(
                    routes
                        .iter()
                        .map(|(path, reply)| (path.to_string(), reply.clone()))
                        .collect(),
                ),
                requests: Arc::default(),
            }
        }

        pub fn requested_paths(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|u| u.path().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn fetch(&self, url: &Url) -> Result<FetchResponse, TransportError> {
            self.requests.lock().unwrap().push(url.clone());

            match self.routes.get(url.path()).cloned() {
                Some(MockReply::Status(code)) => Ok(FetchResponse::buffered(code, "")),
                Some(MockReply::Redirect(code, target)) => {
                    let target = url.join(target).unwrap();
                    Ok(FetchResponse::buffered(code, "").with_redirect(target))
                }
                Some(MockReply::Html(body)) => {
                    Ok(FetchResponse::buffered(200, body).with_content_type("text/html"))
                }
                Some(MockReply::Fail(err)) => Err(err),
                None => Ok(FetchResponse::buffered(404, "not found")),
            }
        }
    }

    // Every built transport shares the same routes and request log
    pub struct MockFactory(pub MockTransport);

    impl TransportFactory for MockFactory {
        type Transport = MockTransport;

        fn build(&self) -> Result<MockTransport, TransportError> {
            Ok(self.0.clone())
        }
    }
}
