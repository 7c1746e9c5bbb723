// src/queue/mod.rs
// =============================================================================
// This module holds the work queue that feeds the workers.
//
// The queue hands out three things:
// - a shared source that every worker pulls URLs from
// - an "add" function to queue newly discovered URLs
// - a "done" function to mark units of work finished
//
// When every queued URL has been marked done, the source closes and the
// workers shut down on their own.
// =============================================================================

mod work;

pub use work::{parse_wordlist, AddFn, DoneFn, SharedSource, WorkQueue};
