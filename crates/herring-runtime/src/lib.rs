//! Shared runtime pieces for the herring drivers.
//!
//! The control surfaces run on dedicated OS threads ([`thread_actor`]); the
//! process-wide tokio runtime lets plain threads wait on async replies.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};

pub mod thread_actor;

fn runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("herring-runtime")
            .build()
            .expect("failed to build shared tokio runtime")
    })
}

/// Drives `future` to completion from a plain (non-async) thread.
///
/// Must not be called from inside a tokio worker.
pub fn block_on<F: Future>(future: F) -> F::Output {
    runtime().block_on(future)
}
