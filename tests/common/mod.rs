#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cmdchain::output::{BufferedSink, OutputSink};

pub use cmdchain_test_utils::{init_tracing, with_timeout};

/// A buffered sink plus the trait-object handle a handler wants.
pub fn buffered_sink() -> (BufferedSink, Arc<dyn OutputSink>) {
    let sink = BufferedSink::new();
    let handle: Arc<dyn OutputSink> = Arc::new(sink.clone());
    (sink, handle)
}

/// Write a small shell script into `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("writing test script");
    path
}
