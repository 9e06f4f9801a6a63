//! Storage basenames: `{timestamp_ms}_{stem}`.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Hands out basenames with strictly increasing millisecond prefixes, so two files
/// with the same name never share storage paths.
#[derive(Debug, Default)]
pub struct BasenameAllocator {
    last: AtomicI64,
}

impl BasenameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, stem: &str) -> String {
        self.next_at(Utc::now().timestamp_millis(), stem)
    }

    fn next_at(&self, now_ms: i64, stem: &str) -> String {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_ms.max(last + 1))
            })
            .unwrap_or(now_ms);
        let stamp = now_ms.max(previous + 1);
        format!("{}_{}", stamp, sanitize_stem(stem))
    }
}

/// Keep the stem a single path segment.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '#' | '%' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "image".to_string()
    } else {
        cleaned
    }
}
