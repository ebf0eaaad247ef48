/// Process-wide change stamps for memoized resolution.
///
/// Every construction and mutation of a renderable set or registry draws a
/// fresh stamp, so two distinct inputs never share one.
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_never_repeat() {
        let first = next_stamp();
        let second = next_stamp();
        assert!(second > first);
    }
}
