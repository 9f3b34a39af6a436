use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

// handle the UI thread uses to refer to a buffer living in the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u64);

impl SampleId {
    pub fn next() -> Self {
        SampleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}
