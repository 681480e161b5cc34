//! Recording domain module

mod duration;

pub use duration::{
    Duration, DEFAULT_CHUNK_INTERVAL_MS, DEFAULT_DURATION_SECS, DEFAULT_TIMEOUT_SECS,
};
