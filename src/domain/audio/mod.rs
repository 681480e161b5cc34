//! Audio payload domain module

mod blob;
mod format;

pub use blob::{AudioBlob, ContentKind};
pub use format::{StreamFormat, BITS_PER_SAMPLE, BYTES_PER_SAMPLE};
