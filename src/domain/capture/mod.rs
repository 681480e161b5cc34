//! Capture domain module

mod accumulator;
mod lifecycle;

pub use accumulator::ChunkAccumulator;
pub use lifecycle::{CaptureLifecycle, CaptureState, InvalidStateTransition};
