//! MP3 encoder adapters

mod lame;

pub use lame::{LameEncoder, LameEncoderFactory};
