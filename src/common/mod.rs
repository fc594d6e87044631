//! Helpers shared by the binary codecs.

pub mod binary;

pub use binary::BinaryError;
