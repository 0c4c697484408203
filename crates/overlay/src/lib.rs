//! Statistics overlay: label/value display rendered to a CPU pixel buffer.
//!
//! The overlay accumulates frame timing, samples the frame rate once per
//! second, and re-rasterizes its labels into an RGBA buffer with an embedded
//! 8x8 bitmap font. A dirty flag tells the render backend when the buffer
//! needs re-uploading to the GPU texture.
//!
//! # Invariants
//! - The frame rate is recomputed exactly once per elapsed second.
//! - The frame counter resets to zero after each recomputation.
//! - Labels draw in deterministic (sorted) order.

pub mod font;
mod stats;

pub use stats::{PixelBuffer, Statistics};
