//! wgpu render backend for the phantom demo.
//!
//! Renders a vertex-colored demo triangle under a free-fly camera, then
//! composites the statistics overlay as an alpha-blended screen-space quad.
//!
//! # Invariants
//! - The camera direction vector is always unit length.
//! - The overlay texture is only re-uploaded when the CPU buffer changed.
//! - The overlay pass never touches the 3D depth buffer.

mod camera;
mod context;
mod gpu;
mod shaders;

pub use camera::Camera;
pub use context::{Gpu, GpuError};
pub use gpu::WgpuRenderer;
