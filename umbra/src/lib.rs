//! Directional shadow mapping renderer with frustum-fitted light cameras.
//!
//! The interesting machinery lives in [`managers`]: a shadow camera that is
//! refitted every frame to tightly enclose the viewing camera's frustum, and
//! the off-screen depth target it renders into. The `umbra-routine` crate
//! turns those pieces into the actual shadow and forward passes.

pub mod managers;
mod renderer;
mod setup;
pub mod util;

pub use renderer::{error::*, Renderer};
pub use setup::*;
/// Reexport of the umbra-types crate.
pub use umbra_types as types;

/// Default per-side resolution of the shadow map texture.
pub const SHADOW_DIMENSIONS: u32 = 4096;

/// Format backing the shadow map. Depth-only so the same texture can be both
/// a render attachment and a comparison-sampled binding.
pub const SHADOW_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Format of the window depth buffer written by the forward pass.
pub const WINDOW_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
