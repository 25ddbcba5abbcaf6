//! Render routines for the umbra rendering library.
//!
//! [`depth::DepthRoutine`] renders the scene into the shadow map from the
//! light's fitted camera, [`forward::ForwardRoutine`] renders it again to the
//! backbuffer while sampling that map, and [`base::BaseRenderRoutine`] strings
//! the two passes together behind a verifiable [`schedule::FrameSchedule`].

pub mod base;
pub mod common;
pub mod depth;
pub mod forward;
pub mod scene;
pub mod schedule;
pub mod shaders;
pub mod uniforms;
