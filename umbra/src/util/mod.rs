//! Math and binding helpers shared by the managers and routines.

pub mod bind_merge;
pub mod frustum;
