mod camera;
mod directional;
mod shadow;

pub use camera::*;
pub use directional::*;
pub use shadow::*;
