mod interfaces;

pub use interfaces::*;
