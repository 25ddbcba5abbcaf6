//! Holds the sources for all shaders.

use std::borrow::Cow;

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/shaders"]
struct Shaders;

/// Fetches an embedded wgsl source by file name.
///
/// Panics when the shader is missing or not utf-8; both mean the crate
/// itself is broken, so startup aborts.
pub fn wgsl_source(name: &str) -> Cow<'static, str> {
    let file = Shaders::get(name).unwrap_or_else(|| panic!("embedded shader {} missing", name));
    match file.data {
        Cow::Borrowed(bytes) => Cow::Borrowed(std::str::from_utf8(bytes).expect("shader not utf-8")),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8(bytes).expect("shader not utf-8")),
    }
}

#[cfg(test)]
mod tests {
    use super::wgsl_source;

    #[test]
    fn all_shaders_embedded() {
        assert!(wgsl_source("depth.wgsl").contains("vs_main"));
        assert!(wgsl_source("forward.wgsl").contains("fs_main"));
    }
}
