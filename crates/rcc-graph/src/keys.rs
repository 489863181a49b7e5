//! Property-key schema of the ColorCorrector node.
//!
//! All corrector state lives under the node's key prefix:
//!
//! ```text
//! {node}.clip                      clip-wide correction
//! {node}.frame:{sf}                per-source-frame correction
//! {node}.frame:{sf}.regions       ordered region guid list
//! {node}.region:{guid}             region correction record
//! {node}.region:{guid}.shapes     ordered shape guid list
//! {node}.shape:{guid}.points      (x, y) point sequence
//! {node}.parameters.refresh        mutation counter
//! ```

/// Node kind the corrector owns in the color pipeline.
pub const CORRECTOR_KIND: &str = "ColorCorrector";

/// Clip-wide correction base key.
pub fn clip(node: &str) -> String {
    format!("{node}.clip")
}

/// Per-source-frame correction base key.
pub fn frame(node: &str, source_frame: i32) -> String {
    format!("{node}.frame:{source_frame}")
}

/// Ordered region guid list at a source frame.
pub fn frame_regions(node: &str, source_frame: i32) -> String {
    format!("{node}.frame:{source_frame}.regions")
}

/// Region correction record base key.
pub fn region(node: &str, guid: &str) -> String {
    format!("{node}.region:{guid}")
}

/// Ordered shape guid list of a region.
pub fn region_shapes(node: &str, guid: &str) -> String {
    format!("{node}.region:{guid}.shapes")
}

/// Point sequence of a shape, width-2 float tuples.
pub fn shape_points(node: &str, guid: &str) -> String {
    format!("{node}.shape:{guid}.points")
}

/// Mutation counter consumed by the downstream shader.
pub fn refresh(node: &str) -> String {
    format!("{node}.parameters.refresh")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_shapes() {
        assert_eq!(clip("n0"), "n0.clip");
        assert_eq!(frame("n0", 42), "n0.frame:42");
        assert_eq!(frame_regions("n0", 42), "n0.frame:42.regions");
        assert_eq!(region("n0", "abc"), "n0.region:abc");
        assert_eq!(region_shapes("n0", "abc"), "n0.region:abc.shapes");
        assert_eq!(shape_points("n0", "s1"), "n0.shape:s1.points");
        assert_eq!(refresh("n0"), "n0.parameters.refresh");
    }
}
