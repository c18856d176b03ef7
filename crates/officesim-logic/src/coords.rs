//! Coordinate convention between simulation space and render space.
//!
//! The backend's 3-axis position maps into the renderer's space by negating
//! the depth axis; X (width) and Y (height) pass through unchanged. This is
//! a fixed convention, not configurable, and it is applied exactly once —
//! where an inbound position enters the registry.

use officesim_proto::SimVec3;

/// A position in render space, `[x, y, z]` with depth negated.
pub type RenderVec3 = [f32; 3];

pub fn render_from_sim(p: SimVec3) -> RenderVec3 {
    [p[0], p[1], -p[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_axis_negated() {
        assert_eq!(render_from_sim([10.0, 0.0, 5.0]), [10.0, 0.0, -5.0]);
        assert_eq!(render_from_sim([-3.5, 1.0, -25.0]), [-3.5, 1.0, 25.0]);
    }

    #[test]
    fn test_origin_and_height_pass_through() {
        assert_eq!(render_from_sim([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
        assert_eq!(render_from_sim([0.0, 0.5, 0.0]), [0.0, 0.5, 0.0]);
    }
}
