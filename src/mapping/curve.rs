//! Smoothstep response curves used by the expression emulation.

/// Cubic Hermite step from `edge0` to `edge1`.
///
/// Works for either edge order. Equal edges degrade to a hard step that
/// returns 1 once `x` reaches the edge, so callers never divide by zero.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x >= edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Smoothstep for a signal that activates while falling from `edge0`
/// towards `edge1` (`edge1 <= edge0`).
///
/// Identical to [`smoothstep`] for distinct edges; with equal edges the step
/// fires once `x` drops to the edge.
pub fn falling_smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    smoothstep(-edge0, -edge1, -x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_points() {
        assert_eq!(smoothstep(0.0, 1.0, 0.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 1.0), 1.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.0, 1.0, -3.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 3.0), 1.0);
    }

    #[test]
    fn test_equal_edges() {
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.5), 1.0);
        assert_eq!(falling_smoothstep(0.5, 0.5, 0.6), 0.0);
        assert_eq!(falling_smoothstep(0.5, 0.5, 0.5), 1.0);
        assert_eq!(falling_smoothstep(0.5, 0.5, 0.1), 1.0);
    }

    #[test]
    fn test_falling_edge() {
        assert_eq!(falling_smoothstep(0.05, -1.0, 0.05), 0.0);
        assert_eq!(falling_smoothstep(0.05, -1.0, -1.0), 1.0);
        let mid = falling_smoothstep(0.05, -1.0, -0.475);
        assert!((mid - 0.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_monotonic(a in -1.0f32..1.0, b in -1.0f32..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(smoothstep(0.0, 1.0, lo) <= smoothstep(0.0, 1.0, hi));
        }

        #[test]
        fn prop_bounded(e0 in -2.0f32..2.0, e1 in -2.0f32..2.0, x in -3.0f32..3.0) {
            let y = smoothstep(e0, e1, x);
            prop_assert!((0.0..=1.0).contains(&y));
        }
    }
}
