use crate::geom::Vec3;

/// Right-hand side vector for a direction of travel.
///
/// `up × tangent`, falling back to `Z × tangent` when the tangent is (nearly)
/// vertical. A zero tangent is treated as travelling along [`Vec3::FORWARD`].
#[must_use]
pub fn right_vector(tangent: Vec3) -> Vec3 {
    let t = tangent.normalized().unwrap_or(Vec3::FORWARD);
    Vec3::UP
        .cross(t)
        .normalized()
        .or_else(|| Vec3::Z.cross(t).normalized())
        .unwrap_or(Vec3::X)
}

/// Keeps consecutive right vectors on the same side of the road.
#[derive(Debug, Clone, Copy, Default)]
pub struct RightVectorTracker {
    previous: Option<Vec3>,
    flips: usize,
}

impl RightVectorTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Right vector for `tangent`, negated if it points against the previous one.
    pub fn next(&mut self, tangent: Vec3) -> Vec3 {
        let mut right = right_vector(tangent);
        if let Some(previous) = self.previous {
            if previous.dot(right) < 0.0 {
                right = -right;
                self.flips += 1;
            }
        }
        self.previous = Some(right);
        right
    }

    /// Number of times continuity forced a flip.
    #[must_use]
    pub fn flips(&self) -> usize {
        self.flips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travelling_along_x_puts_right_at_negative_z() {
        let r = right_vector(Vec3::X);
        assert!((r.z + 1.0).abs() < 1e-12);
        assert!(r.y.abs() < 1e-12);
    }

    #[test]
    fn vertical_tangent_uses_fallback() {
        let r = right_vector(Vec3::UP);
        assert!((r.length() - 1.0).abs() < 1e-12);
        assert!(r.dot(Vec3::UP).abs() < 1e-12);
    }

    #[test]
    fn reversal_is_flipped_back() {
        let mut tracker = RightVectorTracker::new();
        let a = tracker.next(Vec3::X);
        let b = tracker.next(-Vec3::X);
        assert!(a.dot(b) > 0.0);
        assert_eq!(tracker.flips(), 1);
    }
}
