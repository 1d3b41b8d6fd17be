//! Scalar clamping helpers
//!
//! Bounded quantities in the simulation (proficiencies, pressure, progress)
//! are corrected by clamping at the mutation site rather than by rejecting
//! the mutation, so the simulation always moves forward.

/// Clamp a value to the unit interval [0, 1].
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Clamp a value to an arbitrary closed interval.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.5), 0.5);
        assert_eq!(clamp01(1.5), 1.0);
    }

    #[test]
    fn clamp_interval() {
        assert_eq!(clamp(0.3, -0.1, 0.5), 0.3);
        assert_eq!(clamp(-0.2, -0.1, 0.5), -0.1);
        assert_eq!(clamp(0.9, -0.1, 0.5), 0.5);
    }
}
