//! Two-finger touch classification.

use kurbo::{Point, Vec2};

/// Result of comparing two consecutive two-finger samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TwoFingerMotion {
    /// Both fingers travel together (or one rests while the other moves).
    Pan { center: Point, delta: Vec2 },
    /// Fingers move against each other.
    Pinch {
        center: Point,
        /// `(distance_now - distance_before) / distance_before`.
        distance_delta: f64,
    },
    /// Neither finger moved.
    Still,
}

fn axis_sign(value: f64, epsilon: f64) -> i8 {
    if value.abs() <= epsilon {
        0
    } else if value > 0.0 {
        1
    } else {
        -1
    }
}

fn signs_agree(a: i8, b: i8) -> bool {
    a == 0 || b == 0 || a == b
}

/// Classify finger movement between two samples.
///
/// `previous` and `current` hold the same two fingers in the same order.
/// Movements at or below `epsilon` on an axis count as no movement on it.
pub fn classify(previous: [Point; 2], current: [Point; 2], epsilon: f64) -> TwoFingerMotion {
    let first = current[0] - previous[0];
    let second = current[1] - previous[1];
    let center = current[0].midpoint(current[1]);

    let sx = (axis_sign(first.x, epsilon), axis_sign(second.x, epsilon));
    let sy = (axis_sign(first.y, epsilon), axis_sign(second.y, epsilon));
    if sx == (0, 0) && sy == (0, 0) {
        return TwoFingerMotion::Still;
    }

    if signs_agree(sx.0, sx.1) && signs_agree(sy.0, sy.1) {
        TwoFingerMotion::Pan {
            center,
            delta: (first + second) / 2.0,
        }
    } else {
        let before = previous[0].distance(previous[1]);
        let now = current[0].distance(current[1]);
        let distance_delta = if before > f64::EPSILON {
            (now - before) / before
        } else {
            0.0
        };
        TwoFingerMotion::Pinch {
            center,
            distance_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_motion_is_pan() {
        let motion = classify(
            [Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            [Point::new(10.0, 5.0), Point::new(110.0, 5.0)],
            0.5,
        );
        match motion {
            TwoFingerMotion::Pan { delta, .. } => {
                assert!((delta.x - 10.0).abs() < f64::EPSILON);
                assert!((delta.y - 5.0).abs() < f64::EPSILON);
            }
            other => panic!("Expected pan, got {:?}", other),
        }
    }

    #[test]
    fn test_stationary_finger_is_pan() {
        let motion = classify(
            [Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            [Point::new(0.0, 0.0), Point::new(104.0, 2.0)],
            0.5,
        );
        assert!(matches!(motion, TwoFingerMotion::Pan { .. }));
    }

    #[test]
    fn test_spreading_is_pinch() {
        let motion = classify(
            [Point::new(40.0, 50.0), Point::new(60.0, 50.0)],
            [Point::new(30.0, 50.0), Point::new(70.0, 50.0)],
            0.5,
        );
        match motion {
            TwoFingerMotion::Pinch { center, distance_delta } => {
                assert!((distance_delta - 1.0).abs() < 1e-12);
                assert!((center.x - 50.0).abs() < f64::EPSILON);
            }
            other => panic!("Expected pinch, got {:?}", other),
        }
    }

    #[test]
    fn test_jitter_is_still() {
        let motion = classify(
            [Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            [Point::new(0.2, -0.1), Point::new(10.3, 0.0)],
            0.5,
        );
        assert_eq!(motion, TwoFingerMotion::Still);
    }
}
