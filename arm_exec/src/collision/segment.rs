//! Segment/segment closest point computation

use nalgebra::Vector3;
use util::maths::clamp;

/// Squared length below which a segment is treated as a point.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Find the closest points between the segments `p1 -> q1` and `p2 -> q2`.
///
/// Returns `(c1, c2)` where `c1` lies on the first segment and `c2` on the second. Degenerate
/// segments (zero length) are handled as points.
pub fn closest_points(
    p1: &Vector3<f64>,
    q1: &Vector3<f64>,
    p2: &Vector3<f64>,
    q2: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;

    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);

    if a <= DEGENERATE_EPSILON && e <= DEGENERATE_EPSILON {
        return (*p1, *p2);
    }

    let (s, t) = if a <= DEGENERATE_EPSILON {
        (0.0, clamp(f / e, 0.0, 1.0))
    } else {
        let c = d1.dot(&r);

        if e <= DEGENERATE_EPSILON {
            (clamp(-c / a, 0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            // Parallel segments pick an arbitrary s and let t correct it
            let s = if denom > DEGENERATE_EPSILON {
                clamp((b * f - c * e) / denom, 0.0, 1.0)
            } else {
                0.0
            };

            let t = (b * s + f) / e;

            if t < 0.0 {
                (clamp(-c / a, 0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (clamp((b - c) / a, 0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}
