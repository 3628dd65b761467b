use super::{Point3, Vector3, TOLERANCE};

/// Returns `v / |v|`, or `None` if `v` is (numerically) the zero vector.
#[must_use]
pub fn normalize_or_none(v: &Vector3) -> Option<Vector3> {
    let len = v.norm();
    if len < TOLERANCE {
        None
    } else {
        Some(v / len)
    }
}

/// Linear interpolation between two points, `t = 0` at `a` and `t = 1` at `b`.
#[must_use]
pub fn lerp_point(a: &Point3, b: &Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

/// Cotangent of the angle at `apex` in the triangle `(a, apex, b)`.
///
/// Returns `0.0` when either edge is degenerate or the angle is 0 or π,
/// instead of an unbounded value.
#[must_use]
pub fn cotangent(a: &Point3, apex: &Point3, b: &Point3) -> f64 {
    let u = a - apex;
    let v = b - apex;
    let dot = u.dot(&v);
    let cross_norm = u.cross(&v).norm();
    if cross_norm < TOLERANCE {
        return 0.0;
    }
    dot / cross_norm
}

/// Unit normal of the triangle `(a, apex, b)`, oriented as `(b - apex) × (a - apex)`.
///
/// Returns the zero vector for a degenerate triangle.
#[must_use]
pub fn triangle_normal(a: &Point3, apex: &Point3, b: &Point3) -> Vector3 {
    let n = (b - apex).cross(&(a - apex));
    normalize_or_none(&n).unwrap_or_else(Vector3::zeros)
}

/// A unit vector perpendicular to `direction`.
///
/// The reference axis is chosen from the dominant component of `direction`,
/// so the result is stable under small perturbations of the input.
#[must_use]
pub fn perpendicular(direction: &Vector3) -> Option<Vector3> {
    let d = normalize_or_none(direction)?;

    // Choose a reference vector not parallel to the direction
    let reference = if d.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };

    normalize_or_none(&d.cross(&reference))
}

/// Weighted centroid of `points`.
///
/// Falls back to the unweighted centroid when the weights sum to zero.
/// Returns `None` for an empty input.
#[must_use]
pub fn weighted_centroid(points: &[Point3], weights: &[f64]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    let mut sum = Vector3::zeros();
    let mut weight_sum = 0.0;
    for (p, w) in points.iter().zip(weights) {
        sum += p.coords * *w;
        weight_sum += *w;
    }
    if weight_sum.abs() < TOLERANCE {
        let mut plain = Vector3::zeros();
        for p in points {
            plain += p.coords;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        return Some(Point3::from(plain / n));
    }
    Some(Point3::from(sum / weight_sum))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn cotangent_right_angle_is_zero() {
        let c = cotangent(&p(1.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0));
        assert!(c.abs() < 1e-12);
    }

    #[test]
    fn cotangent_forty_five_degrees() {
        let c = cotangent(&p(1.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(1.0, 1.0, 0.0));
        assert_relative_eq!(c, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn cotangent_degenerate_edge() {
        let c = cotangent(&p(0.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(1.0, 1.0, 0.0));
        assert!(c.abs() < 1e-12);
    }

    #[test]
    fn triangle_normal_orientation() {
        // (b - apex) x (a - apex) = y x x = -z
        let n = triangle_normal(&p(1.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0));
        assert_relative_eq!(n.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn triangle_normal_collinear_is_zero() {
        let n = triangle_normal(&p(1.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(2.0, 0.0, 0.0));
        assert!(n.norm() < 1e-12);
    }

    #[test]
    fn perpendicular_is_unit_and_orthogonal() {
        for d in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 3.0),
            Vector3::new(1.0, 2.0, -0.5),
        ] {
            let n = perpendicular(&d).unwrap();
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
            assert!(n.dot(&d).abs() < 1e-12);
        }
        assert!(perpendicular(&Vector3::zeros()).is_none());
    }

    #[test]
    fn weighted_centroid_zero_weights_falls_back() {
        let pts = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        let c = weighted_centroid(&pts, &[0.0, 0.0]).unwrap();
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);

        let c = weighted_centroid(&pts, &[1.0, 3.0]).unwrap();
        assert_relative_eq!(c.x, 1.5, epsilon = 1e-12);

        assert!(weighted_centroid(&[], &[]).is_none());
    }
}
