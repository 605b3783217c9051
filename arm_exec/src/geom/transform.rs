//! Homogeneous transforms

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix4, Vector3, Vector4};
use std::ops::Mul;

use super::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 4x4 homogeneous transform.
///
/// Composition is matrix multiplication: `a * b` applies `b` first, then `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(Matrix4<f64>);

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Transform {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self(matrix)
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// Pure translation.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self(Matrix4::new_translation(&Vector3::new(dx, dy, dz)))
    }

    /// Rotation about the x axis.
    pub fn rot_x(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0,   c,  -s, 0.0,
            0.0,   s,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        Self(m)
    }

    /// Rotation about the y axis.
    pub fn rot_y(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
              c, 0.0,   s, 0.0,
            0.0, 1.0, 0.0, 0.0,
             -s, 0.0,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        Self(m)
    }

    /// Rotation about the z axis.
    pub fn rot_z(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
              c,  -s, 0.0, 0.0,
              s,   c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        Self(m)
    }

    /// Standard Denavit-Hartenberg link transform.
    ///
    /// `d` is the link offset along the previous z, `theta` the joint angle about it, `r` the link
    /// length along the new x and `alpha` the twist about it.
    pub fn dh(d: f64, theta_rad: f64, r: f64, alpha_rad: f64) -> Self {
        let (st, ct) = theta_rad.sin_cos();
        let (sa, ca) = alpha_rad.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
             ct, -st * ca,  st * sa, r * ct,
             st,  ct * ca, -ct * sa, r * st,
            0.0,       sa,       ca,      d,
            0.0,      0.0,      0.0,    1.0,
        );
        Self(m)
    }

    /// Build the transform applied to incoming targets.
    ///
    /// The rotation is `Rz(roll) * Ry(yaw) * Rx(pitch)`, applied before the translation. All angles
    /// are in degrees.
    pub fn input(dx: f64, dy: f64, dz: f64, roll_deg: f64, pitch_deg: f64, yaw_deg: f64) -> Self {
        let rot = Self::rot_z(roll_deg.to_radians())
            * (Self::rot_y(yaw_deg.to_radians()) * Self::rot_x(pitch_deg.to_radians()));

        Self::translation(dx, dy, dz) * rot
    }

    /// The translation component of the transform.
    pub fn translation_part(&self) -> Vector3<f64> {
        Vector3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        let p = self.0 * Vector4::new(point.x, point.y, point.z, 1.0);
        Vector3::new(p[0], p[1], p[2])
    }

    /// Apply the transform to the position of a pose.
    ///
    /// The orientation of the result is zeroed, composing orientations is not supported.
    pub fn transform_pose(&self, pose: &Pose) -> Pose {
        Pose::from_position(self.transform_point(&pose.position_mm))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_eq(a: &Vector3<f64>, b: &Vector3<f64>) {
        assert!((a - b).norm() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_dh_planar_link() {
        // A link of length 10 rotated by 90 degrees ends on the y axis
        let t = Transform::dh(0.0, FRAC_PI_2, 10.0, 0.0);
        assert_vec_eq(&t.translation_part(), &Vector3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_dh_offset_and_twist() {
        let t = Transform::dh(5.0, 0.0, 0.0, FRAC_PI_2);
        assert_vec_eq(&t.translation_part(), &Vector3::new(0.0, 0.0, 5.0));

        // The twist maps the next z axis onto -y
        let z_next = t.transform_point(&Vector3::new(0.0, 0.0, 1.0)) - t.translation_part();
        assert_vec_eq(&z_next, &Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_input_transform_translation_then_rotation() {
        let t = Transform::input(100.0, 0.0, 0.0, 90.0, 0.0, 0.0);
        let p = t.transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert_vec_eq(&p, &Vector3::new(100.0, 1.0, 0.0));

        let pose = t.transform_pose(&Pose::with_orientation(1.0, 0.0, 0.0, 10.0, 20.0, 30.0));
        assert_eq!(pose.orientation_deg, Vector3::zeros());
    }

    #[test]
    fn test_compose_order() {
        let t = Transform::translation(1.0, 0.0, 0.0) * Transform::rot_z(FRAC_PI_2);
        let p = t.transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert_vec_eq(&p, &Vector3::new(1.0, 1.0, 0.0));
    }
}
