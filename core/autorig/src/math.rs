use nalgebra as na;

pub type Matrix = na::Matrix4<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Vector3 = na::Vector3<f32>;

const SCALE_EPSILON: f32 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    pub translation: Vector3,
    pub rotation: Quat,
    pub scale: Vector3,
}

/// Rest and evaluated pose matrices of a parent bone, both in armature space
#[derive(Clone, Copy, Debug)]
pub struct ParentSpace<'a> {
    pub rest: &'a Matrix,
    pub pose: &'a Matrix,
}

pub fn compose(translation: &Vector3, rotation: &Quat, scale: &Vector3) -> Matrix {
    Matrix::new_translation(translation)
        * rotation.to_homogeneous()
        * Matrix::new_nonuniform_scaling(scale)
}

/// Splits an affine matrix into translation, rotation and scale.
/// Negative determinants are folded into the x scale.
pub fn decompose(m: &Matrix) -> Decomposed {
    let translation = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let basis: na::Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();

    let mut scale = Vector3::new(
        basis.column(0).norm(),
        basis.column(1).norm(),
        basis.column(2).norm(),
    );

    if basis.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    if scale.iter().any(|s| s.abs() < SCALE_EPSILON) {
        return Decomposed {
            translation,
            rotation: Quat::identity(),
            scale,
        };
    }

    let rotation_matrix = na::Matrix3::from_columns(&[
        basis.column(0) / scale.x,
        basis.column(1) / scale.y,
        basis.column(2) / scale.z,
    ]);

    let rotation = Quat::from_rotation_matrix(&na::Rotation3::from_matrix_unchecked(rotation_matrix));

    Decomposed {
        translation,
        rotation,
        scale,
    }
}

/// Local (channel space) matrix of a bone whose rest and evaluated pose are
/// given in armature space. Returns `None` if a rest or pose matrix can't be
/// inverted.
pub fn local_from_pose(rest: &Matrix, pose: &Matrix, parent: Option<ParentSpace<'_>>) -> Option<Matrix> {
    match parent {
        Some(parent) => {
            let rest_offset = parent.rest.try_inverse()? * rest;
            let pose_offset = parent.pose.try_inverse()? * pose;
            Some(rest_offset.try_inverse()? * pose_offset)
        },
        None => Some(rest.try_inverse()? * pose),
    }
}

/// Inverse of [`local_from_pose`]: armature space pose from local channels
pub fn pose_from_local(rest: &Matrix, local: &Matrix, parent: Option<ParentSpace<'_>>) -> Option<Matrix> {
    match parent {
        Some(parent) => {
            let rest_offset = parent.rest.try_inverse()? * rest;
            Some(parent.pose * rest_offset * local)
        },
        None => Some(rest * local),
    }
}

/// Quaternion as keyframe channel values, `w` first
pub fn quat_components(q: &Quat) -> [f32; 4] {
    [q.w, q.i, q.j, q.k]
}

pub fn rotations_match(a: &Quat, b: &Quat, epsilon: f32) -> bool {
    a.angle_to(b) <= epsilon
}

pub fn matrices_match(a: &Matrix, b: &Matrix, epsilon: f32) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - y).abs() <= epsilon)
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[rstest]
    fn decompose_recovers_components() {
        let translation = Vector3::new(1.0, 2.0, 3.0);
        let rotation = Quat::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2);
        let scale = Vector3::new(2.0, 3.0, 4.0);

        let parts = decompose(&compose(&translation, &rotation, &scale));

        assert!((parts.translation - translation).norm() < 1e-5);
        assert!((parts.scale - scale).norm() < 1e-5);
        assert!(rotations_match(&parts.rotation, &rotation, 1e-4));
    }

    #[rstest]
    fn local_from_pose_inverts_pose_from_local() {
        let parent_rest = compose(&Vector3::new(0.0, 0.0, 1.0), &Quat::identity(), &Vector3::repeat(1.0));
        let parent_pose = compose(
            &Vector3::new(0.5, 0.0, 1.0),
            &Quat::from_axis_angle(&Vector3::x_axis(), 0.3),
            &Vector3::repeat(1.0),
        );
        let rest = compose(&Vector3::new(0.0, 1.0, 1.0), &Quat::identity(), &Vector3::repeat(1.0));
        let local = compose(
            &Vector3::zeros(),
            &Quat::from_axis_angle(&Vector3::z_axis(), 0.7),
            &Vector3::repeat(1.0),
        );

        let parent = ParentSpace { rest: &parent_rest, pose: &parent_pose };
        let pose = pose_from_local(&rest, &local, Some(parent)).unwrap();
        let recovered = local_from_pose(&rest, &pose, Some(parent)).unwrap();

        assert!(matrices_match(&recovered, &local, 1e-5));
    }

    #[rstest]
    fn singular_rest_has_no_local() {
        let rest = Matrix::zeros();
        assert!(local_from_pose(&rest, &Matrix::identity(), None).is_none());
    }
}
