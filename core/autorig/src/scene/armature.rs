use super::{identity_rotation, unit_scale, zero_vector, Constraint};
use crate::math::{self, Matrix, ParentSpace, Quat, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KinematicsMode {
    #[default]
    InverseKinematics,
    MixedKinematics,
    ForwardKinematics,
}

/// Bone addressed by owning armature object + bone name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoneRef {
    pub armature: String,
    pub bone: String,
}

fn default_auto_posing() -> bool {
    true
}

fn identity_matrix() -> Matrix {
    Matrix::identity()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Rest matrix in armature space
    #[serde(default = "identity_matrix")]
    pub matrix_local: Matrix,
    /// Evaluated pose matrix in armature space (constraints applied)
    #[serde(default = "identity_matrix")]
    pub matrix: Matrix,
    #[serde(default = "zero_vector")]
    pub location: Vector3,
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vector3,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "default_auto_posing")]
    pub auto_posing: bool,
    #[serde(default)]
    pub mode: KinematicsMode,
}

impl Bone {
    pub fn new<T: Into<String>>(name: T, parent: Option<&str>, matrix_local: Matrix) -> Bone {
        Bone {
            name: name.into(),
            parent: parent.map(str::to_owned),
            matrix_local,
            matrix: matrix_local,
            location: zero_vector(),
            rotation: identity_rotation(),
            scale: unit_scale(),
            constraints: Vec::new(),
            selected: false,
            hidden: false,
            auto_posing: default_auto_posing(),
            mode: KinematicsMode::default(),
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Bone {
        self.constraints.push(constraint);
        self
    }

    pub fn local_matrix(&self) -> Matrix {
        math::compose(&self.location, &self.rotation, &self.scale)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Armature {
    #[serde(default)]
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub active_bone: Option<String>,
}

impl Armature {
    pub fn new(bones: Vec<Bone>) -> Armature {
        Armature {
            bones,
            active_bone: None,
        }
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.bones.iter_mut().find(|b| b.name == name)
    }

    pub fn contains_bone(&self, name: &str) -> bool {
        self.bone(name).is_some()
    }

    pub fn parent_of(&self, bone: &Bone) -> Option<&Bone> {
        bone.parent
            .as_deref()
            .and_then(|p| self.bone(p))
    }

    pub fn children_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Bone> + 'a {
        self.bones
            .iter()
            .filter(move |b| b.parent.as_deref() == Some(name))
    }

    pub fn selected_bones(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter().filter(|b| b.selected)
    }

    pub fn active_bone(&self) -> Option<&Bone> {
        self.active_bone
            .as_deref()
            .and_then(|name| self.bone(name))
    }

    pub fn deselect_all(&mut self) {
        for bone in self.bones.iter_mut() {
            bone.selected = false;
        }
    }

    fn parent_space(&self, bone: &Bone) -> Option<(Matrix, Matrix)> {
        self.parent_of(bone).map(|p| (p.matrix_local, p.matrix))
    }

    /// Rotation that reproduces the bone's evaluated pose when written into
    /// its local channels with no constraints active
    pub fn visual_rotation(&self, name: &str) -> Option<Quat> {
        let bone = self.bone(name)?;
        let parent = self.parent_space(bone);

        let local = math::local_from_pose(
            &bone.matrix_local,
            &bone.matrix,
            parent.as_ref().map(|(rest, pose)| ParentSpace { rest, pose }),
        )?;

        Some(math::decompose(&local).rotation)
    }

    /// Assigns an armature space pose matrix, recomputing local channels.
    /// Returns false if the bone is missing or its rest matrix is singular.
    pub fn set_pose_matrix(&mut self, name: &str, matrix: Matrix) -> bool {
        let Some(bone) = self.bone(name) else {
            return false;
        };

        let parent = self.parent_space(bone);
        let Some(local) = math::local_from_pose(
            &bone.matrix_local,
            &matrix,
            parent.as_ref().map(|(rest, pose)| ParentSpace { rest, pose }),
        ) else {
            log::warn!("Unable to compute local transform for bone \"{name}\"");
            return false;
        };

        let parts = math::decompose(&local);

        let Some(bone) = self.bone_mut(name) else {
            return false;
        };

        bone.matrix = matrix;
        bone.location = parts.translation;
        bone.rotation = parts.rotation;
        bone.scale = parts.scale;

        true
    }

    /// Bone indices ordered so parents always come before children
    fn hierarchy_order(&self) -> Vec<usize> {
        let index_of = self
            .bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.as_str(), i))
            .collect::<HashMap<_, _>>();

        let depth = |mut idx: usize| {
            let mut depth = 0;
            while let Some(parent) = self.bones[idx].parent.as_deref().and_then(|p| index_of.get(p)) {
                depth += 1;
                idx = *parent;

                if depth > self.bones.len() {
                    // Cyclic parenting
                    break;
                }
            }
            depth
        };

        let mut order = (0..self.bones.len()).collect::<Vec<_>>();
        order.sort_by_cached_key(|i| depth(*i));
        order
    }

    /// Recomputes every evaluated pose matrix from rest matrices and local
    /// channels, ignoring constraints
    pub fn evaluate_forward(&mut self) {
        for idx in self.hierarchy_order() {
            let bone = &self.bones[idx];
            let local = bone.local_matrix();
            let parent = self.parent_space(bone);

            let pose = math::pose_from_local(
                &bone.matrix_local,
                &local,
                parent.as_ref().map(|(rest, pose)| ParentSpace { rest, pose }),
            );

            match pose {
                Some(pose) => self.bones[idx].matrix = pose,
                None => log::warn!("Unable to evaluate pose for bone \"{}\"", self.bones[idx].name),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;

    fn translation(x: f32, y: f32, z: f32) -> Matrix {
        Matrix::new_translation(&Vector3::new(x, y, z))
    }

    fn arm() -> Armature {
        Armature::new(vec![
            Bone::new("Hand", Some("Forearm"), translation(0.0, 2.0, 0.0)),
            Bone::new("Forearm", Some("Upper"), translation(0.0, 1.0, 0.0)),
            Bone::new("Upper", None, Matrix::identity()),
        ])
    }

    #[rstest]
    fn evaluate_forward_respects_hierarchy() {
        let mut arm = arm();
        arm.bone_mut("Upper").unwrap().rotation = Quat::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
        arm.evaluate_forward();

        // Hand rest offset (0, 2, 0) rotated 90 degrees about z lands on (-2, 0, 0)
        let hand = arm.bone("Hand").unwrap();
        let pos = Vector3::new(hand.matrix[(0, 3)], hand.matrix[(1, 3)], hand.matrix[(2, 3)]);
        assert!((pos - Vector3::new(-2.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[rstest]
    fn visual_rotation_matches_local_channel_after_forward_evaluation() {
        let mut arm = arm();
        let rot = Quat::from_axis_angle(&Vector3::x_axis(), 0.4);
        arm.bone_mut("Forearm").unwrap().rotation = rot;
        arm.bone_mut("Upper").unwrap().rotation = Quat::from_axis_angle(&Vector3::y_axis(), 0.9);
        arm.evaluate_forward();

        let visual = arm.visual_rotation("Forearm").unwrap();
        assert!(math::rotations_match(&visual, &rot, 1e-4));
    }

    #[rstest]
    fn set_pose_matrix_updates_channels() {
        let mut arm = arm();
        let target = translation(0.0, 2.0, 0.0) * Quat::from_axis_angle(&Vector3::z_axis(), 0.5).to_homogeneous();

        assert!(arm.set_pose_matrix("Forearm", target));

        let bone = arm.bone("Forearm").unwrap();
        assert_eq!(bone.matrix, target);
        assert!((bone.location - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-5);
        assert!(!arm.set_pose_matrix("Missing", target));
    }

    #[rstest]
    fn children_of_finds_direct_children_only() {
        let arm = arm();
        let names = arm.children_of("Upper").map(|b| b.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Forearm"]);
    }
}
