use crate::math::{Matrix, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintTarget {
    pub object: String,
    #[serde(default)]
    pub subtarget: Option<String>,
}

impl ConstraintTarget {
    pub fn bone<T: Into<String>, S: Into<String>>(object: T, bone: S) -> ConstraintTarget {
        ConstraintTarget {
            object: object.into(),
            subtarget: Some(bone.into()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixMode {
    #[default]
    Replace,
    Before,
    After,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackAxis {
    X,
    #[default]
    Y,
    Z,
    NegativeX,
    NegativeY,
    NegativeZ,
}

/// Discriminant of [`ConstraintKind`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    InverseKinematics,
    CopyTransforms,
    CopyRotation,
    CopyLocation,
    ChildOf,
    DampedTrack,
    LimitRotation,
}

fn default_chain_count() -> u32 {
    2
}

fn default_iterations() -> u32 {
    500
}

fn enabled() -> bool {
    true
}

fn full_influence() -> f32 {
    1.0
}

fn identity_matrix() -> Matrix {
    Matrix::identity()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConstraintKind {
    InverseKinematics {
        #[serde(default)]
        target: Option<ConstraintTarget>,
        #[serde(default = "default_chain_count")]
        chain_count: u32,
        #[serde(default = "default_iterations")]
        iterations: u32,
        #[serde(default = "enabled")]
        use_tail: bool,
        #[serde(default)]
        use_stretch: bool,
        #[serde(default)]
        pole: Option<ConstraintTarget>,
    },
    CopyTransforms {
        #[serde(default)]
        target: Option<ConstraintTarget>,
        #[serde(default)]
        mix: MixMode,
    },
    CopyRotation {
        #[serde(default)]
        target: Option<ConstraintTarget>,
        #[serde(default = "enabled")]
        use_x: bool,
        #[serde(default = "enabled")]
        use_y: bool,
        #[serde(default = "enabled")]
        use_z: bool,
        #[serde(default)]
        mix: MixMode,
    },
    CopyLocation {
        #[serde(default)]
        target: Option<ConstraintTarget>,
        #[serde(default = "enabled")]
        use_x: bool,
        #[serde(default = "enabled")]
        use_y: bool,
        #[serde(default = "enabled")]
        use_z: bool,
    },
    ChildOf {
        #[serde(default)]
        target: Option<ConstraintTarget>,
        #[serde(default = "identity_matrix")]
        inverse_matrix: Matrix,
    },
    DampedTrack {
        #[serde(default)]
        target: Option<ConstraintTarget>,
        #[serde(default)]
        track_axis: TrackAxis,
    },
    LimitRotation {
        min: Vector3,
        max: Vector3,
        #[serde(default)]
        use_limit_x: bool,
        #[serde(default)]
        use_limit_y: bool,
        #[serde(default)]
        use_limit_z: bool,
    },
}

impl ConstraintKind {
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            ConstraintKind::InverseKinematics { .. } => ConstraintType::InverseKinematics,
            ConstraintKind::CopyTransforms { .. } => ConstraintType::CopyTransforms,
            ConstraintKind::CopyRotation { .. } => ConstraintType::CopyRotation,
            ConstraintKind::CopyLocation { .. } => ConstraintType::CopyLocation,
            ConstraintKind::ChildOf { .. } => ConstraintType::ChildOf,
            ConstraintKind::DampedTrack { .. } => ConstraintType::DampedTrack,
            ConstraintKind::LimitRotation { .. } => ConstraintType::LimitRotation,
        }
    }

    pub fn target(&self) -> Option<&ConstraintTarget> {
        match self {
            ConstraintKind::InverseKinematics { target, .. }
            | ConstraintKind::CopyTransforms { target, .. }
            | ConstraintKind::CopyRotation { target, .. }
            | ConstraintKind::CopyLocation { target, .. }
            | ConstraintKind::ChildOf { target, .. }
            | ConstraintKind::DampedTrack { target, .. } => target.as_ref(),
            ConstraintKind::LimitRotation { .. } => None,
        }
    }

    /// Target slot of the constraint, `None` for types without one
    pub fn target_slot_mut(&mut self) -> Option<&mut Option<ConstraintTarget>> {
        match self {
            ConstraintKind::InverseKinematics { target, .. }
            | ConstraintKind::CopyTransforms { target, .. }
            | ConstraintKind::CopyRotation { target, .. }
            | ConstraintKind::CopyLocation { target, .. }
            | ConstraintKind::ChildOf { target, .. }
            | ConstraintKind::DampedTrack { target, .. } => Some(target),
            ConstraintKind::LimitRotation { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    #[serde(default)]
    pub mute: bool,
    #[serde(default = "full_influence")]
    pub influence: f32,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new<T: Into<String>>(name: T, kind: ConstraintKind) -> Constraint {
        Constraint {
            name: name.into(),
            mute: false,
            influence: full_influence(),
            kind,
        }
    }

    pub fn inverse_kinematics(target: ConstraintTarget, chain_count: u32) -> Constraint {
        Constraint::new("IK", ConstraintKind::InverseKinematics {
            target: Some(target),
            chain_count,
            iterations: default_iterations(),
            use_tail: true,
            use_stretch: false,
            pole: None,
        })
    }

    pub fn child_of(target: ConstraintTarget) -> Constraint {
        Constraint::new("Child Of", ConstraintKind::ChildOf {
            target: Some(target),
            inverse_matrix: Matrix::identity(),
        })
    }

    pub fn copy_rotation(target: ConstraintTarget) -> Constraint {
        Constraint::new("Copy Rotation", ConstraintKind::CopyRotation {
            target: Some(target),
            use_x: true,
            use_y: true,
            use_z: true,
            mix: MixMode::Replace,
        })
    }

    pub fn copy_transforms(target: ConstraintTarget) -> Constraint {
        Constraint::new("Copy Transforms", ConstraintKind::CopyTransforms {
            target: Some(target),
            mix: MixMode::Replace,
        })
    }

    pub fn constraint_type(&self) -> ConstraintType {
        self.kind.constraint_type()
    }

    pub fn is_type(&self, constraint_type: ConstraintType) -> bool {
        self.constraint_type() == constraint_type
    }

    pub fn target(&self) -> Option<&ConstraintTarget> {
        self.kind.target()
    }

    pub fn subtarget(&self) -> Option<&str> {
        self.target()
            .and_then(|t| t.subtarget.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;

    #[rstest]
    fn limit_rotation_has_no_target() {
        let mut c = Constraint::new("Limit", ConstraintKind::LimitRotation {
            min: Vector3::zeros(),
            max: Vector3::zeros(),
            use_limit_x: true,
            use_limit_y: false,
            use_limit_z: false,
        });

        assert!(c.target().is_none());
        assert!(c.kind.target_slot_mut().is_none());
    }

    #[rstest]
    fn deserialize_fills_defaults() {
        let json = r#"{ "name": "IK", "kind": { "type": "InverseKinematics", "target": { "object": "Rig", "subtarget": "Hand" } } }"#;
        let c: Constraint = serde_json::from_str(json).unwrap();

        assert!(!c.mute);
        assert_eq!(c.influence, 1.0);
        assert_eq!(c.subtarget(), Some("Hand"));
        assert!(matches!(c.kind, ConstraintKind::InverseKinematics { chain_count: 2, use_tail: true, .. }));
    }
}
