use crate::math::{Matrix, Quat};
use crate::scene::{Armature, Bone, Constraint, ConstraintType, Scene};

/// Single mutation of a bone's pose or constraint stack
#[derive(Clone, Debug, PartialEq)]
pub enum RigEdit {
    SetRotation {
        bone: String,
        rotation: Quat,
    },
    /// Armature space assignment, local channels are recomputed
    SetPoseMatrix {
        bone: String,
        matrix: Matrix,
    },
    ReplaceConstraints {
        bone: String,
        constraints: Vec<Constraint>,
    },
    AddConstraint {
        bone: String,
        constraint: Constraint,
    },
    RemoveConstraintsOfType {
        bone: String,
        constraint_type: ConstraintType,
    },
    ClearConstraints {
        bone: String,
    },
    SetConstraintMute {
        bone: String,
        index: usize,
        mute: bool,
    },
}

impl RigEdit {
    pub fn bone(&self) -> &str {
        match self {
            RigEdit::SetRotation { bone, .. }
            | RigEdit::SetPoseMatrix { bone, .. }
            | RigEdit::ReplaceConstraints { bone, .. }
            | RigEdit::AddConstraint { bone, .. }
            | RigEdit::RemoveConstraintsOfType { bone, .. }
            | RigEdit::ClearConstraints { bone }
            | RigEdit::SetConstraintMute { bone, .. } => bone,
        }
    }

    /// Applies the edit. Returns false if the bone or constraint is gone.
    pub fn apply(self, armature: &mut Armature) -> bool {
        match self {
            RigEdit::SetPoseMatrix { bone, matrix } => armature.set_pose_matrix(&bone, matrix),
            RigEdit::SetRotation { bone, rotation } => modify_bone(armature, &bone, |b| {
                b.rotation = rotation;
                true
            }),
            RigEdit::ReplaceConstraints { bone, constraints } => modify_bone(armature, &bone, |b| {
                b.constraints = constraints;
                true
            }),
            RigEdit::AddConstraint { bone, constraint } => modify_bone(armature, &bone, |b| {
                b.constraints.push(constraint);
                true
            }),
            RigEdit::RemoveConstraintsOfType { bone, constraint_type } => modify_bone(armature, &bone, |b| {
                b.constraints.retain(|c| !c.is_type(constraint_type));
                true
            }),
            RigEdit::ClearConstraints { bone } => modify_bone(armature, &bone, |b| {
                b.constraints.clear();
                true
            }),
            RigEdit::SetConstraintMute { bone, index, mute } => modify_bone(armature, &bone, |b| {
                match b.constraints.get_mut(index) {
                    Some(c) => {
                        c.mute = mute;
                        true
                    },
                    None => false,
                }
            }),
        }
    }
}

fn modify_bone<F>(armature: &mut Armature, name: &str, f: F) -> bool where F: FnOnce(&mut Bone) -> bool {
    match armature.bone_mut(name) {
        Some(bone) => f(bone),
        None => {
            log::debug!("Bone \"{name}\" no longer exists, skipping edit");
            false
        }
    }
}

/// Applies edits in order to one armature, returning how many took effect
pub fn apply_edits<I>(scene: &mut Scene, armature: &str, edits: I) -> usize where I: IntoIterator<Item = RigEdit> {
    let Some(arm) = scene.armature_mut(armature) else {
        log::warn!("Armature \"{armature}\" not found, dropping edits");
        return 0;
    };

    edits
        .into_iter()
        .map(|e| e.apply(arm))
        .filter(|applied| *applied)
        .count()
}
