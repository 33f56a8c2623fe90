use super::RigEdit;
use crate::RigConfig;
use crate::scene::{Constraint, Object, Scene};

/// Copies a reference rig constraint so it drives `rig` instead. Targets that
/// were free-floating proxy objects are rewritten to the same-named rig bone.
pub fn retarget_constraint(scene: &Scene, constraint: &Constraint, rig: &str, config: &RigConfig) -> Constraint {
    let mut copy = constraint.to_owned();

    let proxy_bone = constraint
        .target()
        .filter(|t| scene.object(&t.object).is_some_and(|o| !o.is_armature()))
        .map(|t| format!("{}{}", config.proxy_bone_prefix, t.object));

    if let Some(Some(target)) = copy.kind.target_slot_mut() {
        target.object = rig.to_owned();

        if let Some(bone) = proxy_bone {
            target.subtarget = Some(bone);
        }
    }

    copy
}

/// Edit replacing a bone's constraints with those of the same-named reference bone
pub fn reference_constraints_edit(scene: &Scene, reference: &str, rig: &str, bone: &str, config: &RigConfig) -> Option<RigEdit> {
    let ref_bone = scene.armature(reference)?.bone(bone)?;
    scene.armature(rig)?.bone(bone)?;

    let constraints = ref_bone
        .constraints
        .iter()
        .map(|c| retarget_constraint(scene, c, rig, config))
        .collect();

    Some(RigEdit::ReplaceConstraints {
        bone: bone.to_owned(),
        constraints,
    })
}

/// Edit copying the reference bone's local rotation
pub fn reference_rotation_edit(scene: &Scene, reference: &str, rig: &str, bone: &str) -> Option<RigEdit> {
    let ref_bone = scene.armature(reference)?.bone(bone)?;
    scene.armature(rig)?.bone(bone)?;

    Some(RigEdit::SetRotation {
        bone: bone.to_owned(),
        rotation: ref_bone.rotation,
    })
}

pub fn reference_armature<'a>(scene: &'a Scene, config: &RigConfig) -> Option<&'a Object> {
    scene
        .object(&config.reference_armature)
        .filter(|o| o.is_armature())
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;
    use crate::scene::{ConstraintKind, ConstraintTarget};
    use crate::test_rig::*;

    #[rstest]
    fn bone_targets_point_back_at_rig(config: RigConfig, reference_scene: Scene) {
        let edit = reference_constraints_edit(&reference_scene, REFERENCE, RIG, "Bip01 Spine1", &config).unwrap();

        let RigEdit::ReplaceConstraints { constraints, .. } = edit else {
            panic!("expected constraint replacement");
        };

        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].target(), Some(&ConstraintTarget::bone(RIG, "Bip01 Pelvis")));
    }

    #[rstest]
    fn proxy_empty_targets_become_bones(config: RigConfig, reference_scene: Scene) {
        let edit = reference_constraints_edit(&reference_scene, REFERENCE, RIG, "Bip01 Clavicle.L", &config).unwrap();

        let RigEdit::ReplaceConstraints { constraints, .. } = edit else {
            panic!("expected constraint replacement");
        };

        let track = constraints
            .iter()
            .find(|c| matches!(c.kind, ConstraintKind::DampedTrack { .. }))
            .unwrap();
        assert_eq!(track.target(), Some(&ConstraintTarget::bone(RIG, "Bip01 Arm IK Target.L")));
    }

    #[rstest]
    fn missing_bones_produce_no_edit(config: RigConfig, reference_scene: Scene) {
        assert!(reference_constraints_edit(&reference_scene, REFERENCE, RIG, "Bip01 Head", &config).is_none());
        assert!(reference_rotation_edit(&reference_scene, REFERENCE, RIG, "Bip01 Nope").is_none());
    }

    #[rstest]
    fn rotation_edit_copies_reference_rotation(reference_scene: Scene) {
        let edit = reference_rotation_edit(&reference_scene, REFERENCE, RIG, "Bip01 Pelvis").unwrap();

        assert_eq!(edit, RigEdit::SetRotation {
            bone: "Bip01 Pelvis".to_owned(),
            rotation: reference_rotation("Bip01 Pelvis"),
        });
    }
}
