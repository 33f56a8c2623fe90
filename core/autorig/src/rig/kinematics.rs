use super::{apply_edits, freeze_visual_transform, IkChain, IkMapCache, RigEdit, UpdateGuard};
use crate::RigConfig;
use crate::scene::{ConstraintType, KinematicsMode, Scene};

/// Mute edits switching a chain between IK driven and free FK evaluation
pub fn ik_toggle_edits(scene: &Scene, chain: &IkChain, enable: bool) -> Vec<RigEdit> {
    let mut edits = Vec::new();

    let Some(arm) = scene.armature(&chain.armature) else {
        return edits;
    };

    let root_ik = arm
        .bone(&chain.root)
        .and_then(|b| b.constraints.iter().position(|c| c.is_type(ConstraintType::InverseKinematics)));

    if let Some(index) = root_ik {
        edits.push(RigEdit::SetConstraintMute {
            bone: chain.root.to_owned(),
            index,
            mute: !enable,
        });
    }

    if let Some(leaf) = chain.leaf.as_deref().and_then(|l| arm.bone(l)) {
        let target_bone = chain.target.bone.as_str();

        edits.extend(leaf
            .constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| c.subtarget() == Some(target_bone))
            .map(|(index, _)| RigEdit::SetConstraintMute {
                bone: leaf.name.to_owned(),
                index,
                mute: !enable,
            }));
    }

    edits
}

/// Mutes or unmutes the chain's IK constraint and the leaf constraints
/// aiming at the same target. Pose is not preserved here.
pub fn toggle_ik(scene: &mut Scene, chain: &IkChain, enable: bool) -> usize {
    let edits = ik_toggle_edits(scene, chain, enable);
    apply_edits(scene, &chain.armature, edits)
}

/// Stores a new kinematics mode on a bone and, when the bone drives an IK
/// chain, switches the chain accordingly. Forward kinematics keeps the last
/// IK solved pose by freezing the chain before muting.
pub fn switch_kinematics_mode(
    scene: &mut Scene,
    ik_maps: &mut IkMapCache,
    guard: &UpdateGuard,
    armature: &str,
    bone: &str,
    mode: KinematicsMode,
    config: &RigConfig,
) -> bool {
    let Some(target) = scene.armature_mut(armature).and_then(|a| a.bone_mut(bone)) else {
        return false;
    };

    target.mode = mode;

    ik_maps.get_or_build(scene, armature, config);
    if !ik_maps.is_chain_target(armature, bone) {
        return true;
    }

    let Some(chain) = ik_maps.find_chain(scene, armature, bone, config).cloned() else {
        return true;
    };

    match mode {
        KinematicsMode::InverseKinematics => {
            log::info!("IK enabled for chain \"{}\"", chain.root);
            toggle_ik(scene, &chain, true);
        },
        KinematicsMode::ForwardKinematics => {
            log::info!("FK enabled for chain \"{}\"", chain.root);
            freeze_visual_transform(scene, &chain.armature, chain.chain_bones.iter().map(String::as_str), guard);
            toggle_ik(scene, &chain, false);
        },
        KinematicsMode::MixedKinematics => {}
    }

    true
}
