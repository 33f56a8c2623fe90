use super::{CommandError, Outcome};
use crate::RigConfig;
use crate::host::HostContext;
use crate::math::quat_components;
use crate::rig::{active_managed_skeleton, IkMapCache};
use crate::scene::{bone_data_path, Action, Scene, CHANNEL_ROTATION_QUATERNION};
use itertools::Itertools;

/// Active managed rig when the host is posing in the 3D view
fn posing_rig(scene: &Scene, ctx: &HostContext, config: &RigConfig) -> Option<String> {
    if !ctx.is_posing_in_viewport() {
        return None;
    }

    active_managed_skeleton(scene, config).map(|o| o.name.to_owned())
}

pub fn toggle_auto_posing_selected(scene: &mut Scene, ctx: &HostContext, config: &RigConfig) -> Result<Outcome, CommandError> {
    let Some(rig) = posing_rig(scene, ctx, config) else {
        return Ok(Outcome::PassThrough);
    };

    let arm = scene.armature_mut(&rig).ok_or(CommandError::NotAnArmature)?;
    let mut toggled = 0;

    for bone in arm.bones.iter_mut().filter(|b| b.selected) {
        bone.auto_posing = !bone.auto_posing;
        toggled += 1;
    }

    Ok(Outcome::finished(format!("Toggled auto-posing on {toggled} bone(s)")))
}

/// Disables auto-posing everywhere if any bone has it, otherwise enables it everywhere
pub fn toggle_auto_posing_all(scene: &mut Scene, ctx: &HostContext, config: &RigConfig) -> Result<Outcome, CommandError> {
    let Some(rig) = posing_rig(scene, ctx, config) else {
        return Ok(Outcome::PassThrough);
    };

    let arm = scene.armature_mut(&rig).ok_or(CommandError::NotAnArmature)?;
    let enable = !arm.bones.iter().any(|b| b.auto_posing);

    for bone in arm.bones.iter_mut() {
        bone.auto_posing = enable;
    }

    let state = if enable { "enabled" } else { "disabled" };
    Ok(Outcome::finished(format!("Auto-posing {state} for all bones")))
}

/// Keys `rotation_quaternion` of the bones at the scene's current frame,
/// creating an action for the object when it has none
pub fn insert_rotation_keys<'a, I>(scene: &mut Scene, object: &str, bones: I) -> usize where I: IntoIterator<Item = &'a str> {
    let frame = scene.frame_current as f32;

    let Some(arm) = scene.armature(object) else {
        return 0;
    };

    let keys = bones
        .into_iter()
        .unique()
        .filter_map(|name| arm.bone(name))
        .map(|b| (b.name.to_owned(), quat_components(&b.rotation)))
        .collect::<Vec<_>>();

    if keys.is_empty() {
        return 0;
    }

    let action_name = match scene.object_action(object) {
        Some(action) => action.name.to_owned(),
        None => {
            let name = scene.add_action(Action::new(format!("{object}Action")));
            scene.assign_action(object, Some(&name));
            name
        }
    };

    let Some(action) = scene.action_mut(&action_name) else {
        return 0;
    };

    for (bone, components) in keys.iter() {
        let data_path = bone_data_path(bone, CHANNEL_ROTATION_QUATERNION);

        for (index, value) in components.iter().enumerate() {
            action
                .fcurve_or_insert(&data_path, index)
                .insert(frame, *value);
        }
    }

    keys.len()
}

/// Keys the IK chain and auto-pose bones tied to the active IK target. Always
/// passes through so the host still keys the target itself.
pub fn autopose_insert_keyframe(scene: &mut Scene, ik_maps: &mut IkMapCache, ctx: &HostContext, config: &RigConfig) -> Result<Outcome, CommandError> {
    let Some(rig) = posing_rig(scene, ctx, config) else {
        return Ok(Outcome::PassThrough);
    };

    let Some(active) = scene
        .armature(&rig)
        .and_then(|a| a.active_bone())
        .map(|b| b.name.to_owned())
    else {
        return Ok(Outcome::PassThrough);
    };

    let Some(auto_pose_bones) = config.ik_target_autopose.get(&active) else {
        return Ok(Outcome::PassThrough);
    };

    let chain_bones = ik_maps
        .find_chain(scene, &rig, &active, config)
        .map(|chain| chain.chain_bones.to_owned())
        .unwrap_or_default();

    let keyed = insert_rotation_keys(
        scene,
        &rig,
        chain_bones
            .iter()
            .chain(auto_pose_bones.iter())
            .map(String::as_str),
    );

    log::debug!("Keyed {keyed} bone(s) along with \"{active}\"");
    Ok(Outcome::PassThrough)
}
