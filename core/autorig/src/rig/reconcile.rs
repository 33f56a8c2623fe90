//! Auto-pose state machine run on every scene change.
//!
//! A tick is planned against a read-only scene and produces two edit lists:
//! `continuous` edits issued on every tick of the current state (holding
//! auto-posed bones still, detaching ghost bones) and `transition` edits
//! issued once when a gesture starts or ends.

use super::*;
use crate::RigConfig;
use crate::host::HostContext;
use crate::scene::{Armature, Bone, Constraint, ConstraintTarget, ConstraintType, KinematicsMode, Scene};
use itertools::Itertools;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Idle -> Manipulating
    GestureStarted,
    /// Manipulating -> Idle
    GestureEnded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickPlan {
    pub armature: String,
    pub is_manipulated: bool,
    pub transition: Option<Transition>,
    pub continuous: Vec<RigEdit>,
    pub transition_edits: Vec<RigEdit>,
}

impl TickPlan {
    pub fn edit_count(&self) -> usize {
        self.continuous.len() + self.transition_edits.len()
    }

    pub fn into_edits(self) -> impl Iterator<Item = RigEdit> {
        self.continuous
            .into_iter()
            .chain(self.transition_edits)
    }
}

fn is_auto_posing(bone: &Bone, config: &RigConfig) -> bool {
    bone.auto_posing && config.is_auto_pose_bone(&bone.name)
}

/// Chains whose target bone currently asks for mixed kinematics
fn mixed_chains<'a>(scene: &'a Scene, ik_map: &'a IkMap) -> impl Iterator<Item = &'a IkChain> + 'a {
    ik_map.values().filter(move |chain| {
        scene
            .armature(&chain.target.armature)
            .and_then(|a| a.bone(&chain.target.bone))
            .is_some_and(|b| b.mode == KinematicsMode::MixedKinematics)
    })
}

/// Ghost bones paired with the bone they follow, if it still exists
fn ghost_pairs<'a>(arm: &'a Armature, config: &'a RigConfig) -> impl Iterator<Item = (&'a Bone, Option<&'a Bone>)> + 'a {
    arm.bones.iter().filter_map(move |bone| {
        config
            .ghost_target(&bone.name)
            .map(|target| (bone, arm.bone(target)))
    })
}

/// Keeps selected auto-posed bones in the reference stance while dragging
fn hold_auto_posed_bones(scene: &Scene, rig: &str, arm: &Armature, reference: &str, config: &RigConfig) -> Vec<RigEdit> {
    arm.selected_bones()
        .filter(|b| is_auto_posing(b, config))
        .filter_map(|b| reference_rotation_edit(scene, reference, rig, &b.name))
        .collect()
}

/// Detaches ghost bones from the solver and snaps them by hand
fn detach_ghosts(arm: &Armature, config: &RigConfig) -> Vec<RigEdit> {
    let mut edits = Vec::new();

    for (ghost, target) in ghost_pairs(arm, config) {
        if ghost.constraints.iter().any(|c| c.is_type(ConstraintType::ChildOf)) {
            edits.push(RigEdit::RemoveConstraintsOfType {
                bone: ghost.name.to_owned(),
                constraint_type: ConstraintType::ChildOf,
            });
        }

        if let Some(target) = target {
            edits.push(RigEdit::SetPoseMatrix {
                bone: ghost.name.to_owned(),
                matrix: target.matrix,
            });
        }
    }

    edits
}

/// Snaps ghosts onto their targets and parents them again with a single child-of
fn reattach_ghosts(rig: &str, arm: &Armature, config: &RigConfig) -> Vec<RigEdit> {
    let mut edits = Vec::new();

    for (ghost, target) in ghost_pairs(arm, config) {
        let Some(target) = target else {
            log::debug!("Ghost bone \"{}\" has no target, skipping", ghost.name);
            continue;
        };

        edits.push(RigEdit::SetPoseMatrix {
            bone: ghost.name.to_owned(),
            matrix: target.matrix,
        });
        edits.push(RigEdit::RemoveConstraintsOfType {
            bone: ghost.name.to_owned(),
            constraint_type: ConstraintType::ChildOf,
        });
        edits.push(RigEdit::AddConstraint {
            bone: ghost.name.to_owned(),
            constraint: Constraint::child_of(ConstraintTarget::bone(rig, target.name.as_str())),
        });
    }

    edits
}

fn gesture_ended(scene: &Scene, rig: &str, arm: &Armature, ik_map: &IkMap, has_reference: bool, config: &RigConfig) -> Vec<RigEdit> {
    let mut edits = reattach_ghosts(rig, arm, config);

    let auto_posed = match has_reference {
        true => arm
            .bones
            .iter()
            .filter(|b| is_auto_posing(b, config))
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>(),
        false => Vec::new(),
    };

    let mixed = mixed_chains(scene, ik_map).collect::<Vec<_>>();

    let to_freeze = auto_posed
        .iter()
        .copied()
        .chain(mixed
            .iter()
            .flat_map(|chain| chain.chain_bones.iter().map(String::as_str)))
        .unique()
        .collect::<Vec<_>>();

    edits.extend(visual_rotation_edits(arm, to_freeze));

    // Poses are frozen, reference constraints are no longer needed while idle
    edits.extend(auto_posed
        .iter()
        .map(|name| RigEdit::ClearConstraints { bone: name.to_string() }));

    for chain in mixed {
        edits.extend(ik_toggle_edits(scene, chain, false));
    }

    edits
}

fn gesture_started(scene: &Scene, rig: &str, arm: &Armature, ik_map: &IkMap, reference: Option<&str>, config: &RigConfig) -> Vec<RigEdit> {
    let mut edits = Vec::new();

    if let Some(reference) = reference {
        for bone in arm.bones.iter().filter(|b| is_auto_posing(b, config)) {
            edits.extend(reference_constraints_edit(scene, reference, rig, &bone.name, config));
            edits.extend(reference_rotation_edit(scene, reference, rig, &bone.name));
        }
    }

    for chain in mixed_chains(scene, ik_map) {
        edits.extend(ik_toggle_edits(scene, chain, true));
    }

    edits
}

/// Plans one tick for the active rig. Returns `None` when the active object
/// isn't a managed skeleton.
pub fn plan_tick(scene: &Scene, ctx: &HostContext, ik_map: &IkMap, was_manipulated: bool, config: &RigConfig) -> Option<TickPlan> {
    let rig = active_managed_skeleton(scene, config)?;
    let arm = rig.as_armature()?;
    let rig_name = rig.name.as_str();

    let is_manipulated = ctx.is_transforming();
    let reference = reference_armature(scene, config).map(|o| o.name.as_str());

    let mut continuous = Vec::new();

    if is_manipulated {
        if let Some(reference) = reference {
            continuous.extend(hold_auto_posed_bones(scene, rig_name, arm, reference, config));
        }

        continuous.extend(detach_ghosts(arm, config));
    }

    let transition = match (was_manipulated, is_manipulated) {
        (false, true) => Some(Transition::GestureStarted),
        (true, false) => Some(Transition::GestureEnded),
        _ => None,
    };

    let transition_edits = match transition {
        Some(Transition::GestureStarted) => gesture_started(scene, rig_name, arm, ik_map, reference, config),
        Some(Transition::GestureEnded) => gesture_ended(scene, rig_name, arm, ik_map, reference.is_some(), config),
        None => Vec::new(),
    };

    Some(TickPlan {
        armature: rig_name.to_owned(),
        is_manipulated,
        transition,
        continuous,
        transition_edits,
    })
}
