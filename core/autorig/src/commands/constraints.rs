use super::{CommandError, Outcome};
use crate::scene::{Constraint, Object, SavedConstraintMutes, Scene};

fn mute_flags(constraints: &[Constraint]) -> Vec<bool> {
    constraints.iter().map(|c| c.mute).collect()
}

fn restore_flags(constraints: &mut [Constraint], flags: &[bool]) {
    for (constraint, mute) in constraints.iter_mut().zip(flags) {
        constraint.mute = *mute;
    }
}

fn active_armature(scene: &mut Scene) -> Result<&mut Object, CommandError> {
    let name = scene
        .active_object
        .to_owned()
        .ok_or(CommandError::NoActiveObject)?;

    let obj = scene.object_mut(&name).ok_or(CommandError::NoActiveObject)?;
    match obj.is_armature() {
        true => Ok(obj),
        false => Err(CommandError::NotAnArmature),
    }
}

/// Mutes every object and bone constraint, keeping a snapshot of the previous
/// flags on the object. Only one snapshot may exist at a time.
pub fn mute_constraints(scene: &mut Scene) -> Result<Outcome, CommandError> {
    let obj = active_armature(scene)?;

    if obj.saved_constraint_mutes.is_some() {
        return Err(CommandError::AlreadyMuted);
    }

    let mut saved = SavedConstraintMutes {
        object: mute_flags(&obj.constraints),
        ..Default::default()
    };

    for constraint in obj.constraints.iter_mut() {
        constraint.mute = true;
    }

    if let Some(arm) = obj.as_armature_mut() {
        for bone in arm.bones.iter_mut() {
            saved.bones.insert(bone.name.to_owned(), mute_flags(&bone.constraints));

            for constraint in bone.constraints.iter_mut() {
                constraint.mute = true;
            }
        }
    }

    log::info!("Muted constraints on \"{}\"", obj.name);
    obj.saved_constraint_mutes = Some(saved);

    Ok(Outcome::finished("All constraints muted and states saved."))
}

/// Puts back the mute flags saved by [`mute_constraints`] and drops the snapshot
pub fn restore_constraints(scene: &mut Scene) -> Result<Outcome, CommandError> {
    let obj = active_armature(scene)?;
    let saved = obj
        .saved_constraint_mutes
        .take()
        .ok_or(CommandError::NothingToRestore)?;

    restore_flags(&mut obj.constraints, &saved.object);

    if let Some(arm) = obj.as_armature_mut() {
        for (name, flags) in saved.bones.iter() {
            match arm.bone_mut(name) {
                Some(bone) => restore_flags(&mut bone.constraints, flags),
                None => log::debug!("Bone \"{name}\" no longer exists, skipping restore"),
            }
        }
    }

    log::info!("Restored constraints on \"{}\"", obj.name);
    Ok(Outcome::finished("Constraints restored to their previous states."))
}
