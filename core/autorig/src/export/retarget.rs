use super::*;
use crate::commands::{CommandError, Outcome};
use crate::host::{AssetProvider, BakeChannels, BakeRequest, Baker};
use crate::scene::Scene;
use std::collections::HashSet;

pub const BEAST_DRIVER_ARMATURE: &str = "Khajiit Retarget Driver Armature";
pub const BEAST_ARMATURE: &str = "Khajiit Armature";
pub const BEAST_DEFAULT_STANCE: &str = "Khajiit Default Stance";
pub const BEAST_ACTION_PREFIX: &str = "[Baked][Beast] Beast ";

fn require_armature(scene: &Scene, name: &str) -> Result<(), ExportError> {
    match scene.object(name).is_some_and(|o| o.is_armature()) {
        true => Ok(()),
        false => Err(ExportError::RigNotFound { name: name.to_owned() }),
    }
}

/// Drives the beast rig with the baked clone and bakes the result onto it.
/// Returns the name of the beast action.
fn bake_onto_beast(scene: &mut Scene, clone: &ActionClone, range: (i32, i32), baker: &mut dyn Baker) -> Result<String, ExportError> {
    require_armature(scene, BEAST_DRIVER_ARMATURE)?;
    require_armature(scene, BEAST_ARMATURE)?;

    if scene.action(BEAST_DEFAULT_STANCE).is_none() {
        return Err(ExportError::StanceNotFound { name: BEAST_DEFAULT_STANCE.to_owned() });
    }

    scene.assign_action(BEAST_DRIVER_ARMATURE, Some(&clone.clone));
    scene.assign_action(BEAST_ARMATURE, Some(BEAST_DEFAULT_STANCE));
    scene.select_only(BEAST_ARMATURE);

    // Pose goes into a fresh action so the stance itself stays untouched
    let pose = BakeRequest {
        use_current_action: false,
        ..BakeRequest::new(BEAST_ARMATURE, range, BakeChannels::Pose)
    };
    baker.bake(scene, &pose)?;
    baker.bake(scene, &BakeRequest::new(BEAST_ARMATURE, range, BakeChannels::Object))?;

    let baked = scene
        .object_action(BEAST_ARMATURE)
        .map(|a| a.name.to_owned())
        .ok_or_else(|| ExportError::NoAction { object: BEAST_ARMATURE.to_owned() })?;

    let name = format!("{BEAST_ACTION_PREFIX}{}", remove_tags(&clone.original));
    let name = scene.rename_action(&baked, &name).unwrap_or(baked);

    let markers = scene
        .action(&clone.original)
        .map(|a| a.markers.to_owned())
        .unwrap_or_default();

    if let Some(action) = scene.action_mut(&name) {
        action.markers.extend(markers);
    }

    Ok(name)
}

/// Action assignments of the beast rigs before the transfer touched them
struct RigActions {
    assigned: Vec<(String, Option<String>)>,
    actions: HashSet<String>,
}

impl RigActions {
    fn capture(scene: &Scene, rigs: &[&str]) -> RigActions {
        let assigned = rigs
            .iter()
            .filter_map(|name| scene.object(name))
            .map(|o| (o.name.to_owned(), o.action_name().map(str::to_owned)))
            .collect();

        RigActions {
            assigned,
            actions: scene.actions.iter().map(|a| a.name.to_owned()).collect(),
        }
    }

    /// Reassigns previous actions and drops actions created since the capture
    fn restore(self, scene: &mut Scene) {
        for (rig, action) in self.assigned.iter() {
            scene.assign_action(rig, action.as_deref());
        }

        scene.actions.retain(|a| self.actions.contains(&a.name));
    }
}

/// Bakes the active `[Raw]` action, then retargets it onto the beast skeleton
/// through the driver rig, loading both rigs when absent
pub fn transfer_to_beasts(scene: &mut Scene, baker: &mut dyn Baker, assets: &mut dyn AssetProvider) -> Result<Outcome, CommandError> {
    let (object, original) = active_action(scene)?;

    if !has_raw_tag(&original) {
        return Err(ExportError::MissingRawTag { action: original }.into());
    }

    let range = scene
        .action(&original)
        .ok_or_else(|| ExportError::NoAction { object: object.to_owned() })
        .and_then(key_frame_range)?;

    let clone = ActionClone::create(scene, &object, &original, &replace_raw_with_baked(&original))?;

    if let Err(err) = bake_current_action(scene, &object, range, baker) {
        clone.rollback(scene);
        return Err(err.into());
    }

    let rig_actions = RigActions::capture(scene, &[BEAST_DRIVER_ARMATURE, BEAST_ARMATURE]);

    let linked = match load_missing(scene, assets, &[BEAST_DRIVER_ARMATURE, BEAST_ARMATURE]) {
        Ok(linked) => linked,
        Err(err) => {
            clone.rollback(scene);
            return Err(err.into());
        }
    };

    match bake_onto_beast(scene, &clone, range, baker) {
        Ok(name) => {
            log::info!("Transferred \"{original}\" to \"{name}\"");
            Ok(Outcome::finished("Transfer to Beasts completed successfully."))
        },
        Err(err) => {
            for name in linked.iter() {
                scene.remove_object(name);
            }

            rig_actions.restore(scene);
            clone.rollback(scene);
            Err(err.into())
        }
    }
}
