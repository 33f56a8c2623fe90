use super::*;
use crate::commands::{CommandError, Outcome};
use crate::host::{AssetProvider, BakeChannels, BakeRequest, Baker, ExportRequest, Exporter};
use crate::scene::{Action, Interpolation, Object, Scene};
use crate::{ExportProfile, ExportSettings};
use std::collections::HashSet;
use std::path::PathBuf;

/// Name the exporter expects on the root object
pub const EXPORT_OBJECT_NAME: &str = "Bip01";
pub const EXPORT_EXTENSION: &str = "nif";

pub const FIRST_PERSON_REFERENCE: &str = "1st Person Reference Armat";
pub const THIRD_PERSON_REFERENCE: &str = "3rd Person Reference Armat";
pub const THIRD_PERSON_BEAST_REFERENCE: &str = "3rd Person Khajiit Reference Armature";

/// Reference skeleton deciding which bone curves survive export
pub fn reference_skeleton_name(profile: ExportProfile, action_name: &str) -> &'static str {
    match profile {
        ExportProfile::FirstPerson => FIRST_PERSON_REFERENCE,
        ExportProfile::ThirdPerson if action_name.contains(BEAST_TAG) => THIRD_PERSON_BEAST_REFERENCE,
        ExportProfile::ThirdPerson => THIRD_PERSON_REFERENCE,
    }
}

/// Active object and the name of its assigned action
pub(crate) fn active_action(scene: &Scene) -> Result<(String, String), ExportError> {
    let obj = scene.active_object().ok_or(ExportError::NoActiveObject)?;

    let action = obj
        .action_name()
        .filter(|name| scene.action(name).is_some())
        .ok_or_else(|| ExportError::NoAction { object: obj.name.to_owned() })?;

    Ok((obj.name.to_owned(), action.to_owned()))
}

/// Whole frames spanned by the action's keys
pub(crate) fn key_frame_range(action: &Action) -> Result<(i32, i32), ExportError> {
    action
        .frame_range()
        .map(|(start, end)| (start.floor() as i32, end.floor() as i32))
        .ok_or_else(|| ExportError::NoKeyframes { action: action.name.to_owned() })
}

/// Working copy of an action assigned in place of the original. Remembers
/// enough to put the scene back if processing fails.
#[derive(Debug)]
pub(crate) struct ActionClone {
    pub object: String,
    pub original: String,
    pub clone: String,
    saved_range: (i32, i32),
    saved_selection: Vec<String>,
    saved_active: Option<String>,
}

impl ActionClone {
    pub fn create(scene: &mut Scene, object: &str, original: &str, clone_name: &str) -> Result<ActionClone, ExportError> {
        let clone = scene
            .clone_action(original, clone_name)
            .ok_or_else(|| ExportError::NoAction { object: object.to_owned() })?;

        scene.assign_action(object, Some(&clone));
        log::info!("Cloned \"{original}\" into \"{clone}\"");

        let saved_selection = scene
            .objects
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.name.to_owned())
            .collect();

        Ok(ActionClone {
            object: object.to_owned(),
            original: original.to_owned(),
            clone,
            saved_range: (scene.frame_start, scene.frame_end),
            saved_selection,
            saved_active: scene.active_object.to_owned(),
        })
    }

    /// Discards the clone and reassigns the original action
    pub fn rollback(self, scene: &mut Scene) {
        log::warn!("Discarding \"{}\", restoring \"{}\"", self.clone, self.original);

        scene.assign_action(&self.object, Some(&self.original));
        scene.remove_action(&self.clone);
        (scene.frame_start, scene.frame_end) = self.saved_range;

        for obj in scene.objects.iter_mut() {
            obj.selected = self.saved_selection.contains(&obj.name);
        }
        scene.active_object = self.saved_active.filter(|name| scene.object(name).is_some());
    }
}

/// Bakes pose then object channels of `object` into its current action and
/// forces linear interpolation on the result
pub(crate) fn bake_current_action(scene: &mut Scene, object: &str, range: (i32, i32), baker: &mut dyn Baker) -> Result<(), ExportError> {
    (scene.frame_start, scene.frame_end) = range;

    baker.bake(scene, &BakeRequest::new(object, range, BakeChannels::Pose))?;
    baker.bake(scene, &BakeRequest::new(object, range, BakeChannels::Object))?;

    let action_name = scene
        .object(object)
        .and_then(Object::action_name)
        .map(str::to_owned);

    if let Some(action) = action_name.and_then(|name| scene.action_mut(&name)) {
        action.set_interpolation(Interpolation::Linear);
    }

    Ok(())
}

/// Loads named rigs missing from the scene. Returns the names actually linked.
pub(crate) fn load_missing(scene: &mut Scene, assets: &mut dyn AssetProvider, names: &[&str]) -> Result<Vec<String>, ExportError> {
    let missing = names
        .iter()
        .copied()
        .filter(|name| scene.object(name).is_none())
        .collect::<Vec<_>>();

    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let loaded = assets
        .load_objects(&missing)
        .map_err(|err| ExportError::Assets { reason: err.to_string() })?;

    Ok(loaded.merge_into(scene))
}

/// Drops bone curves for bones the target skeleton doesn't have. Curves not
/// addressing a bone are always kept.
pub fn filter_bone_curves<F>(action: &mut Action, mut keep_bone: F) -> usize where F: FnMut(&str) -> bool {
    let before = action.fcurves.len();

    action
        .fcurves
        .retain(|curve| curve.bone_name().is_none_or(&mut keep_bone));

    before - action.fcurves.len()
}

fn load_reference(scene: &mut Scene, assets: &mut dyn AssetProvider, name: &str) -> Result<(), ExportError> {
    let loaded = assets
        .load_objects(&[name])
        .map_err(|err| ExportError::Assets { reason: err.to_string() })?;

    if !loaded.objects.iter().any(|o| o.name == name && o.is_armature()) {
        return Err(ExportError::ReferenceNotFound { name: name.to_owned() });
    }

    loaded.merge_into(scene);
    Ok(())
}

fn write_export(scene: &mut Scene, settings: &ExportSettings, clone: &ActionClone, reference: &str, exporter: &mut dyn Exporter) -> Result<PathBuf, ExportError> {
    let reference_bones = scene
        .armature(reference)
        .map(|arm| arm.bones.iter().map(|b| b.name.to_owned()).collect::<HashSet<_>>())
        .unwrap_or_default();
    let retained = settings.retained_bones();

    let action = scene
        .action_mut(&clone.clone)
        .ok_or_else(|| ExportError::NoAction { object: clone.object.to_owned() })?;

    let removed = filter_bone_curves(action, |bone| reference_bones.contains(bone) || retained.iter().any(|b| b == bone));
    log::debug!("Removed {removed} curve(s) not present on \"{reference}\"");

    decimate_action(action, settings.decimate_tolerance);

    let file_name = sanitize_filename(&remove_tags(&clone.clone));
    let path = settings
        .export_folder
        .join(format!("{file_name}.{EXPORT_EXTENSION}"));

    let export_name = match clone.object.starts_with(EXPORT_OBJECT_NAME) {
        true => clone.object.to_owned(),
        false => {
            if !scene.rename_object(&clone.object, EXPORT_OBJECT_NAME) {
                return Err(ExportError::NameTaken {
                    object: clone.object.to_owned(),
                    name: EXPORT_OBJECT_NAME.to_owned(),
                });
            }

            EXPORT_OBJECT_NAME.to_owned()
        }
    };

    scene.select_only(&export_name);

    let request = ExportRequest {
        object: export_name.to_owned(),
        action: clone.clone.to_owned(),
        path: path.to_owned(),
        use_selection: true,
        export_animations: true,
        extract_keyframe_data: true,
    };

    log::info!("Exporting animation to \"{}\"", path.display());
    let result = exporter
        .export(scene, &request)
        .map_err(|err| ExportError::Exporter {
            path: path.to_owned(),
            reason: err.to_string(),
        });

    if export_name != clone.object {
        scene.rename_object(&export_name, &clone.object);
    }

    result.map(|_| path)
}

fn process_clone(
    scene: &mut Scene,
    settings: &ExportSettings,
    clone: &ActionClone,
    bake_range: Option<(i32, i32)>,
    reference: &str,
    baker: &mut dyn Baker,
    assets: &mut dyn AssetProvider,
    exporter: &mut dyn Exporter,
) -> Result<PathBuf, ExportError> {
    if let Some(range) = bake_range {
        bake_current_action(scene, &clone.object, range, baker)?;
    }

    load_reference(scene, assets, reference)?;

    let result = write_export(scene, settings, clone, reference, exporter);

    // Reference skeleton never outlives the export
    scene.remove_object(reference);
    result
}

/// Bakes (for `[Raw]` actions) or copies (for `[Baked]` ones) the active
/// object's action, strips curves the target skeleton can't play, decimates
/// and hands the result to the exporter
pub fn export_animation(
    scene: &mut Scene,
    settings: &ExportSettings,
    baker: &mut dyn Baker,
    assets: &mut dyn AssetProvider,
    exporter: &mut dyn Exporter,
) -> Result<Outcome, CommandError> {
    let (object, original) = active_action(scene)?;

    if !scene.object(&object).is_some_and(Object::is_armature) {
        return Err(ExportError::NotAnArmature { object }.into());
    }

    let (clone_name, bake_range) = if has_baked_tag(&original) {
        (format!("{TEMP_PREFIX}{}", remove_tags(&original)), None)
    } else if has_raw_tag(&original) {
        let range = scene
            .action(&original)
            .ok_or_else(|| ExportError::NoAction { object: object.to_owned() })
            .and_then(key_frame_range)?;

        (replace_raw_with_baked(&original), Some(range))
    } else {
        return Err(ExportError::MissingTag { action: original }.into());
    };

    let reference = reference_skeleton_name(settings.export_as, &original);
    let clone = ActionClone::create(scene, &object, &original, &clone_name)?;

    match process_clone(scene, settings, &clone, bake_range, reference, baker, assets, exporter) {
        Ok(path) => {
            log::info!("Exported \"{}\" to \"{}\"", clone.clone, path.display());
            Ok(Outcome::finished("Animation exported successfully."))
        },
        Err(err) => {
            clone.rollback(scene);
            Err(err.into())
        }
    }
}
