use super::{CommandError, Outcome};
use crate::host::HostContext;
use crate::scene::{Armature, Scene};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub const GROUP_SLOTS: RangeInclusive<u8> = 1..=9;

/// Bone name lists recalled by number keys. Not persisted.
#[derive(Clone, Debug, Default)]
pub struct SelectionGroups {
    groups: BTreeMap<u8, Vec<String>>,
}

fn check_slot(slot: u8) -> Result<u8, CommandError> {
    match GROUP_SLOTS.contains(&slot) {
        true => Ok(slot),
        false => Err(CommandError::InvalidGroup(slot)),
    }
}

impl SelectionGroups {
    pub fn new() -> SelectionGroups {
        SelectionGroups::default()
    }

    pub fn get(&self, slot: u8) -> Option<&[String]> {
        self.groups.get(&slot).map(Vec::as_slice)
    }

    /// Overwrites the slot with the given bone names
    pub fn assign<I, T>(&mut self, slot: u8, bones: I) -> Result<(), CommandError> where I: IntoIterator<Item = T>, T: Into<String> {
        let slot = check_slot(slot)?;
        self.groups.insert(slot, bones.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Deselects everything then selects the stored bones still present.
    /// An unassigned slot leaves the selection untouched and returns `None`.
    pub fn select(&self, slot: u8, armature: &mut Armature) -> Result<Option<usize>, CommandError> {
        let slot = check_slot(slot)?;

        let Some(names) = self.groups.get(&slot) else {
            return Ok(None);
        };

        armature.deselect_all();

        let mut selected = 0;
        for name in names {
            if let Some(bone) = armature.bone_mut(name) {
                bone.selected = true;
                selected += 1;
            }
        }

        Ok(Some(selected))
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}

fn posed_armature_name(scene: &Scene, ctx: &HostContext) -> Result<Option<String>, CommandError> {
    if !ctx.is_posing_in_viewport() {
        return Ok(None);
    }

    let obj = scene.active_object().ok_or(CommandError::NoActiveObject)?;
    match obj.is_armature() {
        true => Ok(Some(obj.name.to_owned())),
        false => Err(CommandError::NotAnArmature),
    }
}

pub fn assign_bone_group(scene: &Scene, groups: &mut SelectionGroups, slot: u8, ctx: &HostContext) -> Result<Outcome, CommandError> {
    let Some(name) = posed_armature_name(scene, ctx)? else {
        return Ok(Outcome::PassThrough);
    };

    let selected = scene
        .armature(&name)
        .map(|arm| arm.selected_bones().map(|b| b.name.to_owned()).collect::<Vec<_>>())
        .unwrap_or_default();

    groups.assign(slot, selected.iter().map(String::as_str))?;
    log::info!("Assigned bones to group {slot}: {selected:?}");

    Ok(Outcome::finished(format!("Assigned group {slot}")))
}

pub fn select_bone_group(scene: &mut Scene, groups: &SelectionGroups, slot: u8, ctx: &HostContext) -> Result<Outcome, CommandError> {
    let Some(name) = posed_armature_name(scene, ctx)? else {
        return Ok(Outcome::PassThrough);
    };

    let arm = scene.armature_mut(&name).ok_or(CommandError::NotAnArmature)?;

    match groups.select(slot, arm)? {
        Some(count) => log::info!("Selected {count} bone(s) from group {slot}"),
        None => log::info!("No bones assigned to group {slot}"),
    }

    Ok(Outcome::finished(format!("Selected group {slot}")))
}
