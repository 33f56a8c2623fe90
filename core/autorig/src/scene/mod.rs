mod action;
mod armature;
mod constraint;
mod io;

use crate::math::{Quat, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
pub use action::*;
pub use armature::*;
pub use constraint::*;
pub use io::*;

pub(crate) fn identity_rotation() -> Quat {
    Quat::identity()
}

pub(crate) fn zero_vector() -> Vector3 {
    Vector3::zeros()
}

pub(crate) fn unit_scale() -> Vector3 {
    Vector3::repeat(1.0)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ObjectData {
    #[default]
    Empty,
    Armature(Armature),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    #[serde(default)]
    pub action: Option<String>,
}

/// Mute flags captured by the mute command, consumed by restore
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedConstraintMutes {
    pub object: Vec<bool>,
    pub bones: BTreeMap<String, Vec<bool>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    #[serde(default)]
    pub data: ObjectData,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default = "zero_vector")]
    pub location: Vector3,
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vector3,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub animation: AnimationData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_constraint_mutes: Option<SavedConstraintMutes>,
}

impl Object {
    pub fn new_empty<T: Into<String>>(name: T) -> Object {
        Object {
            name: name.into(),
            data: ObjectData::Empty,
            constraints: Vec::new(),
            location: Vector3::zeros(),
            rotation: identity_rotation(),
            scale: unit_scale(),
            selected: false,
            animation: AnimationData::default(),
            saved_constraint_mutes: None,
        }
    }

    pub fn new_armature<T: Into<String>>(name: T, armature: Armature) -> Object {
        Object {
            data: ObjectData::Armature(armature),
            ..Object::new_empty(name)
        }
    }

    pub fn is_armature(&self) -> bool {
        matches!(self.data, ObjectData::Armature(_))
    }

    pub fn as_armature(&self) -> Option<&Armature> {
        match &self.data {
            ObjectData::Armature(arm) => Some(arm),
            _ => None,
        }
    }

    pub fn as_armature_mut(&mut self) -> Option<&mut Armature> {
        match &mut self.data {
            ObjectData::Armature(arm) => Some(arm),
            _ => None,
        }
    }

    pub fn action_name(&self) -> Option<&str> {
        self.animation.action.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default = "default_frame_start")]
    pub frame_start: i32,
    #[serde(default = "default_frame_end")]
    pub frame_end: i32,
    #[serde(default = "default_frame_start")]
    pub frame_current: i32,
    #[serde(default)]
    pub active_object: Option<String>,
}

fn default_frame_start() -> i32 {
    1
}

fn default_frame_end() -> i32 {
    250
}

impl Default for Scene {
    fn default() -> Scene {
        Scene {
            objects: Vec::new(),
            actions: Vec::new(),
            frame_start: default_frame_start(),
            frame_end: default_frame_end(),
            frame_current: default_frame_start(),
            active_object: None,
        }
    }
}

fn retarget_object(constraint: &mut Constraint, old_name: &str, new_name: &str) {
    if let Some(Some(target)) = constraint.kind.target_slot_mut() {
        if target.object == old_name {
            target.object = new_name.to_owned();
        }
    }
}

impl Scene {
    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn armature(&self, name: &str) -> Option<&Armature> {
        self.object(name).and_then(Object::as_armature)
    }

    pub fn armature_mut(&mut self, name: &str) -> Option<&mut Armature> {
        self.object_mut(name).and_then(Object::as_armature_mut)
    }

    pub fn active_object(&self) -> Option<&Object> {
        self.active_object
            .as_deref()
            .and_then(|name| self.object(name))
    }

    /// Adds an object, replacing any existing object with the same name
    pub fn link_object(&mut self, object: Object) {
        match self.objects.iter_mut().find(|o| o.name == object.name) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }

    pub fn remove_object(&mut self, name: &str) -> Option<Object> {
        let idx = self.objects.iter().position(|o| o.name == name)?;

        if self.active_object.as_deref() == Some(name) {
            self.active_object = None;
        }

        Some(self.objects.remove(idx))
    }

    /// Renames an object and every reference to it. Fails if the new name is taken.
    pub fn rename_object(&mut self, old_name: &str, new_name: &str) -> bool {
        if old_name == new_name {
            return self.object(old_name).is_some();
        }

        if self.object(new_name).is_some() {
            return false;
        }

        let Some(obj) = self.object_mut(old_name) else {
            return false;
        };
        obj.name = new_name.to_owned();

        if self.active_object.as_deref() == Some(old_name) {
            self.active_object = Some(new_name.to_owned());
        }

        for obj in self.objects.iter_mut() {
            for constraint in obj.constraints.iter_mut() {
                retarget_object(constraint, old_name, new_name);
            }

            if let Some(arm) = obj.as_armature_mut() {
                for constraint in arm.bones.iter_mut().flat_map(|b| b.constraints.iter_mut()) {
                    retarget_object(constraint, old_name, new_name);
                }
            }
        }

        true
    }

    pub fn select_only(&mut self, name: &str) {
        for obj in self.objects.iter_mut() {
            obj.selected = obj.name == name;
        }

        self.active_object = self.object(name).map(|o| o.name.to_owned());
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.iter_mut().find(|a| a.name == name)
    }

    pub fn object_action(&self, object: &str) -> Option<&Action> {
        self.object(object)
            .and_then(Object::action_name)
            .and_then(|name| self.action(name))
    }

    /// Returns a free action name, suffixing `.001`, `.002`... when taken
    pub fn unique_action_name(&self, base: &str) -> String {
        if self.action(base).is_none() {
            return base.to_owned();
        }

        (1..)
            .map(|i| format!("{base}.{i:03}"))
            .find(|name| self.action(name).is_none())
            .unwrap_or_else(|| base.to_owned())
    }

    /// Inserts an action, renaming it if the name is taken. Returns final name.
    pub fn add_action(&mut self, mut action: Action) -> String {
        action.name = self.unique_action_name(&action.name);
        let name = action.name.to_owned();
        self.actions.push(action);
        name
    }

    /// Copies an action under a new name and returns the name actually used
    pub fn clone_action(&mut self, source: &str, new_name: &str) -> Option<String> {
        let mut copy = self.action(source)?.clone();
        copy.name = new_name.to_owned();
        Some(self.add_action(copy))
    }

    pub fn remove_action(&mut self, name: &str) -> Option<Action> {
        let idx = self.actions.iter().position(|a| a.name == name)?;
        Some(self.actions.remove(idx))
    }

    pub fn rename_action(&mut self, old_name: &str, new_name: &str) -> Option<String> {
        if old_name == new_name {
            return self.action(old_name).map(|a| a.name.to_owned());
        }

        let unique = self.unique_action_name(new_name);
        self.action_mut(old_name)?.name = unique.to_owned();

        for obj in self.objects.iter_mut() {
            if obj.animation.action.as_deref() == Some(old_name) {
                obj.animation.action = Some(unique.to_owned());
            }
        }

        Some(unique)
    }

    pub fn assign_action(&mut self, object: &str, action: Option<&str>) -> bool {
        match self.object_mut(object) {
            Some(obj) => {
                obj.animation.action = action.map(str::to_owned);
                true
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;

    #[rstest]
    fn unique_action_name_suffixes() {
        let mut scene = Scene::default();
        scene.add_action(Action::new("Walk"));
        scene.add_action(Action::new("Walk"));

        assert_eq!(scene.unique_action_name("Walk"), "Walk.002");
        assert_eq!(scene.unique_action_name("Run"), "Run");
    }

    #[rstest]
    fn rename_action_updates_assignments() {
        let mut scene = Scene::default();
        scene.link_object(Object::new_empty("Thing"));
        scene.add_action(Action::new("Old"));
        scene.assign_action("Thing", Some("Old"));

        let name = scene.rename_action("Old", "New");

        assert_eq!(name.as_deref(), Some("New"));
        assert_eq!(scene.object("Thing").and_then(Object::action_name), Some("New"));
    }

    #[rstest]
    fn rename_object_follows_references() {
        let mut scene = Scene::default();
        let mut arm = Armature::new(vec![Bone::new("Hand", None, crate::math::Matrix::identity())]);
        arm.bones[0].constraints.push(Constraint::copy_rotation(ConstraintTarget::bone("Rig", "Hand")));

        scene.link_object(Object::new_armature("Rig", arm));
        scene.link_object(Object::new_empty("Other"));
        scene.active_object = Some("Rig".to_owned());

        assert!(!scene.rename_object("Rig", "Other"));
        assert!(scene.rename_object("Rig", "Bip01"));

        assert_eq!(scene.active_object.as_deref(), Some("Bip01"));
        let target = scene.armature("Bip01").unwrap().bones[0].constraints[0].target().unwrap();
        assert_eq!(target.object, "Bip01");
    }

    #[rstest]
    fn link_object_replaces_same_name() {
        let mut scene = Scene::default();
        scene.link_object(Object::new_empty("A"));
        scene.link_object(Object::new_armature("A", Armature::default()));

        assert_eq!(scene.objects.len(), 1);
        assert!(scene.object("A").unwrap().is_armature());
    }
}
