use super::{apply_edits, RigEdit};
use crate::scene::{Armature, Scene};
use std::cell::Cell;
use std::rc::Rc;

/// Shared flag that mutes scene-change handling while pose data is being
/// written by this crate. Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct UpdateGuard {
    depth: Rc<Cell<u32>>,
}

impl UpdateGuard {
    pub fn new() -> UpdateGuard {
        UpdateGuard::default()
    }

    pub fn is_suppressed(&self) -> bool {
        self.depth.get() > 0
    }

    /// Suppresses handling until the returned value is dropped
    pub fn suppress(&self) -> SuppressUpdates {
        self.depth.set(self.depth.get() + 1);

        SuppressUpdates {
            depth: Rc::clone(&self.depth),
        }
    }
}

#[must_use = "updates are only suppressed while this value is alive"]
#[derive(Debug)]
pub struct SuppressUpdates {
    depth: Rc<Cell<u32>>,
}

impl Drop for SuppressUpdates {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Rotation edits that bake each bone's evaluated pose into its local rotation
pub fn visual_rotation_edits<'a, I>(armature: &Armature, bones: I) -> Vec<RigEdit> where I: IntoIterator<Item = &'a str> {
    bones
        .into_iter()
        .filter_map(|name| match armature.visual_rotation(name) {
            Some(rotation) => Some(RigEdit::SetRotation {
                bone: name.to_owned(),
                rotation,
            }),
            None => {
                log::debug!("No visual rotation for \"{name}\", leaving as is");
                None
            }
        })
        .collect()
}

/// Writes the constraint-resolved rotation of each bone into its local
/// rotation so constraints can be removed without the pose moving
pub fn freeze_visual_transform<'a, I>(scene: &mut Scene, armature: &str, bones: I, guard: &UpdateGuard) -> usize where I: IntoIterator<Item = &'a str> {
    let _suppress = guard.suppress();

    let Some(arm) = scene.armature(armature) else {
        return 0;
    };

    let edits = visual_rotation_edits(arm, bones);
    apply_edits(scene, armature, edits)
}
