use crate::RigConfig;
use crate::scene::{Object, Scene};

/// Whether the object is an armature carrying the sentinel bone
pub fn is_managed_skeleton(object: &Object, config: &RigConfig) -> bool {
    object
        .as_armature()
        .is_some_and(|arm| arm.contains_bone(&config.sentinel_bone))
}

/// Active object if it's a managed skeleton
pub fn active_managed_skeleton<'a>(scene: &'a Scene, config: &RigConfig) -> Option<&'a Object> {
    scene
        .active_object()
        .filter(|obj| is_managed_skeleton(obj, config))
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;
    use crate::math::Matrix;
    use crate::scene::{Armature, Bone};

    #[rstest]
    fn sentinel_bone_marks_managed_skeleton() {
        let config = RigConfig::default();
        let managed = Object::new_armature("Rig", Armature::new(vec![
            Bone::new(config.sentinel_bone.as_str(), None, Matrix::identity()),
        ]));
        let plain = Object::new_armature("Other", Armature::new(vec![
            Bone::new("Bip01 Pelvis", None, Matrix::identity()),
        ]));

        assert!(is_managed_skeleton(&managed, &config));
        assert!(!is_managed_skeleton(&plain, &config));
        assert!(!is_managed_skeleton(&Object::new_empty("Empty"), &config));
    }

    #[rstest]
    fn active_object_must_be_managed() {
        let config = RigConfig::default();
        let mut scene = Scene::default();
        scene.link_object(Object::new_armature("Other", Armature::default()));
        scene.active_object = Some("Other".to_owned());

        assert!(active_managed_skeleton(&scene, &config).is_none());
    }
}
