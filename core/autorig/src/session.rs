use crate::RigConfig;
use crate::commands::SelectionGroups;
use crate::host::HostContext;
use crate::rig::*;
use crate::scene::{KinematicsMode, Scene};

/// State shared by every handler for the lifetime of the host process
#[derive(Debug, Default)]
pub struct RigSession {
    config: RigConfig,
    ik_maps: IkMapCache,
    groups: SelectionGroups,
    previous_is_manipulated: bool,
    guard: UpdateGuard,
}

impl RigSession {
    pub fn new(config: RigConfig) -> RigSession {
        RigSession {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn ik_maps(&self) -> &IkMapCache {
        &self.ik_maps
    }

    pub fn ik_maps_mut(&mut self) -> &mut IkMapCache {
        &mut self.ik_maps
    }

    pub fn groups(&self) -> &SelectionGroups {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut SelectionGroups {
        &mut self.groups
    }

    pub fn is_manipulating(&self) -> bool {
        self.previous_is_manipulated
    }

    /// Handle sharing this session's reentrancy counter
    pub fn update_guard(&self) -> UpdateGuard {
        self.guard.clone()
    }

    /// Scene change handler. Returns the number of edits applied.
    pub fn on_scene_changed(&mut self, scene: &mut Scene, ctx: &HostContext) -> usize {
        if self.guard.is_suppressed() {
            return 0;
        }

        let Some(rig) = active_managed_skeleton(scene, &self.config).map(|o| o.name.to_owned()) else {
            return 0;
        };

        let ik_map = self.ik_maps.get_or_build(scene, &rig, &self.config);
        let Some(plan) = plan_tick(scene, ctx, ik_map, self.previous_is_manipulated, &self.config) else {
            return 0;
        };

        if let Some(transition) = plan.transition {
            log::debug!("{transition:?} on \"{}\"", plan.armature);
            self.previous_is_manipulated = plan.is_manipulated;
        }

        let _suppress = self.guard.suppress();
        let armature = plan.armature.to_owned();
        apply_edits(scene, &armature, plan.into_edits())
    }

    /// Asset reload handler. Cached chains may point at replaced armatures.
    pub fn on_asset_loaded(&mut self) {
        self.ik_maps.clear();
        self.previous_is_manipulated = false;
    }

    pub fn set_kinematics_mode(&mut self, scene: &mut Scene, armature: &str, bone: &str, mode: KinematicsMode) -> bool {
        switch_kinematics_mode(scene, &mut self.ik_maps, &self.guard, armature, bone, mode, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;
    use crate::math::matrices_match;
    use crate::scene::{ConstraintTarget, ConstraintType};
    use crate::test_rig::*;

    fn ghost_child_ofs(scene: &Scene) -> usize {
        scene
            .armature(RIG)
            .unwrap()
            .bone("[Ghost] Bip01 Head")
            .unwrap()
            .constraints
            .iter()
            .filter(|c| c.is_type(ConstraintType::ChildOf))
            .count()
    }

    #[rstest]
    fn ghost_has_one_child_of_after_each_gesture(config: RigConfig, mut reference_scene: Scene) {
        let mut session = RigSession::new(config);

        for _ in 0..3 {
            session.on_scene_changed(&mut reference_scene, &dragging());
            session.on_scene_changed(&mut reference_scene, &dragging());
            assert_eq!(ghost_child_ofs(&reference_scene), 0);

            session.on_scene_changed(&mut reference_scene, &idle());
            assert_eq!(ghost_child_ofs(&reference_scene), 1);
        }

        let arm = reference_scene.armature(RIG).unwrap();
        let ghost = arm.bone("[Ghost] Bip01 Head").unwrap();
        let target = arm.bone("Bip01 Head").unwrap();

        let child_of = ghost
            .constraints
            .iter()
            .find(|c| c.is_type(ConstraintType::ChildOf))
            .unwrap();
        assert_eq!(child_of.target(), Some(&ConstraintTarget::bone(RIG, "Bip01 Head")));
        assert!(matrices_match(&ghost.matrix, &target.matrix, 1e-5));
    }

    #[rstest]
    fn steady_idle_ticks_apply_nothing(config: RigConfig, mut reference_scene: Scene) {
        let mut session = RigSession::new(config);

        session.on_scene_changed(&mut reference_scene, &dragging());
        assert!(session.on_scene_changed(&mut reference_scene, &idle()) > 0);

        for _ in 0..5 {
            assert_eq!(session.on_scene_changed(&mut reference_scene, &idle()), 0);
        }
    }

    #[rstest]
    fn gesture_flag_follows_transitions(config: RigConfig, mut rig_scene: Scene) {
        let mut session = RigSession::new(config);

        session.on_scene_changed(&mut rig_scene, &dragging());
        assert!(session.is_manipulating());

        session.on_scene_changed(&mut rig_scene, &idle());
        assert!(!session.is_manipulating());
    }

    #[rstest]
    fn suppressed_session_ignores_changes(config: RigConfig, mut reference_scene: Scene) {
        let mut session = RigSession::new(config);
        let guard = session.update_guard();

        let _suppress = guard.suppress();
        assert_eq!(session.on_scene_changed(&mut reference_scene, &dragging()), 0);
        assert!(!session.is_manipulating());
    }

    #[rstest]
    fn unmanaged_rig_is_untouched(config: RigConfig, mut reference_scene: Scene) {
        reference_scene.armature_mut(RIG).unwrap().bones.retain(|b| b.name != "Bip01 Bizarre Bone");
        let before = reference_scene.clone();

        let mut session = RigSession::new(config);
        assert_eq!(session.on_scene_changed(&mut reference_scene, &dragging()), 0);
        assert_eq!(reference_scene, before);
    }

    #[rstest]
    fn gesture_end_strips_auto_pose_constraints(config: RigConfig, mut reference_scene: Scene) {
        let mut session = RigSession::new(config);

        session.on_scene_changed(&mut reference_scene, &dragging());
        assert_eq!(reference_scene.armature(RIG).unwrap().bone("Bip01 Clavicle.L").unwrap().constraints.len(), 2);

        session.on_scene_changed(&mut reference_scene, &idle());
        assert!(reference_scene.armature(RIG).unwrap().bone("Bip01 Clavicle.L").unwrap().constraints.is_empty());
    }

    #[rstest]
    fn asset_load_resets_cache_and_flag(config: RigConfig, mut rig_scene: Scene) {
        let mut session = RigSession::new(config);
        session.on_scene_changed(&mut rig_scene, &dragging());
        assert!(session.ik_maps().contains(RIG));

        session.on_asset_loaded();

        assert!(!session.ik_maps().contains(RIG));
        assert!(!session.is_manipulating());
    }

    #[rstest]
    fn session_switches_chain_to_forward(config: RigConfig, mut rig_scene: Scene) {
        let mut session = RigSession::new(config);

        assert!(session.set_kinematics_mode(&mut rig_scene, RIG, "Bip01 Leg IK Target.L", KinematicsMode::ForwardKinematics));
        assert!(rig_scene.armature(RIG).unwrap().bone("Bip01 Calf.L").unwrap().constraints[0].mute);
    }
}
