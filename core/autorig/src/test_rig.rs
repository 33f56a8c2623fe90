//! Rig, scene and host fixtures shared by unit tests

use crate::RigConfig;
use crate::host::{BakeError, BakeRequest, Baker, CurveBaker, ExportRequest, Exporter, HostContext, InteractionMode, ModalOperator};
use crate::math::{Matrix, Quat, Vector3};
use crate::scene::*;
use rstest::*;
use std::error::Error;

pub const RIG: &str = "Bip01";
pub const REFERENCE: &str = "Autopose Reference Armature";
pub const PROXY_EMPTY: &str = "Arm IK Target.L";

fn at(x: f32, y: f32, z: f32) -> Matrix {
    Matrix::new_translation(&Vector3::new(x, y, z))
}

fn bone(name: &str, parent: Option<&str>, pos: Matrix) -> Bone {
    Bone::new(name, parent, pos)
}

fn rig_bone(bone_name: &str) -> ConstraintTarget {
    ConstraintTarget::bone(RIG, bone_name)
}

fn arm_bones(side: &str, x: f32) -> Vec<Bone> {
    let target = format!("Bip01 Arm IK Target.{side}");

    vec![
        bone(&format!("Bip01 Clavicle.{side}"), Some("Bip01 Spine2"), at(0.1 * x, 0.0, 1.5)),
        bone(&format!("Bip01 UpperArm.{side}"), Some(&format!("Bip01 Clavicle.{side}")), at(0.2 * x, 0.0, 1.5)),
        bone(&format!("Bip01 Forearm.{side}"), Some(&format!("Bip01 UpperArm.{side}")), at(0.5 * x, 0.0, 1.5))
            .with_constraint(Constraint::inverse_kinematics(rig_bone(&target), 2)),
        bone(&format!("Bip01 Hand.{side}"), Some(&format!("Bip01 Forearm.{side}")), at(0.8 * x, 0.0, 1.5))
            .with_constraint(Constraint::copy_rotation(rig_bone(&target))),
        bone(&target, Some("Bip01 Bizarre Bone"), at(0.8 * x, 0.0, 1.5)),
    ]
}

fn leg_bones(side: &str, x: f32) -> Vec<Bone> {
    let target = format!("Bip01 Leg IK Target.{side}");

    vec![
        bone(&format!("Bip01 Thigh.{side}"), Some("Bip01 Pelvis"), at(0.1 * x, 0.0, 0.9)),
        bone(&format!("Bip01 Calf.{side}"), Some(&format!("Bip01 Thigh.{side}")), at(0.1 * x, 0.0, 0.5))
            .with_constraint(Constraint::inverse_kinematics(rig_bone(&target), 2)),
        bone(&target, Some("Bip01 Bizarre Bone"), at(0.1 * x, 0.0, 0.1)),
    ]
}

pub fn biped() -> Armature {
    let mut bones = vec![
        bone("Bip01 Bizarre Bone", None, Matrix::identity()),
        bone("Bip01 Pelvis", Some("Bip01 Bizarre Bone"), at(0.0, 0.0, 1.0)),
        bone("Bip01 Spine1", Some("Bip01 Pelvis"), at(0.0, 0.0, 1.2)),
        bone("Bip01 Spine2", Some("Bip01 Spine1"), at(0.0, 0.0, 1.4)),
        bone("Bip01 Head", Some("Bip01 Spine2"), at(0.0, 0.0, 1.7)),
        bone("[Ghost] Bip01 Head", Some("Bip01 Bizarre Bone"), at(0.0, 0.0, 1.7))
            .with_constraint(Constraint::child_of(rig_bone("Bip01 Head"))),
    ];

    bones.extend(arm_bones("L", 1.0));
    bones.extend(arm_bones("R", -1.0));
    bones.extend(leg_bones("L", 1.0));
    bones.extend(leg_bones("R", -1.0));

    let mut arm = Armature::new(bones);
    arm.evaluate_forward();
    arm
}

pub fn reference_rotation(bone_name: &str) -> Quat {
    let angle = 0.1 * (bone_name.len() as f32);
    Quat::from_axis_angle(&Vector3::x_axis(), angle)
}

/// Reference armature carrying constraints for every auto-pose bone
pub fn reference_armature(config: &RigConfig) -> Armature {
    let bones = config
        .auto_pose_bones()
        .map(|name| {
            let mut b = bone(name, None, Matrix::identity());
            b.rotation = reference_rotation(name);
            b.constraints.push(Constraint::copy_rotation(ConstraintTarget::bone(REFERENCE, "Bip01 Pelvis")));

            if name == "Bip01 Clavicle.L" {
                b.constraints.push(Constraint::new("Track", ConstraintKind::DampedTrack {
                    target: Some(ConstraintTarget {
                        object: PROXY_EMPTY.to_owned(),
                        subtarget: None,
                    }),
                    track_axis: TrackAxis::Y,
                }));
            }

            b
        })
        .collect();

    Armature::new(bones)
}

#[fixture]
pub fn config() -> RigConfig {
    RigConfig::default()
}

#[fixture]
pub fn rig_scene() -> Scene {
    let mut scene = Scene::default();
    scene.link_object(Object::new_armature(RIG, biped()));
    scene.active_object = Some(RIG.to_owned());
    scene
}

#[fixture]
pub fn reference_scene(config: RigConfig) -> Scene {
    let mut scene = rig_scene();
    scene.link_object(Object::new_armature(REFERENCE, reference_armature(&config)));
    scene.link_object(Object::new_empty(PROXY_EMPTY));
    scene
}

pub fn idle() -> HostContext {
    HostContext {
        mode: InteractionMode::Pose,
        ..Default::default()
    }
}

pub fn dragging() -> HostContext {
    HostContext {
        modal_operators: vec![ModalOperator::Translate],
        ..idle()
    }
}

pub fn select(scene: &mut Scene, bones: &[&str]) {
    let arm = scene.armature_mut(RIG).unwrap();
    for b in arm.bones.iter_mut() {
        b.selected = bones.contains(&b.name.as_str());
    }
}

pub fn selected(scene: &Scene) -> Vec<String> {
    scene
        .armature(RIG)
        .unwrap()
        .selected_bones()
        .map(|b| b.name.to_owned())
        .collect()
}

pub const WALK_RIG: &str = "Walk Rig";
pub const RAW_WALK: &str = "[Raw] Walk";

/// Exporter double that records requests and the objects it could see
#[derive(Debug, Default)]
pub struct RecordingExporter {
    pub requests: Vec<ExportRequest>,
    pub exported_names: Vec<String>,
    pub fail: bool,
}

impl Exporter for RecordingExporter {
    fn export(&mut self, scene: &Scene, request: &ExportRequest) -> Result<(), Box<dyn Error>> {
        self.requests.push(request.to_owned());

        if let Some(obj) = scene.object(&request.object) {
            self.exported_names.push(obj.name.to_owned());
        }

        match self.fail {
            true => Err("disk full".into()),
            false => Ok(()),
        }
    }
}

/// Baker that must never be reached
pub struct FailingBaker;

impl Baker for FailingBaker {
    fn bake(&mut self, _scene: &mut Scene, request: &BakeRequest) -> Result<(), BakeError> {
        Err(BakeError::Failed {
            object: request.object.to_owned(),
            reason: "unexpected bake".to_owned(),
        })
    }
}

/// Bakes like `CurveBaker` except for one object
pub struct FailOnObject {
    pub object: &'static str,
}

impl Baker for FailOnObject {
    fn bake(&mut self, scene: &mut Scene, request: &BakeRequest) -> Result<(), BakeError> {
        match request.object == self.object {
            true => Err(BakeError::Failed {
                object: request.object.to_owned(),
                reason: "solver diverged".to_owned(),
            }),
            false => CurveBaker.bake(scene, request),
        }
    }
}

fn walk_rig() -> Armature {
    let mut arm = Armature::new(vec![
        bone("Bip01 Bizarre Bone", None, Matrix::identity()),
        bone("Bip01 Spine1", Some("Bip01 Bizarre Bone"), at(0.0, 0.0, 1.2)),
        bone("Bip01 Tail", Some("Bip01 Bizarre Bone"), at(0.0, -0.2, 0.9)),
    ]);
    arm.evaluate_forward();
    arm
}

/// Rig with a `[Raw]` action keyed from frame 1 to 30
#[fixture]
pub fn walk_scene() -> Scene {
    let mut scene = Scene::default();
    scene.link_object(Object::new_armature(WALK_RIG, walk_rig()));
    scene.active_object = Some(WALK_RIG.to_owned());

    let mut action = Action::new(RAW_WALK);
    for (bone_name, offset) in [("Bip01 Spine1", 0.0), ("Bip01 Tail", 0.5)] {
        let curve = action.fcurve_or_insert(&bone_data_path(bone_name, CHANNEL_LOCATION), 0);
        curve.insert(1.0, offset);
        curve.insert(15.5, offset + 1.0);
        curve.insert(30.0, offset);
    }

    let root = action.fcurve_or_insert(CHANNEL_LOCATION, 0);
    root.insert(1.0, 0.0);
    root.insert(30.0, 3.0);

    scene.add_action(action);
    scene.assign_action(WALK_RIG, Some(RAW_WALK));
    scene
}

/// Asset library holding the first person reference skeleton
#[fixture]
pub fn reference_library() -> Scene {
    let mut lib = Scene::default();
    lib.link_object(Object::new_armature("1st Person Reference Armat", Armature::new(vec![
        bone("Bip01 Spine1", None, Matrix::identity()),
    ])));
    lib
}

/// Asset library holding the beast driver and target rigs
#[fixture]
pub fn beast_library() -> Scene {
    let mut lib = Scene::default();
    lib.link_object(Object::new_armature("Khajiit Retarget Driver Armature", walk_rig()));
    lib.link_object(Object::new_armature("Khajiit Armature", walk_rig()));

    let mut stance = Action::new("Khajiit Default Stance");
    stance
        .fcurve_or_insert(&bone_data_path("Bip01 Tail", CHANNEL_ROTATION_QUATERNION), 0)
        .insert(1.0, 1.0);

    lib.add_action(stance);
    lib.assign_action("Khajiit Armature", Some("Khajiit Default Stance"));
    lib
}
