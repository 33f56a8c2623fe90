use crate::math::{quat_components, Quat, Vector3};
use crate::scene::*;
use thiserror::Error as ThisError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakeChannels {
    Pose,
    Object,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BakeRequest {
    pub object: String,
    pub frame_start: i32,
    pub frame_end: i32,
    pub channels: BakeChannels,
    pub visual_keying: bool,
    /// Write into the object's current action instead of a new one
    pub use_current_action: bool,
}

impl BakeRequest {
    pub fn new<T: Into<String>>(object: T, (frame_start, frame_end): (i32, i32), channels: BakeChannels) -> BakeRequest {
        BakeRequest {
            object: object.into(),
            frame_start,
            frame_end,
            channels,
            visual_keying: true,
            use_current_action: true,
        }
    }
}

#[derive(Debug, ThisError)]
pub enum BakeError {
    #[error("Object \"{name}\" not found")]
    ObjectNotFound {
        name: String,
    },
    #[error("Object \"{name}\" is not an armature")]
    NotAnArmature {
        name: String,
    },
    #[error("Bake of \"{object}\" failed: {reason}")]
    Failed {
        object: String,
        reason: String,
    },
}

/// Samples simulated transforms into keyframes
pub trait Baker {
    fn bake(&mut self, scene: &mut Scene, request: &BakeRequest) -> Result<(), BakeError>;
}

/// Offline baker that samples the existing curves of the object's action and
/// falls back to the current channel values. Constraints are not solved.
#[derive(Debug, Default)]
pub struct CurveBaker;

struct Sample {
    data_path: String,
    index: usize,
    frame: f32,
    value: f32,
}

fn channel_values(location: &Vector3, rotation: &Quat, scale: &Vector3) -> [(&'static str, Vec<f32>); 3] {
    [
        (CHANNEL_LOCATION, location.iter().copied().collect()),
        (CHANNEL_ROTATION_QUATERNION, quat_components(rotation).to_vec()),
        (CHANNEL_SCALE, scale.iter().copied().collect()),
    ]
}

fn sample_channels(source: Option<&Action>, path_of: impl Fn(&str) -> String, values: [(&'static str, Vec<f32>); 3], frames: &[i32], out: &mut Vec<Sample>) {
    for (channel, current) in values {
        let data_path = path_of(channel);

        for (index, fallback) in current.into_iter().enumerate() {
            let curve = source.and_then(|a| a.fcurve(&data_path, index));

            for frame in frames.iter().map(|f| *f as f32) {
                let value = curve
                    .and_then(|c| c.evaluate(frame))
                    .unwrap_or(fallback);

                out.push(Sample {
                    data_path: data_path.to_owned(),
                    index,
                    frame,
                    value,
                });
            }
        }
    }
}

impl Baker for CurveBaker {
    fn bake(&mut self, scene: &mut Scene, request: &BakeRequest) -> Result<(), BakeError> {
        let object = scene
            .object(&request.object)
            .ok_or_else(|| BakeError::ObjectNotFound { name: request.object.to_owned() })?;

        let frames = (request.frame_start..=request.frame_end).collect::<Vec<_>>();
        let source = scene.object_action(&object.name);
        let mut samples = Vec::new();

        match request.channels {
            BakeChannels::Pose => {
                let arm = object
                    .as_armature()
                    .ok_or_else(|| BakeError::NotAnArmature { name: object.name.to_owned() })?;

                for bone in arm.bones.iter() {
                    sample_channels(
                        source,
                        |channel| bone_data_path(&bone.name, channel),
                        channel_values(&bone.location, &bone.rotation, &bone.scale),
                        &frames,
                        &mut samples,
                    );
                }
            },
            BakeChannels::Object => {
                sample_channels(
                    source,
                    str::to_owned,
                    channel_values(&object.location, &object.rotation, &object.scale),
                    &frames,
                    &mut samples,
                );
            }
        }

        let current = object.action_name().map(str::to_owned);
        let action_name = match current {
            Some(name) if request.use_current_action && scene.action(&name).is_some() => name,
            _ => {
                let name = scene.add_action(Action::new(format!("{}Action", request.object)));
                scene.assign_action(&request.object, Some(&name));
                name
            }
        };

        let Some(action) = scene.action_mut(&action_name) else {
            return Err(BakeError::Failed {
                object: request.object.to_owned(),
                reason: format!("action \"{action_name}\" disappeared"),
            });
        };

        log::debug!("Baking {} samples of \"{}\" into \"{action_name}\"", samples.len(), request.object);

        for sample in samples {
            action
                .fcurve_or_insert(&sample.data_path, sample.index)
                .insert(sample.frame, sample.value);
        }

        Ok(())
    }
}
