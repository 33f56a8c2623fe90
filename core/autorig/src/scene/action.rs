use serde::{Deserialize, Serialize};

pub const CHANNEL_LOCATION: &str = "location";
pub const CHANNEL_ROTATION_QUATERNION: &str = "rotation_quaternion";
pub const CHANNEL_SCALE: &str = "scale";

pub fn bone_data_path(bone: &str, channel: &str) -> String {
    format!("pose.bones[\"{bone}\"].{channel}")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn new(frame: f32, value: f32) -> Keyframe {
        Keyframe {
            frame,
            value,
            interpolation: Interpolation::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub data_path: String,
    #[serde(default)]
    pub array_index: usize,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl FCurve {
    pub fn new<T: Into<String>>(data_path: T, array_index: usize) -> FCurve {
        FCurve {
            data_path: data_path.into(),
            array_index,
            keyframes: Vec::new(),
        }
    }

    /// Bone addressed by the data path, i.e. the first quoted string
    pub fn bone_name(&self) -> Option<&str> {
        if !self.data_path.contains('"') {
            return None;
        }

        self.data_path.split('"').nth(1)
    }

    /// Inserts a key, replacing any key already on that frame
    pub fn insert(&mut self, frame: f32, value: f32) {
        match self.keyframes.iter().position(|k| k.frame >= frame) {
            Some(idx) if self.keyframes[idx].frame == frame => self.keyframes[idx].value = value,
            Some(idx) => self.keyframes.insert(idx, Keyframe::new(frame, value)),
            None => self.keyframes.push(Keyframe::new(frame, value)),
        }
    }

    /// Samples the curve. Bezier segments are sampled as linear.
    pub fn evaluate(&self, frame: f32) -> Option<f32> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;

        if frame <= first.frame {
            return Some(first.value);
        }

        if frame >= last.frame {
            return Some(last.value);
        }

        self.keyframes
            .windows(2)
            .find(|w| frame >= w[0].frame && frame <= w[1].frame)
            .map(|w| {
                let (a, b) = (&w[0], &w[1]);
                match a.interpolation {
                    Interpolation::Constant => a.value,
                    _ if b.frame == a.frame => b.value,
                    _ => a.value + (b.value - a.value) * ((frame - a.frame) / (b.frame - a.frame)),
                }
            })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    pub frame: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

impl Action {
    pub fn new<T: Into<String>>(name: T) -> Action {
        Action {
            name: name.into(),
            fcurves: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn fcurve(&self, data_path: &str, array_index: usize) -> Option<&FCurve> {
        self.fcurves
            .iter()
            .find(|c| c.data_path == data_path && c.array_index == array_index)
    }

    pub fn fcurve_or_insert(&mut self, data_path: &str, array_index: usize) -> &mut FCurve {
        let idx = match self.fcurves.iter().position(|c| c.data_path == data_path && c.array_index == array_index) {
            Some(idx) => idx,
            None => {
                self.fcurves.push(FCurve::new(data_path, array_index));
                self.fcurves.len() - 1
            }
        };

        &mut self.fcurves[idx]
    }

    /// Smallest and largest key frame across all curves
    pub fn frame_range(&self) -> Option<(f32, f32)> {
        self.fcurves
            .iter()
            .flat_map(|c| c.keyframes.iter().map(|k| k.frame))
            .fold(None, |acc, f| match acc {
                Some((min, max)) => Some((f32::min(min, f), f32::max(max, f))),
                None => Some((f, f)),
            })
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        for key in self.fcurves.iter_mut().flat_map(|c| c.keyframes.iter_mut()) {
            key.interpolation = interpolation;
        }
    }

    pub fn key_count(&self) -> usize {
        self.fcurves.iter().map(|c| c.keyframes.len()).sum()
    }
}
