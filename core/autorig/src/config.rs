use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

pub const SENTINEL_BONE: &str = "Bip01 Bizarre Bone";
pub const REFERENCE_ARMATURE: &str = "Autopose Reference Armature";
pub const GHOST_PREFIX: &str = "[Ghost] ";
pub const PROXY_BONE_PREFIX: &str = "Bip01 ";

pub const IK_ROOT_BONES: [&str; 4] = ["Bip01 Forearm.L", "Bip01 Forearm.R", "Bip01 Calf.L", "Bip01 Calf.R"];
pub const UPPER_BODY_AUTOPOSE_BONES: [&str; 4] = ["Bip01 Spine1", "Bip01 Spine2", "Bip01 Clavicle.L", "Bip01 Clavicle.R"];
pub const LOWER_BODY_AUTOPOSE_BONES: [&str; 1] = ["Bip01 Pelvis"];

pub const ARM_IK_TARGETS: [&str; 2] = ["Bip01 Arm IK Target.L", "Bip01 Arm IK Target.R"];
pub const LEG_IK_TARGETS: [&str; 2] = ["Bip01 Leg IK Target.L", "Bip01 Leg IK Target.R"];

pub const DEFAULT_DECIMATE_TOLERANCE: f32 = 0.000005;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("Unable to open config file \"{path}\"")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Config file \"{path}\" is not valid")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub(crate) fn load_json<T, P>(path: P) -> Result<T, ConfigError> where T: DeserializeOwned, P: AsRef<Path> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| ConfigError::Open {
        path: path.to_owned(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Naming convention of the managed skeleton
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub sentinel_bone: String,
    pub reference_armature: String,
    pub ghost_prefix: String,
    /// Prefix added to a reference constraint's empty target name to address a bone
    pub proxy_bone_prefix: String,
    pub ik_root_bones: Vec<String>,
    pub upper_body_autopose_bones: Vec<String>,
    pub lower_body_autopose_bones: Vec<String>,
    /// IK target bone -> auto-pose bones keyed along with it
    pub ik_target_autopose: BTreeMap<String, Vec<String>>,
}

impl Default for RigConfig {
    fn default() -> RigConfig {
        let upper = owned(&UPPER_BODY_AUTOPOSE_BONES);
        let lower = owned(&LOWER_BODY_AUTOPOSE_BONES);

        let ik_target_autopose = ARM_IK_TARGETS
            .iter()
            .map(|t| (t.to_string(), upper.to_owned()))
            .chain(LEG_IK_TARGETS
                .iter()
                .map(|t| (t.to_string(), lower.to_owned())))
            .collect();

        RigConfig {
            sentinel_bone: SENTINEL_BONE.to_owned(),
            reference_armature: REFERENCE_ARMATURE.to_owned(),
            ghost_prefix: GHOST_PREFIX.to_owned(),
            proxy_bone_prefix: PROXY_BONE_PREFIX.to_owned(),
            ik_root_bones: owned(&IK_ROOT_BONES),
            upper_body_autopose_bones: upper,
            lower_body_autopose_bones: lower,
            ik_target_autopose,
        }
    }
}

impl RigConfig {
    pub fn from_json_file<T>(path: T) -> Result<RigConfig, ConfigError> where T: AsRef<Path> {
        load_json(path)
    }

    pub fn auto_pose_bones(&self) -> impl Iterator<Item = &str> {
        self.upper_body_autopose_bones
            .iter()
            .chain(self.lower_body_autopose_bones.iter())
            .map(String::as_str)
    }

    pub fn is_auto_pose_bone(&self, name: &str) -> bool {
        self.auto_pose_bones().any(|b| b == name)
    }

    pub fn is_ik_root(&self, name: &str) -> bool {
        self.ik_root_bones.iter().any(|b| b == name)
    }

    /// Name of the bone a ghost bone follows, `None` if not a ghost
    pub fn ghost_target<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.ghost_prefix.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportProfile {
    #[default]
    FirstPerson,
    ThirdPerson,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub export_folder: PathBuf,
    /// Comma separated bone names kept on export even if the reference skeleton lacks them
    pub retained_extra_bones: String,
    pub export_as: ExportProfile,
    pub decimate_tolerance: f32,
}

impl Default for ExportSettings {
    fn default() -> ExportSettings {
        ExportSettings {
            export_folder: PathBuf::from("Animations"),
            retained_extra_bones: String::new(),
            export_as: ExportProfile::default(),
            decimate_tolerance: DEFAULT_DECIMATE_TOLERANCE,
        }
    }
}

impl ExportSettings {
    pub fn from_json_file<T>(path: T) -> Result<ExportSettings, ConfigError> where T: AsRef<Path> {
        load_json(path)
    }

    pub fn retained_bones(&self) -> Vec<String> {
        self.retained_extra_bones
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
