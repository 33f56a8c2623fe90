use super::Scene;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SceneIoError {
    #[error("Unable to open scene file \"{path}\"")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Scene file \"{path}\" is not valid")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Unable to write scene file \"{path}\"")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Scene {
    pub fn from_json_file<T>(path: T) -> Result<Scene, SceneIoError> where T: AsRef<Path> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| SceneIoError::Open {
            path: path.to_owned(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| SceneIoError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn save_json_file<T>(&self, path: T) -> Result<(), SceneIoError> where T: AsRef<Path> {
        let path = path.as_ref();
        let write_err = |source: std::io::Error| SceneIoError::Write {
            path: path.to_owned(),
            source,
        };

        let file = File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| write_err(e.into()))?;

        writer.flush().map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;
    use crate::scene::*;

    #[rstest]
    fn minimal_scene_uses_defaults() {
        let json = r#"{
            "objects": [
                { "name": "Bip01", "data": { "Armature": { "bones": [ { "name": "Bip01 Pelvis" } ] } } }
            ]
        }"#;

        let scene: Scene = serde_json::from_str(json).unwrap();
        let bone = scene.armature("Bip01").unwrap().bone("Bip01 Pelvis").unwrap();

        assert_eq!(scene.frame_start, 1);
        assert!(bone.auto_posing);
        assert_eq!(bone.mode, KinematicsMode::InverseKinematics);
        assert_eq!(bone.matrix, crate::math::Matrix::identity());
    }

    #[rstest]
    fn missing_file_reports_path() {
        let err = Scene::from_json_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, SceneIoError::Open { .. }));
    }
}
