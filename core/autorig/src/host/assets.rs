use crate::scene::{Action, Object, Scene};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Objects with this prefix are never pulled from asset files
pub const EXCLUDED_ASSET_PREFIX: &str = "Tri Shadow";

#[derive(Debug, Default)]
pub struct LoadedAssets {
    pub objects: Vec<Object>,
    /// Actions referenced by the loaded objects
    pub actions: Vec<Action>,
}

impl LoadedAssets {
    pub fn object_names(&self) -> Vec<String> {
        self.objects.iter().map(|o| o.name.to_owned()).collect()
    }

    /// Links objects into the scene, replacing same-named ones. Actions whose
    /// name already exists in the scene are kept as they are.
    pub fn merge_into(self, scene: &mut Scene) -> Vec<String> {
        for action in self.actions {
            if scene.action(&action.name).is_none() {
                scene.actions.push(action);
            }
        }

        self.objects
            .into_iter()
            .map(|obj| {
                let name = obj.name.to_owned();
                scene.link_object(obj);
                name
            })
            .collect()
    }
}

/// Supplies reference rigs from an asset library
pub trait AssetProvider {
    /// Loads the named objects. Missing names are simply absent from the result.
    fn load_objects(&mut self, names: &[&str]) -> Result<LoadedAssets, Box<dyn Error>>;
}

/// Asset library stored as a JSON scene file
#[derive(Debug)]
pub struct SceneFileProvider {
    path: PathBuf,
    library: Option<Scene>,
}

impl SceneFileProvider {
    pub fn new<T>(path: T) -> SceneFileProvider where T: AsRef<Path> {
        SceneFileProvider {
            path: path.as_ref().to_owned(),
            library: None,
        }
    }

    pub fn from_scene(library: Scene) -> SceneFileProvider {
        SceneFileProvider {
            path: PathBuf::new(),
            library: Some(library),
        }
    }

    fn library(&mut self) -> Result<&Scene, Box<dyn Error>> {
        if self.library.is_none() {
            log::info!("Loading asset library \"{}\"", self.path.display());
            self.library = Some(Scene::from_json_file(&self.path)?);
        }

        self.library
            .as_ref()
            .ok_or_else(|| "asset library unavailable".into())
    }
}

impl AssetProvider for SceneFileProvider {
    fn load_objects(&mut self, names: &[&str]) -> Result<LoadedAssets, Box<dyn Error>> {
        let library = self.library()?;

        let objects = names
            .iter()
            .filter(|name| !name.starts_with(EXCLUDED_ASSET_PREFIX))
            .filter_map(|name| library.object(name).cloned())
            .collect::<Vec<_>>();

        let actions = objects
            .iter()
            .filter_map(|o| o.action_name())
            .filter_map(|name| library.action(name).cloned())
            .collect();

        Ok(LoadedAssets {
            objects,
            actions,
        })
    }
}
