use crate::apps::{save_scene, JsonActionExporter, SubApp};
use clap::Parser;

use std::error::Error;
use std::path::PathBuf;

use autorig::ExportSettings;
use autorig::export::export_animation;
use autorig::host::{CurveBaker, SceneFileProvider};
use autorig::scene::Scene;

#[derive(Parser, Debug)]
pub struct ExportApp {
    #[arg(help = "Path to input scene (.json)", required = true)]
    pub scene_path: String,
    #[arg(help = "Path to reference armature library (.json)", required = true)]
    pub library_path: String,
    #[arg(short, long, help = "Path to export settings (.json)")]
    pub settings: Option<String>,
    #[arg(short = 'f', long, help = "Export folder, overrides settings")]
    pub export_folder: Option<String>,
    #[arg(short, long, help = "Path to output scene (defaults to input)")]
    pub output_path: Option<String>,
}

impl SubApp for ExportApp {
    fn process(&mut self) -> Result<(), Box<dyn Error>> {
        let mut settings = match &self.settings {
            Some(path) => ExportSettings::from_json_file(path)?,
            None => ExportSettings::default(),
        };

        if let Some(folder) = &self.export_folder {
            settings.export_folder = PathBuf::from(folder);
        }

        let mut scene = Scene::from_json_file(&self.scene_path)?;
        let mut assets = SceneFileProvider::new(&self.library_path);

        let outcome = export_animation(&mut scene, &settings, &mut CurveBaker, &mut assets, &mut JsonActionExporter)?;
        log::info!("{outcome:?}");

        save_scene(&scene, &self.scene_path, self.output_path.as_deref())
    }
}
