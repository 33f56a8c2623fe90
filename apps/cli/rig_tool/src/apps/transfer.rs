use crate::apps::{save_scene, SubApp};
use clap::Parser;

use std::error::Error;

use autorig::export::transfer_to_beasts;
use autorig::host::{CurveBaker, SceneFileProvider};
use autorig::scene::Scene;

#[derive(Parser, Debug)]
pub struct TransferApp {
    #[arg(help = "Path to input scene (.json)", required = true)]
    pub scene_path: String,
    #[arg(help = "Path to beast rig library (.json)", required = true)]
    pub library_path: String,
    #[arg(short, long, help = "Path to output scene (defaults to input)")]
    pub output_path: Option<String>,
}

impl SubApp for TransferApp {
    fn process(&mut self) -> Result<(), Box<dyn Error>> {
        let mut scene = Scene::from_json_file(&self.scene_path)?;
        let mut assets = SceneFileProvider::new(&self.library_path);

        let outcome = transfer_to_beasts(&mut scene, &mut CurveBaker, &mut assets)?;
        log::info!("{outcome:?}");

        save_scene(&scene, &self.scene_path, self.output_path.as_deref())
    }
}
