use crate::apps::{save_scene, SubApp};
use clap::Parser;

use std::error::Error;

use autorig::commands::{mute_constraints, restore_constraints};
use autorig::scene::Scene;

#[derive(Parser, Debug)]
pub struct MuteApp {
    #[arg(help = "Path to input scene (.json)", required = true)]
    pub scene_path: String,
    #[arg(short, long, help = "Path to output scene (defaults to input)")]
    pub output_path: Option<String>,
}

impl SubApp for MuteApp {
    fn process(&mut self) -> Result<(), Box<dyn Error>> {
        let mut scene = Scene::from_json_file(&self.scene_path)?;

        let outcome = mute_constraints(&mut scene)?;
        log::info!("{outcome:?}");

        save_scene(&scene, &self.scene_path, self.output_path.as_deref())
    }
}

#[derive(Parser, Debug)]
pub struct RestoreApp {
    #[arg(help = "Path to input scene (.json)", required = true)]
    pub scene_path: String,
    #[arg(short, long, help = "Path to output scene (defaults to input)")]
    pub output_path: Option<String>,
}

impl SubApp for RestoreApp {
    fn process(&mut self) -> Result<(), Box<dyn Error>> {
        let mut scene = Scene::from_json_file(&self.scene_path)?;

        let outcome = restore_constraints(&mut scene)?;
        log::info!("{outcome:?}");

        save_scene(&scene, &self.scene_path, self.output_path.as_deref())
    }
}
