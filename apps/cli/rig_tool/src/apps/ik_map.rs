use crate::apps::{load_config, resolve_armature, SubApp};
use clap::Parser;

use std::error::Error;

use autorig::rig::build_ik_map;
use autorig::scene::Scene;

#[derive(Parser, Debug)]
pub struct IkMapApp {
    #[arg(help = "Path to input scene (.json)", required = true)]
    pub scene_path: String,
    #[arg(short, long, help = "Armature name (defaults to active object)")]
    pub armature: Option<String>,
    #[arg(short, long, help = "Path to rig config (.json)")]
    pub config: Option<String>,
}

impl SubApp for IkMapApp {
    fn process(&mut self) -> Result<(), Box<dyn Error>> {
        let config = load_config(self.config.as_deref())?;
        let scene = Scene::from_json_file(&self.scene_path)?;
        let armature = resolve_armature(&scene, self.armature.as_deref())?;

        let ik_map = build_ik_map(&scene, &armature, &config);
        log::info!("Found {} IK chain(s) on \"{armature}\"", ik_map.len());

        println!("{}", serde_json::to_string_pretty(&ik_map)?);
        Ok(())
    }
}
