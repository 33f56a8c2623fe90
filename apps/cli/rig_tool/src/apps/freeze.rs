use crate::apps::{resolve_armature, save_scene, SubApp};
use clap::Parser;

use std::error::Error;

use autorig::rig::{freeze_visual_transform, UpdateGuard};
use autorig::scene::Scene;

#[derive(Parser, Debug)]
pub struct FreezeApp {
    #[arg(help = "Path to input scene (.json)", required = true)]
    pub scene_path: String,
    #[arg(help = "Bone names to freeze, all selected bones if empty")]
    pub bones: Vec<String>,
    #[arg(short, long, help = "Armature name (defaults to active object)")]
    pub armature: Option<String>,
    #[arg(short, long, help = "Path to output scene (defaults to input)")]
    pub output_path: Option<String>,
}

impl SubApp for FreezeApp {
    fn process(&mut self) -> Result<(), Box<dyn Error>> {
        let mut scene = Scene::from_json_file(&self.scene_path)?;
        let armature = resolve_armature(&scene, self.armature.as_deref())?;

        let bones = match self.bones.is_empty() {
            true => scene
                .armature(&armature)
                .map(|arm| arm.selected_bones().map(|b| b.name.to_owned()).collect())
                .unwrap_or_default(),
            false => self.bones.to_owned(),
        };

        let frozen = freeze_visual_transform(&mut scene, &armature, bones.iter().map(String::as_str), &UpdateGuard::new());
        log::info!("Froze {frozen} of {} bone(s) on \"{armature}\"", bones.len());

        save_scene(&scene, &self.scene_path, self.output_path.as_deref())
    }
}
