use autorig::RigConfig;
use autorig::scene::Scene;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::Path;
use thiserror::Error as ThisError;

mod constraints;
mod export;
mod exporter;
mod freeze;
mod ik_map;
mod transfer;
use self::constraints::*;
use self::export::*;
use self::exporter::*;
use self::freeze::*;
use self::ik_map::*;
use self::transfer::*;

// From Cargo.toml
const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) trait SubApp {
    fn process(&mut self) -> Result<(), Box<dyn Error>>;
}

#[derive(Debug, ThisError)]
pub(crate) enum RigToolError {
    #[error("Armature \"{name}\" not found")]
    ArmatureNotFound {
        name: String,
    },
    #[error("No armature given and scene has no active object")]
    NoArmature,
}

#[derive(Parser, Debug)]
#[command(name = PKG_NAME, version = VERSION, about = "Rig and animation tools for managed skeletons")]
struct Options {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    commands: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    #[command(name = "ik-map", about = "Print IK chains of an armature")]
    IkMap(IkMapApp),
    #[command(name = "export", about = "Bake, decimate and export the active action")]
    Export(ExportApp),
    #[command(name = "transfer", about = "Retarget the active [Raw] action onto the beast skeleton")]
    Transfer(TransferApp),
    #[command(name = "mute", about = "Mute all constraints of the active armature")]
    Mute(MuteApp),
    #[command(name = "restore", about = "Restore previously muted constraints")]
    Restore(RestoreApp),
    #[command(name = "freeze", about = "Bake visual rotation of bones into their pose")]
    Freeze(FreezeApp),
}

#[derive(Debug)]
pub struct RigTool {
    options: Options,
}

impl RigTool {
    pub fn new() -> RigTool {
        RigTool {
            options: Options::parse()
        }
    }

    pub fn verbose(&self) -> bool {
        self.options.verbose
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        match &mut self.options.commands {
            SubCommand::IkMap(app) => app.process(),
            SubCommand::Export(app) => app.process(),
            SubCommand::Transfer(app) => app.process(),
            SubCommand::Mute(app) => app.process(),
            SubCommand::Restore(app) => app.process(),
            SubCommand::Freeze(app) => app.process(),
        }
    }
}

pub(crate) fn load_config(path: Option<&str>) -> Result<RigConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(RigConfig::from_json_file(path)?),
        None => Ok(RigConfig::default()),
    }
}

/// Output path if given, otherwise the scene is overwritten in place
pub(crate) fn save_scene(scene: &Scene, input_path: &str, output_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let path = Path::new(output_path.unwrap_or(input_path));
    scene.save_json_file(path)?;

    log::info!("Wrote scene to \"{}\"", path.display());
    Ok(())
}

/// Named armature or the scene's active object
pub(crate) fn resolve_armature(scene: &Scene, name: Option<&str>) -> Result<String, RigToolError> {
    let name = name
        .map(str::to_owned)
        .or_else(|| scene.active_object.to_owned())
        .ok_or(RigToolError::NoArmature)?;

    match scene.armature(&name) {
        Some(_) => Ok(name),
        None => Err(RigToolError::ArmatureNotFound { name }),
    }
}
