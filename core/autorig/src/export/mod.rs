mod decimate;
mod pipeline;
mod retarget;
mod tags;

pub use decimate::*;
pub use pipeline::*;
pub use retarget::*;
pub use tags::*;

use crate::host::BakeError;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ExportError {
    #[error("No active object")]
    NoActiveObject,
    #[error("No animation action found on \"{object}\".")]
    NoAction {
        object: String,
    },
    #[error("\"{object}\" is not an armature")]
    NotAnArmature {
        object: String,
    },
    #[error("The action \"{action}\" does not carry the '[Raw]' or '[Baked]' tag. Aborting operation.")]
    MissingTag {
        action: String,
    },
    #[error("The action \"{action}\" does not contain the '[Raw]' tag. Aborting operation.")]
    MissingRawTag {
        action: String,
    },
    #[error("The action \"{action}\" has no keyframes")]
    NoKeyframes {
        action: String,
    },
    #[error("Unable to load assets: {reason}")]
    Assets {
        reason: String,
    },
    #[error("Reference armature '{name}' not found in asset library.")]
    ReferenceNotFound {
        name: String,
    },
    #[error("Armature '{name}' not found in asset library.")]
    RigNotFound {
        name: String,
    },
    #[error("Can't find \"{name}\" action. It should've been loaded together with the beast armature.")]
    StanceNotFound {
        name: String,
    },
    #[error("Can't rename \"{object}\" to \"{name}\", name is already taken")]
    NameTaken {
        object: String,
        name: String,
    },
    #[error("Export to \"{path}\" failed: {reason}")]
    Exporter {
        path: PathBuf,
        reason: String,
    },
    #[error(transparent)]
    Bake(#[from] BakeError),
}
