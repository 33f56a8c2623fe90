mod auto_posing;
mod constraints;
mod groups;

pub use auto_posing::*;
pub use constraints::*;
pub use groups::*;

use crate::export::ExportError;
use thiserror::Error as ThisError;

/// Status reported back to the host after running a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Finished(String),
    /// Command didn't apply here, host should handle the input itself
    PassThrough,
}

impl Outcome {
    pub fn finished<T: Into<String>>(message: T) -> Outcome {
        Outcome::Finished(message.into())
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Outcome::Finished(_))
    }
}

#[derive(Debug, ThisError)]
pub enum CommandError {
    #[error("No active object")]
    NoActiveObject,
    #[error("Active object is not an armature.")]
    NotAnArmature,
    #[error("Selection group {0} is out of range, expected 1-9")]
    InvalidGroup(u8),
    #[error("Constraints are already muted. Restore them before muting again.")]
    AlreadyMuted,
    #[error("No saved constraint states to restore.")]
    NothingToRestore,
    #[error(transparent)]
    Export(#[from] ExportError),
}
