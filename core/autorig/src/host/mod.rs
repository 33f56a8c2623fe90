//! Boundary to the surrounding animation application: interaction state it
//! reports, and the services (baking, asset loading, exporting) it provides.

mod assets;
mod bake;

use crate::scene::Scene;
use std::error::Error;
use std::path::PathBuf;
pub use assets::*;
pub use bake::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalOperator {
    Translate,
    Rotate,
    Resize,
    Other(String),
}

impl ModalOperator {
    pub fn is_transform_gesture(&self) -> bool {
        matches!(self, ModalOperator::Translate | ModalOperator::Rotate | ModalOperator::Resize)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Object,
    Pose,
    Edit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AreaKind {
    #[default]
    View3d,
    GraphEditor,
    Other,
}

/// Interaction state at the time of a notification or command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostContext {
    pub modal_operators: Vec<ModalOperator>,
    pub mode: InteractionMode,
    pub area: AreaKind,
}

impl HostContext {
    /// Any translate, rotate or scale gesture currently running
    pub fn is_transforming(&self) -> bool {
        self.modal_operators
            .iter()
            .any(ModalOperator::is_transform_gesture)
    }

    /// Pose mode inside the 3D viewport
    pub fn is_posing_in_viewport(&self) -> bool {
        self.mode == InteractionMode::Pose && self.area == AreaKind::View3d
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    /// Object to export, already renamed to the exporter's convention
    pub object: String,
    pub action: String,
    pub path: PathBuf,
    pub use_selection: bool,
    pub export_animations: bool,
    pub extract_keyframe_data: bool,
}

/// Writes model/animation files for the target format
pub trait Exporter {
    fn export(&mut self, scene: &Scene, request: &ExportRequest) -> Result<(), Box<dyn Error>>;
}
