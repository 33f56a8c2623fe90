use autorig::host::{ExportRequest, Exporter};
use autorig::scene::Scene;
use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;

/// Stand-in exporter writing the exported action as JSON beside the
/// requested model path
#[derive(Debug, Default)]
pub struct JsonActionExporter;

impl Exporter for JsonActionExporter {
    fn export(&mut self, scene: &Scene, request: &ExportRequest) -> Result<(), Box<dyn Error>> {
        let action = scene
            .action(&request.action)
            .ok_or_else(|| format!("Action \"{}\" not found", request.action))?;

        if let Some(dir) = request.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let path = request.path.with_extension("json");
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, action)?;

        log::info!("Wrote \"{}\" for \"{}\" to \"{}\"", request.action, request.object, path.display());
        Ok(())
    }
}
