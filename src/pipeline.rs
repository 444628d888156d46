use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MeasureError, Result};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

impl DebugConfig {
    /// Prepare a debug output directory.
    /// The directory must be empty or non-existent.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();

        if output_dir.exists() {
            let mut entries = std::fs::read_dir(&output_dir).map_err(|e| io_error(&output_dir, e))?;
            if entries.next().is_some() {
                return Err(MeasureError::DebugOutput {
                    path: output_dir,
                    message: "debug directory is not empty".to_string(),
                });
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(|e| io_error(&output_dir, e))?;
        }

        Ok(Self {
            output_dir,
            enabled: true,
        })
    }

    /// Save one stage image as `NN_<stage_name>.png`
    pub fn save_stage(&self, index: usize, stage_name: &str, image: &DynamicImage) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.output_dir.join(stage_file_name(index, stage_name));
        image.save(&path).map_err(|e| MeasureError::DebugOutput {
            path: path.clone(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "saved debug stage");
        Ok(())
    }
}

/// Context shared by every stage of one pipeline
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Save a stage image if debug mode is on
    pub fn dump(
        &self,
        index: usize,
        stage_name: &str,
        image: impl FnOnce() -> DynamicImage,
    ) -> Result<()> {
        match &self.debug {
            Some(debug_config) if debug_config.enabled => {
                debug_config.save_stage(index, stage_name, &image())
            }
            _ => Ok(()),
        }
    }
}

/// File name for a stage, e.g. "03_canny_edges.png"
pub fn stage_file_name(index: usize, stage_name: &str) -> String {
    format!("{:02}_{}.png", index, stage_name.to_lowercase().replace(' ', "_"))
}

fn io_error(path: &Path, err: std::io::Error) -> MeasureError {
    MeasureError::DebugOutput {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
