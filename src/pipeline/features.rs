/*!
 * Phase E: run the recogniser in training mode over every rendered image to
 * produce one feature file per image.
 */

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use crate::command_runner::{ToolInvocation, ToolRunner};
use crate::context::RunContext;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;

use super::pool::run_jobs;

pub const OCR_TOOL: &str = "tesseract";
pub const TESSDATA_ENV: &str = "TESSDATA_PREFIX";

/// Which kind of training data the recogniser writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureMode {
    /// Text-line features for the line recogniser
    LineData,
    /// Character-box features for the legacy classifier
    CharacterBox,
}

impl FeatureMode {
    pub fn config_args(&self) -> &'static [&'static str] {
        match self {
            FeatureMode::LineData => &["--psm", "6", "lstm.train"],
            FeatureMode::CharacterBox => &["box.train"],
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FeatureMode::LineData => "lstmf",
            FeatureMode::CharacterBox => "tr",
        }
    }
}

/// Rendered images in the scratch directory
pub fn find_images(training_dir: &Path) -> Result<Vec<PathBuf>> {
    let images = FileManager::list_files(training_dir, "", ".tif")?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().contains(".exp"))
                .unwrap_or(false)
        })
        .collect();
    Ok(images)
}

/// Recogniser call for one image
pub fn feature_invocation(ctx: &RunContext, image: &Path, mode: FeatureMode, config: Option<&Path>) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(OCR_TOOL)
        .arg(image)
        .arg(image.with_extension(""))
        .args(mode.config_args());

    if let Some(config) = config {
        invocation = invocation.arg(config);
    }

    invocation.env(TESSDATA_ENV, &ctx.tessdata_dir)
}

/// Extract features for every image, returning the produced feature files
pub async fn extract_features(
    ctx: &RunContext,
    runner: &dyn ToolRunner,
    mode: FeatureMode,
    max_workers: usize,
) -> Result<Vec<PathBuf>> {
    info!("=== Phase E: Generating {} files ===", mode.extension());

    let images = find_images(&ctx.training_dir)?;
    if images.is_empty() {
        return Err(PipelineError::Precondition {
            path: ctx.training_dir.clone(),
            reason: "no rendered images to extract features from".to_string(),
        }
        .into());
    }

    let config = ctx.lang_config_file();
    if let Some(config) = &config {
        info!("Using {}", config.display());
    }
    info!("Using {}={}", TESSDATA_ENV, ctx.tessdata_dir.display());

    let config = config.as_deref();
    run_jobs("feature extraction", images.clone(), max_workers, move |image: PathBuf| async move {
        runner.run(&feature_invocation(ctx, &image, mode, config)).await?;
        Ok(())
    })
    .await?;

    let feature_files: Vec<PathBuf> = images
        .iter()
        .map(|image| image.with_extension(mode.extension()))
        .collect();
    FileManager::check_all_readable(&feature_files)?;

    info!("Extracted {} feature files", feature_files.len());
    Ok(feature_files)
}
