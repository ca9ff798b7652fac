/*!
 * Phase sequencer: runs the training phases in their fixed order and owns the
 * end-of-run cleanup.
 */

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::PathBuf;

use crate::app_config::Config;
use crate::command_runner::ToolRunner;
use crate::context::RunContext;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::logging;

use super::assembly::{assemble_artifacts, AssemblyReport};
use super::features::{extract_features, FeatureMode};
use super::render::{generate_images, initialize_fontconfig};
use super::unicharset::generate_unicharset;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub manifest: PathBuf,
    pub starter_model: PathBuf,
    pub feature_files: usize,
    /// Copy of the run log in the output directory
    pub log_file: Option<PathBuf>,
}

/// One training run from font-cache setup to the indexed output directory
pub struct TrainingPipeline<'a> {
    ctx: RunContext,
    runner: &'a dyn ToolRunner,
    config: &'a Config,
}

impl<'a> TrainingPipeline<'a> {
    pub fn new(ctx: RunContext, runner: &'a dyn ToolRunner, config: &'a Config) -> Self {
        Self { ctx, runner, config }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Run every phase, then clean up. The scratch directory is removed only
    /// when the run succeeds.
    pub async fn run(mut self) -> Result<RunReport> {
        let outcome = self.run_phases().await;
        let log_copy = self.preserve_log();

        match outcome {
            Ok(assembly) => {
                logging::release_run_log(&self.ctx.log_file);
                if let Err(e) = std::fs::remove_dir_all(&self.ctx.training_dir) {
                    warn!(
                        "Failed to remove scratch directory {}: {}",
                        self.ctx.training_dir.display(),
                        e
                    );
                }

                info!("Completed training for {}", self.ctx.lang_code);
                Ok(RunReport {
                    output_dir: self.ctx.output_dir.clone(),
                    manifest: assembly.manifest,
                    starter_model: assembly.starter_model,
                    feature_files: assembly.feature_files,
                    log_file: log_copy,
                })
            }
            Err(e) => {
                error!("{:#}", e);
                error!("Temporary files retained at: {}", self.ctx.training_dir.display());
                logging::release_run_log(&self.ctx.log_file);
                Err(e)
            }
        }
    }

    async fn run_phases(&mut self) -> Result<AssemblyReport> {
        if !self.ctx.flags.linedata_only {
            return Err(PipelineError::LegacyModeUnsupported.into());
        }

        let runner = self.runner;

        initialize_fontconfig(&self.ctx, runner)
            .await
            .context("Font cache initialisation failed")?;

        generate_images(&mut self.ctx, runner, self.config.render_workers)
            .await
            .context("Phase I (image rendering) failed")?;

        generate_unicharset(&mut self.ctx, runner)
            .await
            .context("Phase UP (unicharset generation) failed")?;

        extract_features(&self.ctx, runner, FeatureMode::LineData, self.config.feature_workers)
            .await
            .context("Phase E (feature extraction) failed")?;

        assemble_artifacts(&self.ctx, runner)
            .await
            .context("Artifact assembly failed")
    }

    /// Copy the run log next to the outputs, if there is one to copy
    fn preserve_log(&self) -> Option<PathBuf> {
        log::logger().flush();

        if !FileManager::file_exists(&self.ctx.log_file) {
            return None;
        }
        let target = self.ctx.output_dir.join("tesstrain.log");
        match FileManager::copy_file(&self.ctx.log_file, &target) {
            Ok(()) => Some(target),
            Err(e) => {
                warn!("Could not copy run log: {:#}", e);
                None
            }
        }
    }
}
