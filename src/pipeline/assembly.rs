/*!
 * Artifact assembly: build the starter model, move the training data into
 * the output directory and index it.
 */

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::command_runner::{ToolInvocation, ToolRunner};
use crate::context::RunContext;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language_params::NormMode;

pub const COMBINE_TOOL: &str = "combine_lang_model";

/// What assembly left in the output directory
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    pub starter_model: PathBuf,
    pub manifest: PathBuf,
    /// Feature files listed in the manifest
    pub feature_files: usize,
    /// Files moved out of the scratch directory
    pub relocated: usize,
}

/// `<output>/<lang>/<lang>.traineddata`
pub fn starter_model_path(output_dir: &Path, lang_code: &str) -> PathBuf {
    output_dir.join(lang_code).join(format!("{}.traineddata", lang_code))
}

/// `<output>/<lang>.training_files.txt`
pub fn manifest_path(output_dir: &Path, lang_code: &str) -> PathBuf {
    output_dir.join(format!("{}.training_files.txt", lang_code))
}

/// Punctuation list for the language, or the shared one when it has none
pub fn punctuation_file(ctx: &RunContext) -> PathBuf {
    if ctx.punc_file.exists() {
        return ctx.punc_file.clone();
    }
    let common = ctx.langdata_dir.join("common.punc");
    warn!(
        "{} not found, falling back to {}",
        ctx.punc_file.display(),
        common.display()
    );
    common
}

/// Model-combination call for the starter model
pub fn combine_invocation(ctx: &RunContext, unicharset: &Path) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(COMBINE_TOOL)
        .arg("--input_unicharset")
        .arg(unicharset)
        .arg("--script_dir")
        .arg(&ctx.langdata_dir)
        .arg("--words")
        .arg(&ctx.wordlist_file)
        .arg("--numbers")
        .arg(&ctx.numbers_file)
        .arg("--puncs")
        .arg(punctuation_file(ctx))
        .arg("--output_dir")
        .arg(&ctx.output_dir)
        .arg("--lang")
        .arg(&ctx.lang_code);

    if ctx.language.lang_is_rtl {
        invocation = invocation.arg("--lang_is_rtl");
    }
    if ctx.language.norm_mode >= NormMode::CombiningMarks {
        invocation = invocation.arg("--pass_through_recoder");
    }

    invocation
}

/// Scratch files that belong in the output directory
pub fn files_to_relocate(ctx: &RunContext) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if ctx.flags.save_box_tiff {
        info!("=== Saving box/tiff pairs for training data ===");
        files.extend(FileManager::list_files(&ctx.training_dir, &ctx.lang_code, ".box")?);
        files.extend(FileManager::list_files(&ctx.training_dir, &ctx.lang_code, ".tif")?);
    }

    info!("=== Moving lstmf files for training data ===");
    let feature_prefix = format!("{}.", ctx.lang_code);
    files.extend(FileManager::list_files(&ctx.training_dir, &feature_prefix, ".lstmf")?);

    Ok(files)
}

/// Write the sorted list of feature files in `output_dir`, one per line
pub fn write_manifest(output_dir: &Path, lang_code: &str) -> Result<(PathBuf, usize)> {
    let feature_files = FileManager::list_files(output_dir, &format!("{}.", lang_code), ".lstmf")?;

    let mut listing = String::new();
    for path in &feature_files {
        listing.push_str(&path.to_string_lossy());
        listing.push('\n');
    }

    let manifest = manifest_path(output_dir, lang_code);
    FileManager::write_to_file(&manifest, &listing)?;
    Ok((manifest, feature_files.len()))
}

/// Build the starter model, relocate the training data and write the manifest
pub async fn assemble_artifacts(ctx: &RunContext, runner: &dyn ToolRunner) -> Result<AssemblyReport> {
    info!("=== Constructing LSTM training data ===");

    let starter_model = starter_model_path(&ctx.output_dir, &ctx.lang_code);
    if starter_model.exists() && !ctx.flags.overwrite {
        return Err(PipelineError::Precondition {
            path: starter_model,
            reason: "already exists; rerun with --overwrite to replace it".to_string(),
        }
        .into());
    }

    let unicharset = ctx.unicharset()?;
    FileManager::require_input(unicharset)?;

    if !FileManager::dir_exists(&ctx.output_dir) {
        info!("Creating new directory {}", ctx.output_dir.display());
        FileManager::ensure_dir(&ctx.output_dir)?;
    }

    runner.run(&combine_invocation(ctx, unicharset)).await?;
    FileManager::verify_artifact(&starter_model)?;

    let files = files_to_relocate(ctx)?;
    for file in &files {
        let Some(name) = file.file_name() else { continue };
        let target = ctx.output_dir.join(name);
        debug!("Moving {} to {}", file.display(), target.display());
        FileManager::move_file(file, &target)
            .with_context(|| format!("Failed to relocate {}", file.display()))?;
    }

    let (manifest, feature_files) = write_manifest(&ctx.output_dir, &ctx.lang_code)?;
    info!("Wrote {} entries to {}", feature_files, manifest.display());

    Ok(AssemblyReport {
        starter_model,
        manifest,
        feature_files,
        relocated: files.len(),
    })
}
