/*!
 * Phase UP: build the unicharset and its per-symbol properties from the
 * rendered box files.
 */

use anyhow::Result;
use log::info;

use crate::command_runner::{ToolInvocation, ToolRunner};
use crate::context::RunContext;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;

pub const EXTRACTOR_TOOL: &str = "unicharset_extractor";
pub const PROPERTIES_TOOL: &str = "set_unicharset_properties";

/// Extract the unicharset, then annotate it in place and emit x-heights
pub async fn generate_unicharset(ctx: &mut RunContext, runner: &dyn ToolRunner) -> Result<()> {
    info!("=== Phase UP: Generating unicharset and unichar properties files ===");

    let box_files = FileManager::list_files(&ctx.training_dir, "", ".box")?;
    if box_files.is_empty() {
        return Err(PipelineError::Precondition {
            path: ctx.training_dir.clone(),
            reason: "no box files were rendered".to_string(),
        }
        .into());
    }

    let unicharset_file = ctx.training_dir.join(format!("{}.unicharset", ctx.lang_code));
    let extract = ToolInvocation::new(EXTRACTOR_TOOL)
        .arg("--output_unicharset")
        .arg(&unicharset_file)
        .arg("--norm_mode")
        .arg(ctx.language.norm_mode.as_arg())
        .args(&box_files);
    runner.run(&extract).await?;
    FileManager::verify_artifact(&unicharset_file)?;
    ctx.unicharset_file = Some(unicharset_file);

    let unicharset_file = ctx.unicharset()?;
    let xheights_file = ctx.training_dir.join(format!("{}.xheights", ctx.lang_code));
    let properties = ToolInvocation::new(PROPERTIES_TOOL)
        .arg("-U")
        .arg(unicharset_file)
        .arg("-O")
        .arg(unicharset_file)
        .arg("-X")
        .arg(&xheights_file)
        .path_flag("--script_dir", &ctx.langdata_dir);
    runner.run(&properties).await?;
    FileManager::verify_artifact(&xheights_file)?;
    ctx.xheights_file = Some(xheights_file);

    info!("Unicharset written to {}", ctx.unicharset()?.display());
    Ok(())
}
