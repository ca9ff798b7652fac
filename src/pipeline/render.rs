/*!
 * Phase I: render one training image per (font, exposure) pair.
 */

use anyhow::{Context, Result};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::command_runner::{ToolInvocation, ToolRunner};
use crate::context::RunContext;
use crate::corpus_sampler;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language_params::is_vertical_font;

use super::pool::run_jobs;

pub const RENDER_TOOL: &str = "text2image";

static FONT_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r",").expect("valid regex"));
static FONT_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("valid regex"));

/// File-name-safe form of a font name: commas dropped, whitespace to `_`
pub fn make_fontname(font: &str) -> String {
    let without_punctuation = FONT_PUNCTUATION.replace_all(font, "");
    FONT_WHITESPACE.replace_all(&without_punctuation, "_").into_owned()
}

/// Output base shared by the box, image and font-info files of one job
pub fn make_outbase(training_dir: &Path, lang_code: &str, fontname: &str, exposure: i32) -> PathBuf {
    training_dir.join(format!("{}.{}.exp{}", lang_code, fontname, exposure))
}

/// Reject font lists where two entries would write to the same files
pub fn check_fontname_collisions(fonts: &[String]) -> Result<(), PipelineError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for font in fonts {
        let fontname = make_fontname(font);
        if let Some(first) = seen.get(&fontname) {
            return Err(PipelineError::FontNameCollision {
                first: first.to_string(),
                second: font.clone(),
                fontname,
            });
        }
        seen.insert(fontname, font);
    }
    Ok(())
}

/// `<base><suffix>` without touching the dots already in the base
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// One (font, exposure) rendering job
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub font: String,
    pub fontname: String,
    pub exposure: i32,
    pub outbase: PathBuf,
    pub vertical: bool,
    pub char_spacing: f64,
}

impl RenderJob {
    pub fn box_file(&self) -> PathBuf {
        with_suffix(&self.outbase, ".box")
    }

    pub fn image_file(&self) -> PathBuf {
        with_suffix(&self.outbase, ".tif")
    }

    pub fn fontinfo_file(&self) -> PathBuf {
        with_suffix(&self.outbase, ".fontinfo")
    }
}

/// Jobs for every configured font at one exposure level
pub fn plan_render_jobs(ctx: &RunContext, exposure: i32) -> Vec<RenderJob> {
    ctx.fonts
        .iter()
        .map(|font| {
            let fontname = make_fontname(font);
            RenderJob {
                outbase: make_outbase(&ctx.training_dir, &ctx.lang_code, &fontname, exposure),
                vertical: is_vertical_font(font),
                font: font.clone(),
                fontname,
                exposure,
                char_spacing: 0.0,
            }
        })
        .collect()
}

/// Arguments shared by the image render and the font-property render
fn common_render_invocation(ctx: &RunContext, job: &RenderJob) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(RENDER_TOOL)
        .path_flag("--fontconfig_tmpdir", ctx.font_config_cache())
        .path_flag("--fonts_dir", &ctx.fonts_dir)
        .arg("--strip_unrenderable_words")
        .flag("--leading", ctx.language.leading)
        .flag("--char_spacing", format!("{:.1}", job.char_spacing))
        .flag("--exposure", job.exposure)
        .path_flag("--outputbase", &job.outbase)
        .flag("--max_pages", ctx.max_pages);

    if ctx.flags.distort_image {
        invocation = invocation.arg("--distort_image");
    }

    if job.vertical {
        invocation = invocation.arg("--writing_mode=vertical-upright");
    }

    invocation
}

/// Main render call for a job
pub fn image_invocation(ctx: &RunContext, job: &RenderJob) -> ToolInvocation {
    common_render_invocation(ctx, job)
        .flag("--font", &job.font)
        .path_flag("--text", &ctx.training_text)
        .args(&ctx.language.text2image_extra_args)
}

/// Font-property render of the sampled n-gram text
pub fn font_properties_invocation(ctx: &RunContext, job: &RenderJob, ngrams: &Path) -> ToolInvocation {
    common_render_invocation(ctx, job)
        .flag("--font", &job.font)
        .arg("--ligatures=false")
        .path_flag("--text", ngrams)
        .arg("--only_extract_font_properties")
        .arg("--ptsize=32")
}

/// Render a job and verify its outputs
pub async fn render_font(ctx: &RunContext, runner: &dyn ToolRunner, job: RenderJob) -> Result<RenderJob> {
    info!("Rendering using {}", job.font);
    runner.run(&image_invocation(ctx, &job)).await?;
    FileManager::check_all_readable([job.box_file(), job.image_file()])?;

    if let Some(ngrams) = usable_ngrams(ctx) {
        info!("Extracting font properties of {}", job.font);
        runner.run(&font_properties_invocation(ctx, &job, ngrams)).await?;
        FileManager::check_readable(job.fontinfo_file())?;
    }

    Ok(job)
}

fn usable_ngrams(ctx: &RunContext) -> Option<&Path> {
    if !ctx.flags.extract_font_properties {
        return None;
    }
    ctx.train_ngrams_file.as_deref().filter(|path| path.exists())
}

/// Counts of tool runs issued by the rendering phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSummary {
    pub images: usize,
    pub font_properties: usize,
}

/// Phase I: render every font at every exposure level
pub async fn generate_images(ctx: &mut RunContext, runner: &dyn ToolRunner, max_workers: usize) -> Result<RenderSummary> {
    info!("=== Phase I: Generating training images ===");
    FileManager::require_input(&ctx.training_text)?;
    corpus_sampler::prepare_train_ngrams(ctx).context("Failed to sample n-grams")?;

    let ctx: &RunContext = ctx;
    let with_properties = usable_ngrams(ctx).is_some();
    let mut summary = RenderSummary::default();

    for &exposure in &ctx.exposures {
        let jobs = plan_render_jobs(ctx, exposure);
        let label = format!("exposure {} renders", exposure);
        let rendered = run_jobs(&label, jobs.clone(), max_workers, |job| render_font(ctx, runner, job)).await?;

        summary.images += rendered.len();
        if with_properties {
            summary.font_properties += rendered.len();
        }

        for job in &jobs {
            FileManager::check_all_readable([job.box_file(), job.image_file()])?;
        }
    }

    info!(
        "Rendered {} images ({} font-property renders)",
        summary.images, summary.font_properties
    );
    Ok(summary)
}

/// Render a throwaway sample so fontconfig fills the private cache before
/// the parallel jobs read it
pub async fn initialize_fontconfig(ctx: &RunContext, runner: &dyn ToolRunner) -> Result<()> {
    let sample_path = ctx.font_config_cache().join("sample_text.txt");
    FileManager::write_to_file(&sample_path, "Text\n")?;

    let font = ctx
        .fonts
        .first()
        .ok_or_else(|| PipelineError::config("Font list is empty"))?;
    info!("Testing font: {}", font);

    let invocation = ToolInvocation::new(RENDER_TOOL)
        .path_flag("--fonts_dir", &ctx.fonts_dir)
        .flag("--font", font)
        .path_flag("--outputbase", &sample_path)
        .path_flag("--text", &sample_path)
        .path_flag("--fontconfig_tmpdir", ctx.font_config_cache());
    runner.run(&invocation).await?;

    Ok(())
}
