/*!
 * Run context: configuration, derived paths and pipeline state for one
 * training run.
 *
 * The sequencer owns the context for the whole run and lends it to each
 * phase. Paths produced by a phase are recorded as `Option`s so "not produced
 * yet" can be checked rather than assumed.
 */

use anyhow::{Context as _, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::errors::PipelineError;
use crate::language_params::{LanguageParameters, LanguageResolver};
use crate::pipeline::render::check_fontname_collisions;

/// Inputs for a run, as collected from the command line
#[derive(Debug, Clone, Default)]
pub struct TrainingOptions {
    pub lang_code: String,
    pub langdata_dir: Option<PathBuf>,
    pub tessdata_dir: Option<PathBuf>,
    pub fonts: Option<Vec<String>>,
    pub fonts_dir: Option<PathBuf>,
    pub tmp_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub training_text: Option<PathBuf>,
    pub wordlist_file: Option<PathBuf>,
    pub exposures: Option<Vec<i32>>,
    pub max_pages: u32,
    pub flags: PolicyFlags,
}

/// Behaviour switches for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyFlags {
    /// Existing artifacts in the output directory may be replaced
    pub overwrite: bool,
    /// Keep box/image pairs next to the feature files
    pub save_box_tiff: bool,
    /// Render n-gram text to collect font properties
    pub extract_font_properties: bool,
    /// Ask the renderer for distorted images
    pub distort_image: bool,
    /// Produce line-level training data only
    pub linedata_only: bool,
}

impl Default for PolicyFlags {
    fn default() -> Self {
        Self {
            overwrite: false,
            save_box_tiff: false,
            extract_font_properties: true,
            distort_image: false,
            linedata_only: false,
        }
    }
}

/// State threaded through every phase of a run
#[derive(Debug)]
pub struct RunContext {
    pub lang_code: String,
    pub timestamp: String,
    /// Scratch directory for intermediate files
    pub training_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,

    pub langdata_dir: PathBuf,
    pub tessdata_dir: PathBuf,
    pub training_text: PathBuf,
    pub wordlist_file: PathBuf,
    pub numbers_file: PathBuf,
    pub punc_file: PathBuf,
    pub bigram_freqs_file: PathBuf,
    pub fonts_dir: PathBuf,
    pub fonts: Vec<String>,
    pub exposures: Vec<i32>,
    pub max_pages: u32,
    pub language: LanguageParameters,
    pub flags: PolicyFlags,

    pub unicharset_file: Option<PathBuf>,
    pub xheights_file: Option<PathBuf>,
    pub train_ngrams_file: Option<PathBuf>,

    font_config_cache: TempDir,
}

fn default_fonts_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Fonts/")
    } else {
        PathBuf::from("/usr/share/fonts/")
    }
}

impl RunContext {
    /// Validate options, resolve language parameters and create the run directories
    pub fn new(options: TrainingOptions, resolver: &dyn LanguageResolver) -> Result<Self> {
        if options.lang_code.is_empty() {
            return Err(PipelineError::config("Need to specify a language --lang").into());
        }
        let lang_code = options.lang_code;

        let langdata_dir = options.langdata_dir.ok_or_else(|| {
            PipelineError::config("Need to specify path to language files --langdata-dir")
        })?;

        let tessdata_dir = options.tessdata_dir.ok_or_else(|| {
            PipelineError::config(
                "Need to specify a --tessdata-dir or have a TESSDATA_PREFIX variable defined in your environment",
            )
        })?;

        if !options.flags.linedata_only {
            return Err(PipelineError::LegacyModeUnsupported.into());
        }

        let mut language = resolver.resolve(
            &lang_code,
            options.fonts.as_deref(),
            options.exposures.as_deref(),
        )?;
        let fonts = std::mem::take(&mut language.fonts);
        let exposures = std::mem::take(&mut language.exposures);

        if fonts.is_empty() {
            return Err(PipelineError::config("Font list is empty").into());
        }
        if exposures.is_empty() {
            return Err(PipelineError::config("Exposure list is empty").into());
        }
        check_fontname_collisions(&fonts)?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d").to_string();

        let scratch_parent = options.tmp_dir.unwrap_or_else(std::env::temp_dir);
        let training_dir = tempfile::Builder::new()
            .prefix(&format!("{}-{}", lang_code, timestamp))
            .tempdir_in(&scratch_parent)
            .with_context(|| format!("Failed to create scratch directory in {}", scratch_parent.display()))?
            .keep();

        let output_dir = match options.output_dir {
            Some(dir) => dir,
            None => {
                let dir = tempfile::Builder::new()
                    .prefix(&format!("trained-{}-{}", lang_code, timestamp))
                    .tempdir()
                    .context("Failed to create output directory")?
                    .keep();
                info!("Output directory set to: {}", dir.display());
                dir
            }
        };

        let font_config_cache = tempfile::Builder::new()
            .prefix("font_tmp")
            .tempdir()
            .context("Failed to create font cache directory")?;

        let lang_dir = langdata_dir.join(&lang_code);
        let training_text = options
            .training_text
            .unwrap_or_else(|| lang_dir.join(format!("{}.training_text", lang_code)));
        let wordlist_file = options
            .wordlist_file
            .unwrap_or_else(|| lang_dir.join(format!("{}.wordlist", lang_code)));

        let ctx = Self {
            timestamp,
            log_file: training_dir.join("tesstrain.log"),
            numbers_file: lang_dir.join(format!("{}.numbers", lang_code)),
            punc_file: lang_dir.join(format!("{}.punc", lang_code)),
            bigram_freqs_file: training_text.with_extension("training_text.bigram_freqs"),
            fonts_dir: options.fonts_dir.unwrap_or_else(default_fonts_dir),
            lang_code,
            training_dir,
            output_dir,
            langdata_dir,
            tessdata_dir,
            training_text,
            wordlist_file,
            fonts,
            exposures,
            max_pages: options.max_pages,
            language,
            flags: options.flags,
            unicharset_file: None,
            xheights_file: None,
            train_ngrams_file: None,
            font_config_cache,
        };

        debug!("{:#?}", ctx);
        Ok(ctx)
    }

    /// Font cache directory shared read-only by the rendering jobs
    pub fn font_config_cache(&self) -> &Path {
        self.font_config_cache.path()
    }

    /// Where the corpus sampler writes its n-gram text
    pub fn train_ngrams_target(&self) -> PathBuf {
        self.training_dir
            .join(format!("{}.training_text.train_ngrams", self.lang_code))
    }

    /// Path prefix shared by the language data files
    pub fn lang_prefix(&self) -> PathBuf {
        self.langdata_dir.join(&self.lang_code).join(&self.lang_code)
    }

    /// Language-specific recognition config, when the language ships one
    pub fn lang_config_file(&self) -> Option<PathBuf> {
        let path = self.langdata_dir
            .join(&self.lang_code)
            .join(format!("{}.config", self.lang_code));
        path.exists().then_some(path)
    }

    /// Unicharset produced by the unicharset phase
    pub fn unicharset(&self) -> Result<&Path, PipelineError> {
        Self::derived("unicharset", &self.unicharset_file)
    }

    /// X-height statistics produced by the unicharset phase
    pub fn xheights(&self) -> Result<&Path, PipelineError> {
        Self::derived("x-height statistics", &self.xheights_file)
    }

    fn derived<'a>(what: &str, value: &'a Option<PathBuf>) -> Result<&'a Path, PipelineError> {
        value.as_deref().ok_or_else(|| {
            PipelineError::config(format!("The {} file has not been produced yet", what))
        })
    }
}
