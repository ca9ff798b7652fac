/*!
 * Mock training tools for testing
 *
 * `MockToolRunner` records every invocation and writes the files the real
 * tool would have written, so the phases can run end to end without the
 * Tesseract training tools installed.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

use tesstrain::command_runner::{ToolInvocation, ToolRunner};
use tesstrain::errors::PipelineError;

/// Records invocations and simulates the training tools
#[derive(Debug, Default)]
pub struct MockToolRunner {
    calls: Mutex<Vec<ToolInvocation>>,
    /// Render "succeeds" for fonts containing this text but writes no box file
    skip_box_for_font: Option<String>,
    /// Recogniser "succeeds" for image bases containing this text but writes no feature file
    skip_lstmf_for_base: Option<String>,
    /// Tool that exits non-zero
    failing_tool: Option<String>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render exits cleanly for `font` without writing its box file
    pub fn skipping_box_for(font: &str) -> Self {
        Self {
            skip_box_for_font: Some(font.to_string()),
            ..Self::default()
        }
    }

    /// Feature extraction exits cleanly for images whose base contains `name`
    /// without writing the `.lstmf` file
    pub fn skipping_lstmf_for(name: &str) -> Self {
        Self {
            skip_lstmf_for_base: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// `tool` exits with status 1
    pub fn failing(tool: &str) -> Self {
        Self {
            failing_tool: Some(tool.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<ToolInvocation> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.program == program)
            .cloned()
            .collect()
    }

    pub fn count(&self, program: &str) -> usize {
        self.calls_to(program).len()
    }

    fn simulate(&self, invocation: &ToolInvocation) -> std::io::Result<()> {
        let args = invocation.args_lossy();
        match invocation.program.as_str() {
            "text2image" => {
                let Some(base) = flag_value(&args, "--outputbase=") else {
                    return Ok(());
                };
                if invocation.has_arg("--only_extract_font_properties") {
                    fs::write(format!("{}.fontinfo", base), "fontinfo")?;
                } else if invocation.has_arg("--strip_unrenderable_words") {
                    let font = flag_value(&args, "--font=").unwrap_or_default();
                    let skip = self
                        .skip_box_for_font
                        .as_deref()
                        .is_some_and(|needle| font.contains(needle));
                    if !skip {
                        fs::write(format!("{}.box", base), "T 0 0 10 10 0\n")?;
                    }
                    fs::write(format!("{}.tif", base), "II*")?;
                }
            }
            "unicharset_extractor" => {
                if let Some(path) = value_after(&args, "--output_unicharset") {
                    fs::write(path, "3\nNULL 0 Common 0\nT 5 Latin 1\n")?;
                }
            }
            "set_unicharset_properties" => {
                if let Some(path) = value_after(&args, "-X") {
                    fs::write(path, "Arial 24\n")?;
                }
            }
            "tesseract" => {
                if let Some(base) = args.get(1) {
                    let skip = self
                        .skip_lstmf_for_base
                        .as_deref()
                        .is_some_and(|needle| base.contains(needle));
                    if !skip {
                        fs::write(format!("{}.lstmf", base), "lstmf")?;
                    }
                }
            }
            "combine_lang_model" => {
                if let (Some(output), Some(lang)) =
                    (value_after(&args, "--output_dir"), value_after(&args, "--lang"))
                {
                    let dir = Path::new(&output).join(&lang);
                    fs::create_dir_all(&dir)?;
                    fs::write(dir.join(format!("{}.traineddata", lang)), "traineddata")?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl ToolRunner for MockToolRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), PipelineError> {
        self.calls.lock().push(invocation.clone());

        if self.failing_tool.as_deref() == Some(invocation.program.as_str()) {
            return Err(PipelineError::ToolFailed {
                tool: invocation.program.clone(),
                status: "exit status: 1".to_string(),
                output: "simulated failure".to_string(),
            });
        }

        self.simulate(invocation).map_err(|e| PipelineError::ToolFailed {
            tool: invocation.program.clone(),
            status: "mock i/o error".to_string(),
            output: e.to_string(),
        })
    }
}

/// Value of a `--name=value` argument
pub fn flag_value(args: &[String], prefix: &str) -> Option<String> {
    args.iter()
        .find_map(|arg| arg.strip_prefix(prefix))
        .map(str::to_string)
}

/// Argument following `name`
pub fn value_after(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

/// Paths passed as `--outputbase=` to image renders
pub fn rendered_bases(runner: &MockToolRunner) -> Vec<PathBuf> {
    runner
        .calls_to("text2image")
        .iter()
        .filter(|call| call.has_arg("--strip_unrenderable_words") && !call.has_arg("--only_extract_font_properties"))
        .filter_map(|call| flag_value(&call.args_lossy(), "--outputbase="))
        .map(PathBuf::from)
        .collect()
}
