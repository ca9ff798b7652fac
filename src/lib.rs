/*!
 * # tesstrain - training data generation for the Tesseract line recogniser
 *
 * Drives the external Tesseract training tools to turn a training text and a
 * list of fonts into line-level training data and a starter model.
 *
 * ## Pipeline
 *
 * - Font cache isolation: one throwaway render populates a private fontconfig cache
 * - Phase I: render every font at every exposure level (box + image pairs),
 *   plus optional font-property renders of a sampled n-gram text
 * - Phase UP: extract the unicharset and its properties from the box files
 * - Phase E: extract `.lstmf` features from every rendered image
 * - Assembly: build the starter model, move the training data to the output
 *   directory and write the training file manifest
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Run-independent configuration (workers, tool lookup, logging)
 * - `context`: Per-run options, derived paths and phase outputs
 * - `language_params`: Per-language fonts and model parameters
 * - `command_runner`: Tool resolution and process execution
 * - `corpus_sampler`: Frequency-based n-gram selection
 * - `pipeline`: The phases, their worker pool and the sequencer
 * - `file_utils`: File system operations
 * - `logging`: Console and run-log output
 * - `errors`: Error taxonomy for failed runs
 */

#![allow(clippy::uninlined_format_args)]

pub mod app_config;
pub mod command_runner;
pub mod context;
pub mod corpus_sampler;
pub mod errors;
pub mod file_utils;
pub mod language_params;
pub mod logging;
pub mod pipeline;

// Re-export main types for easier usage
pub use app_config::Config;
pub use command_runner::{ProcessRunner, ToolInvocation, ToolResolver, ToolRunner};
pub use context::{PolicyFlags, RunContext, TrainingOptions};
pub use errors::PipelineError;
pub use language_params::{BuiltinLanguageTable, LanguageParameters, LanguageResolver};
pub use pipeline::{RunReport, TrainingPipeline};
