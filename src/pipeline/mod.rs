/*!
 * Training phases and the sequencer that runs them.
 */

pub mod assembly;
pub mod features;
pub mod pool;
pub mod render;
pub mod sequencer;
pub mod unicharset;

pub use assembly::{assemble_artifacts, write_manifest, AssemblyReport};
pub use features::{extract_features, FeatureMode};
pub use pool::run_jobs;
pub use render::{generate_images, initialize_fontconfig, make_fontname, RenderSummary};
pub use sequencer::{RunReport, TrainingPipeline};
pub use unicharset::generate_unicharset;
