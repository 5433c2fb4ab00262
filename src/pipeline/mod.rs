//! Conversion pipeline: acquire → plan → execute.
//!
//! Each stage is usable on its own; [`convert_into`] chains planning and
//! execution for callers that already have an input file.

pub mod acquire;
pub mod execute;
pub mod plan;
pub mod runner;

use std::path::Path;
use tracing::info;

use crate::common::error::ConvertResult;
use crate::config::settings::AppConfig;
use crate::modules::conversion::model::ConversionMode;
use runner::CommandRunner;

/// Plan and run every variant of `input` into `output_dir`, which must
/// already exist.
pub async fn convert_into(
    runner: &dyn CommandRunner,
    config: &AppConfig,
    input: &Path,
    output_dir: &Path,
    mode: &ConversionMode,
) -> ConvertResult<execute::BatchReport> {
    let specs = plan::plan(input, output_dir, mode, &config.defaults);
    info!(
        "Planned {} {} variant(s) for {}",
        specs.len(),
        mode.format().extension(),
        input.display()
    );

    execute::execute(runner, &config.ffmpeg_bin, &specs).await
}
