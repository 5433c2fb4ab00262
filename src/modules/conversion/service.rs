use std::path::PathBuf;
use tracing::info;

use super::dto::{ConversionRequest, ConversionResponse, JobOutputsResponse};
use super::model::Job;
use crate::common::error::ConvertResult;
use crate::infrastructure::storage::registry::{JobId, list_files};
use crate::pipeline::acquire::{InputAcquirer, InputSource};
use crate::pipeline::convert_into;
use crate::pipeline::runner::ensure_available;
use crate::state::AppState;

pub struct ConversionService;

impl ConversionService {
    /// Fail with `ToolUnavailable` when the encoder is missing, or the
    /// downloader when `source` is remote.
    pub fn ensure_tools(state: &AppState, source: Option<&InputSource>) -> ConvertResult<()> {
        let config = state.config.as_ref();

        ensure_available(state.runner.as_ref(), &config.ffmpeg_bin)?;
        if let Some(tool) = source.and_then(|s| s.required_tool(config)) {
            ensure_available(state.runner.as_ref(), tool)?;
        }
        Ok(())
    }

    /// Run one job end to end under a fresh id.
    pub async fn convert(state: AppState, req: ConversionRequest) -> ConvertResult<ConversionResponse> {
        let id = state.registry.allocate();
        Self::convert_job(state, id, req).await
    }

    /// Run a job whose id was allocated up front, writing into the job's own
    /// output directory. Used when an upload was streamed under `id` first.
    pub async fn convert_job(
        state: AppState,
        id: JobId,
        req: ConversionRequest,
    ) -> ConvertResult<ConversionResponse> {
        let input = Self::acquire(&state, &id, &req.source).await?;
        let job = Job {
            output_dir: state.registry.create_output_dir(&id).await?,
            id,
            input,
            mode: req.mode,
        };
        info!("📦 Job {} accepted for {}", job.id, job.input_stem());

        convert_into(
            state.runner.as_ref(),
            &state.config,
            &job.input,
            &job.output_dir,
            &job.mode,
        )
        .await?;

        let outputs = list_files(&job.output_dir).await?;
        info!("✅ Job {} produced {} file(s)", job.id, outputs.len());

        Ok(ConversionResponse {
            job_id: job.id.to_string(),
            format: job.mode.format(),
            outputs,
        })
    }

    /// Write the variants straight into `output_dir` and return the paths
    /// this run produced. Files already in the directory are not reported.
    pub async fn convert_to_dir(
        state: AppState,
        req: ConversionRequest,
        output_dir: PathBuf,
    ) -> ConvertResult<Vec<PathBuf>> {
        let id = state.registry.allocate();
        let input = Self::acquire(&state, &id, &req.source).await?;
        tokio::fs::create_dir_all(&output_dir).await?;

        let report = convert_into(
            state.runner.as_ref(),
            &state.config,
            &input,
            &output_dir,
            &req.mode,
        )
        .await?;

        Ok(report
            .file_names()
            .into_iter()
            .map(|name| output_dir.join(name))
            .collect())
    }

    // Allocating an id has no filesystem effect, so validation and tool
    // checks here still run before the first directory is made.
    async fn acquire(state: &AppState, id: &JobId, source: &InputSource) -> ConvertResult<PathBuf> {
        source.validate(&state.config)?;
        Self::ensure_tools(state, Some(source))?;

        InputAcquirer::new(state.runner.as_ref(), &state.registry, &state.config)
            .acquire(id, source)
            .await
    }

    pub async fn list_outputs(state: AppState, job_id: &str) -> ConvertResult<JobOutputsResponse> {
        let id: JobId = job_id.parse()?;
        let outputs = state.registry.list_outputs(&id).await?;

        Ok(JobOutputsResponse {
            job_id: id.to_string(),
            outputs,
        })
    }

    pub async fn resolve_output(state: AppState, job_id: &str, filename: &str) -> ConvertResult<PathBuf> {
        let id: JobId = job_id.parse()?;
        state.registry.resolve(&id, filename).await
    }
}
