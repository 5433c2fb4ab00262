//! Sequential, fail-fast execution of a planned batch.

use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info};

use crate::common::error::{ConvertError, ConvertResult};
use crate::modules::conversion::model::{Encoding, VariantSpec};
use crate::pipeline::runner::{CommandInvocation, CommandRunner};

/// Outputs written by a fully successful batch, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outputs: Vec<PathBuf>,
}

impl BatchReport {
    /// Distinct output file names, sorted. Variants sharing a token wrote
    /// the same file and appear once.
    pub fn file_names(&self) -> Vec<String> {
        self.outputs
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Encoder invocation for one variant. Existing output files are overwritten.
pub fn transcode_invocation(ffmpeg: &str, spec: &VariantSpec) -> CommandInvocation {
    let cmd = CommandInvocation::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(&spec.input);

    let cmd = match &spec.encoding {
        Encoding::Audio { bitrate } => cmd.args(["-vn", "-b:a"]).arg(bitrate),
        Encoding::Video {
            resolution,
            video_bitrate,
            audio_bitrate,
        } => cmd
            .arg("-vf")
            .arg(format!("scale={resolution}"))
            .arg("-b:v")
            .arg(video_bitrate)
            .arg("-b:a")
            .arg(audio_bitrate),
    };

    cmd.arg(&spec.output)
}

/// Run every variant in order. The first failing variant stops the batch;
/// files written before it stay on disk.
pub async fn execute(
    runner: &dyn CommandRunner,
    ffmpeg: &str,
    specs: &[VariantSpec],
) -> ConvertResult<BatchReport> {
    let total = specs.len();
    let mut report = BatchReport::default();

    for (index, spec) in specs.iter().enumerate() {
        info!(
            "🎥 Transcoding variant {}/{}: {}",
            index + 1,
            total,
            spec.output.display()
        );

        let outcome = runner.run(&transcode_invocation(ffmpeg, spec)).await?;

        if !outcome.is_success() {
            error!(
                "❌ Variant {}/{} failed with exit code {:?}",
                index + 1,
                total,
                outcome.code
            );
            return Err(ConvertError::ConversionFailed {
                index,
                total,
                exit_code: outcome.code,
                output: spec.output.clone(),
                detail: outcome.stderr_tail,
            });
        }

        report.outputs.push(spec.output.clone());
    }

    info!("✅ Batch completed: {} variant(s)", total);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::runner::ExitOutcome;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// Succeeds for every call except `fail_at` (0-based).
    struct CountingRunner {
        fail_at: Option<usize>,
        calls: Mutex<Vec<CommandInvocation>>,
    }

    impl CountingRunner {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                fail_at,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for CountingRunner {
        async fn run(&self, invocation: &CommandInvocation) -> std::io::Result<ExitOutcome> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(invocation.clone());
            if Some(index) == self.fail_at {
                Ok(ExitOutcome::failure(1, "Invalid argument"))
            } else {
                Ok(ExitOutcome::success())
            }
        }
    }

    fn audio_spec(bitrate: &str) -> VariantSpec {
        VariantSpec {
            input: "in/song.wav".into(),
            output: format!("out/song_{bitrate}.mp3").into(),
            encoding: Encoding::Audio {
                bitrate: bitrate.into(),
            },
        }
    }

    #[test]
    fn audio_invocation_drops_video() {
        let inv = transcode_invocation("ffmpeg", &audio_spec("128k"));
        assert_eq!(inv.program, "ffmpeg");
        assert_eq!(
            inv.args,
            vec!["-y", "-i", "in/song.wav", "-vn", "-b:a", "128k", "out/song_128k.mp3"]
        );
    }

    #[test]
    fn video_invocation_scales_and_sets_bitrates() {
        let spec = VariantSpec {
            input: "clip.mov".into(),
            output: Path::new("out").join("clip_1280:720.mp4"),
            encoding: Encoding::Video {
                resolution: "1280:720".into(),
                video_bitrate: "1500k".into(),
                audio_bitrate: "96k".into(),
            },
        };
        let inv = transcode_invocation("/usr/bin/ffmpeg", &spec);
        assert_eq!(inv.program, "/usr/bin/ffmpeg");
        assert_eq!(
            inv.args,
            vec![
                "-y",
                "-i",
                "clip.mov",
                "-vf",
                "scale=1280:720",
                "-b:v",
                "1500k",
                "-b:a",
                "96k",
                "out/clip_1280:720.mp4"
            ]
        );
    }

    #[tokio::test]
    async fn successful_batch_runs_every_variant_in_order() {
        let runner = CountingRunner::new(None);
        let specs = vec![audio_spec("128k"), audio_spec("192k"), audio_spec("320k")];

        let report = execute(&runner, "ffmpeg", &specs).await.unwrap();

        assert_eq!(report.outputs.len(), 3);
        let calls = runner.calls.lock().unwrap();
        let bitrates: Vec<&str> = calls.iter().map(|c| c.args[5].to_str().unwrap()).collect();
        assert_eq!(bitrates, vec!["128k", "192k", "320k"]);
    }

    #[tokio::test]
    async fn failure_stops_the_batch() {
        for fail_at in 0..4 {
            let runner = CountingRunner::new(Some(fail_at));
            let specs: Vec<_> = ["a", "b", "c", "d"].into_iter().map(audio_spec).collect();

            let err = execute(&runner, "ffmpeg", &specs).await.unwrap_err();

            match err {
                ConvertError::ConversionFailed {
                    index,
                    total,
                    exit_code,
                    detail,
                    ..
                } => {
                    assert_eq!(index, fail_at);
                    assert_eq!(total, 4);
                    assert_eq!(exit_code, Some(1));
                    assert_eq!(detail, "Invalid argument");
                }
                other => panic!("unexpected error {other:?}"),
            }
            assert_eq!(runner.calls.lock().unwrap().len(), fail_at + 1);
        }
    }

    #[tokio::test]
    async fn empty_batch_succeeds_without_running_anything() {
        let runner = CountingRunner::new(Some(0));
        let report = execute(&runner, "ffmpeg", &[]).await.unwrap();
        assert!(report.outputs.is_empty());
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn report_names_are_distinct_and_sorted() {
        let report = BatchReport {
            outputs: vec![
                "out/song_320k.mp3".into(),
                "out/song_128k.mp3".into(),
                "out/song_320k.mp3".into(),
            ],
        };
        assert_eq!(report.file_names(), vec!["song_128k.mp3", "song_320k.mp3"]);
    }
}
