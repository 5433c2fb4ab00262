//! Turns a conversion request into an ordered batch of variants.
//!
//! Planning is pure: no filesystem access and no validation of bitrate or
//! resolution syntax. Malformed tokens are handed to the encoder unchanged
//! and surface as conversion failures.

use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::ToSchema;

use crate::config::settings::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_MP3_BITRATES, DEFAULT_MP4_RESOLUTIONS, DEFAULT_VIDEO_BITRATE,
};
use crate::modules::conversion::model::{ConversionMode, Encoding, VariantSpec, stem_of};

/// Fallbacks used when a request leaves a parameter empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanDefaults {
    pub mp3_bitrates: Vec<String>,
    pub mp4_resolutions: Vec<String>,
    pub video_bitrate: String,
    pub audio_bitrate: String,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            mp3_bitrates: DEFAULT_MP3_BITRATES.iter().map(|s| s.to_string()).collect(),
            mp4_resolutions: DEFAULT_MP4_RESOLUTIONS.iter().map(|s| s.to_string()).collect(),
            video_bitrate: DEFAULT_VIDEO_BITRATE.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
        }
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build one [`VariantSpec`] per requested token, in request order.
///
/// Outputs are named `{input-stem}_{token}.{mp3|mp4}` inside `output_dir`.
/// Duplicate tokens yield duplicate specs pointing at the same file.
pub fn plan(
    input: &Path,
    output_dir: &Path,
    mode: &ConversionMode,
    defaults: &PlanDefaults,
) -> Vec<VariantSpec> {
    let stem = stem_of(input);
    let ext = mode.format().extension();

    let encodings: Vec<Encoding> = match mode {
        ConversionMode::AudioBitrateSet { bitrates } => or_defaults(bitrates, &defaults.mp3_bitrates)
            .iter()
            .map(|bitrate| Encoding::Audio {
                bitrate: bitrate.clone(),
            })
            .collect(),
        ConversionMode::VideoResolutionSet {
            resolutions,
            video_bitrate,
            audio_bitrate,
        } => {
            let video_bitrate = non_blank(video_bitrate).unwrap_or(&defaults.video_bitrate);
            let audio_bitrate = non_blank(audio_bitrate).unwrap_or(&defaults.audio_bitrate);

            or_defaults(resolutions, &defaults.mp4_resolutions)
                .iter()
                .map(|resolution| Encoding::Video {
                    resolution: resolution.clone(),
                    video_bitrate: video_bitrate.to_string(),
                    audio_bitrate: audio_bitrate.to_string(),
                })
                .collect()
        }
    };

    encodings
        .into_iter()
        .map(|encoding| VariantSpec {
            input: input.to_path_buf(),
            output: output_dir.join(format!("{}_{}.{}", stem, encoding.token(), ext)),
            encoding,
        })
        .collect()
}

fn or_defaults<'a>(requested: &'a [String], defaults: &'a [String]) -> &'a [String] {
    if requested.is_empty() { defaults } else { requested }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
