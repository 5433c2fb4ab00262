use serde::Serialize;
use utoipa::ToSchema;

use super::model::{ConversionMode, OutputFormat};
use crate::common::error::{ConvertError, ConvertResult};
use crate::common::upload::UploadedFile;
use crate::config::settings::AppConfig;
use crate::pipeline::acquire::InputSource;
use crate::pipeline::plan::parse_csv;

/// Raw fields of a conversion form, before any interpretation.
#[derive(Debug, Default)]
pub struct ConvertForm {
    pub media: Option<UploadedFile>,
    pub url: Option<String>,
    pub mode: Option<String>,
    pub bitrates: Option<String>,
    pub resolutions: Option<String>,
    pub video_bitrate: Option<String>,
    pub audio_bitrate: Option<String>,
}

/// A validated-shape request: one input source and one mode.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: InputSource,
    pub mode: ConversionMode,
}

impl ConvertForm {
    /// Pick the input source and build the mode.
    ///
    /// A URL wins over an upload, but a present upload is still
    /// type-checked so a bad file is reported rather than silently ignored.
    /// The caller discards a stored upload that lost to a URL.
    pub fn into_request(self, config: &AppConfig) -> ConvertResult<ConversionRequest> {
        let upload = self.media.filter(|f| !f.file_name.is_empty());
        let url = self
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        if let Some(upload) = &upload {
            InputSource::Upload(upload.clone()).validate(config)?;
        }

        let source = match (url, upload) {
            (Some(url), _) => InputSource::Remote(url),
            (None, Some(upload)) => InputSource::Upload(upload),
            (None, None) => return Err(ConvertError::MissingInput),
        };

        let mode = mode_from_fields(
            self.mode.as_deref(),
            self.bitrates.as_deref(),
            self.resolutions.as_deref(),
            self.video_bitrate,
            self.audio_bitrate,
        );

        Ok(ConversionRequest { source, mode })
    }
}

/// `mp3` (or nothing) selects audio; any other selector selects video.
pub fn mode_from_fields(
    mode: Option<&str>,
    bitrates: Option<&str>,
    resolutions: Option<&str>,
    video_bitrate: Option<String>,
    audio_bitrate: Option<String>,
) -> ConversionMode {
    let selector = mode.map(str::trim).filter(|m| !m.is_empty()).unwrap_or("mp3");

    if selector.eq_ignore_ascii_case("mp3") {
        ConversionMode::AudioBitrateSet {
            bitrates: parse_csv(bitrates.unwrap_or_default()),
        }
    } else {
        ConversionMode::VideoResolutionSet {
            resolutions: parse_csv(resolutions.unwrap_or_default()),
            video_bitrate,
            audio_bitrate,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversionResponse {
    #[schema(example = "3f2b8c1d9e4a4f6b8a7c2d1e0f9a8b7c")]
    pub job_id: String,
    pub format: OutputFormat,
    #[schema(example = json!(["song_128k.mp3", "song_320k.mp3"]))]
    pub outputs: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobOutputsResponse {
    pub job_id: String,
    pub outputs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::default()
    }

    fn stored(file_name: &str) -> UploadedFile {
        UploadedFile {
            file_name: file_name.into(),
            path: std::path::Path::new("uploads/job").join(file_name),
            size: 4,
        }
    }

    #[test]
    fn empty_form_is_missing_input() {
        let err = ConvertForm::default().into_request(&config()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingInput));
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let form = ConvertForm {
            media: Some(stored("")),
            url: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(form.into_request(&config()), Err(ConvertError::MissingInput)));
    }

    #[test]
    fn upload_with_bad_extension_is_rejected_even_with_url() {
        let form = ConvertForm {
            media: Some(stored("virus.exe")),
            url: Some("https://example.com/v".into()),
            ..Default::default()
        };
        assert!(matches!(
            form.into_request(&config()),
            Err(ConvertError::UnsupportedType(ext)) if ext == "exe"
        ));
    }

    #[test]
    fn url_takes_precedence_over_upload() {
        let form = ConvertForm {
            media: Some(stored("song.wav")),
            url: Some(" https://example.com/v ".into()),
            ..Default::default()
        };
        let request = form.into_request(&config()).unwrap();
        assert!(matches!(request.source, InputSource::Remote(url) if url == "https://example.com/v"));
    }

    #[test]
    fn stored_upload_becomes_the_source() {
        let form = ConvertForm {
            media: Some(stored("song.wav")),
            ..Default::default()
        };
        let request = form.into_request(&config()).unwrap();
        assert!(matches!(
            request.source,
            InputSource::Upload(upload) if upload.path.ends_with("uploads/job/song.wav")
        ));
    }

    #[test]
    fn audio_is_the_default_mode() {
        let mode = mode_from_fields(None, Some("128k, 320k"), None, None, None);
        assert_eq!(
            mode,
            ConversionMode::AudioBitrateSet {
                bitrates: vec!["128k".into(), "320k".into()]
            }
        );
    }

    #[test]
    fn non_mp3_selector_means_video() {
        for selector in ["mp4", "MP4", "webm"] {
            let mode = mode_from_fields(
                Some(selector),
                Some("128k"),
                Some("1280:720"),
                Some("1500k".into()),
                Some("96k".into()),
            );
            assert_eq!(
                mode,
                ConversionMode::VideoResolutionSet {
                    resolutions: vec!["1280:720".into()],
                    video_bitrate: Some("1500k".into()),
                    audio_bitrate: Some("96k".into()),
                }
            );
        }
    }
}
