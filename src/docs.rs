use utoipa::OpenApi;
use crate::modules::conversion::dto::{ConversionResponse, JobOutputsResponse};
use crate::modules::conversion::model::OutputFormat;
use crate::pipeline::plan::PlanDefaults;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::conversion::handler::get_defaults,
        crate::modules::conversion::handler::create_conversion,
        crate::modules::conversion::handler::list_outputs,
        crate::modules::conversion::download_handler::download_output,
    ),
    components(
        schemas(
            ConversionResponse, JobOutputsResponse, OutputFormat, PlanDefaults,
        )
    ),
    tags(
        (name = "Conversion", description = "Multi-bitrate MP3 and multi-resolution MP4 conversion")
    )
)]
pub struct ApiDoc;
