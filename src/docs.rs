use utoipa::OpenApi;
use crate::common::response::Outcome;
use crate::modules::hls::dto::{MasterManifestRequest, StoredVariant};
use crate::modules::media::dto::*;
use crate::modules::transcoding::dto::*;
use crate::modules::transcoding::model::JobStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::streaming::handler::stream_object,
        crate::modules::hls::handler::master_manifest,
        crate::modules::hls::handler::episode_file,
        crate::modules::hls::handler::variant_file,
        crate::modules::transcoding::handler::start_transcode,
        crate::modules::transcoding::handler::get_job_status,
        crate::modules::media::handler::upload_video,
        crate::modules::media::handler::upload_thumbnail,
        crate::modules::media::handler::presigned_url,
    ),
    components(
        schemas(
            Outcome,
            MasterManifestRequest, StoredVariant,
            StartTranscodeRequest, JobTicket, JobResult, VariantInfo, JobStatus,
            VideoUploadResponse, ThumbnailUploadResponse, PresignedUrlResponse,
        )
    ),
    tags(
        (name = "Streaming", description = "Byte-range object streaming"),
        (name = "HLS", description = "HLS manifests and segments"),
        (name = "Transcoding", description = "Adaptive bitrate transcoding jobs"),
        (name = "Media", description = "Episode asset uploads")
    )
)]
pub struct ApiDoc;
