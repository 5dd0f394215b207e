use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info, info_span, warn, Instrument};

use rawpeek_core::api_types::{ErrorResponse, GenerateThumbnailRequest, GenerateThumbnailResponse};
use rawpeek_core::error::{RawPeekError, Result};
use rawpeek_core::scratch::ScratchSpace;
use rawpeek_transfer::{parse_http_url, raw_extension_for};

use crate::state::AppState;

const FAILURE_DETAILS: &str =
    "RAW thumbnail generation failed. The file may not contain extractable preview images.";

/// POST /generate-thumbnail: download a RAW file, extract a preview, upload it.
///
/// Scratch files live for exactly this call. If the request deadline passes
/// or the client goes away, the in-flight future is dropped, which kills any
/// running tool and drops the scratch space.
pub async fn generate_thumbnail(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateThumbnailRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        // A non-JSON body carries no fields at all.
        Err(JsonRejection::MissingJsonContentType(_)) => {
            return bad_request("Missing parameters".to_string());
        }
        Err(rejection) => {
            warn!(error = %rejection, "Rejected thumbnail request body");
            return bad_request(format!("Invalid request body: {}", rejection.body_text()));
        }
    };

    let Some((raw_url, upload_url)) = request.urls() else {
        return bad_request("Missing parameters".to_string());
    };

    for url in [raw_url, upload_url] {
        if let Err(e) = parse_http_url(url) {
            return bad_request(format!("Invalid parameters: {e}"));
        }
    }

    let scratch = ScratchSpace::for_request(&state.config.scratch_dir);
    let request_id = scratch.token().to_string();
    let deadline = state.config.request_timeout();

    let outcome = tokio::time::timeout(deadline, generate(&state, raw_url, upload_url, &scratch))
        .instrument(info_span!("thumbnail", request_id = %request_id))
        .await
        .unwrap_or(Err(RawPeekError::RequestTimeout(deadline)));

    let removed = scratch.cleanup();
    debug!(request_id = %request_id, removed, "Scratch files cleaned up");

    match outcome {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Error generating preview");
            failure(e)
        }
    }
}

async fn generate(
    state: &AppState,
    raw_url: &str,
    upload_url: &str,
    scratch: &ScratchSpace,
) -> Result<GenerateThumbnailResponse> {
    info!("Starting RAW thumbnail generation");

    let raw_path = scratch.path_for("raw", &raw_extension_for(raw_url));
    let downloaded = state.downloader.download(raw_url, &raw_path).await?;
    info!(bytes = downloaded, "RAW file ready");

    let (extraction_method, image) = state.pipeline.run(&raw_path, scratch).await?.into_result()?;
    let thumbnail_size = image.len();
    info!(method = %extraction_method, bytes = thumbnail_size, "Using extracted preview");

    let receipt = state.uploader.upload(upload_url, image).await?;

    Ok(GenerateThumbnailResponse {
        success: true,
        storage_id: receipt.storage_id,
        extraction_method,
        thumbnail_size,
    })
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

fn failure(err: RawPeekError) -> Response {
    let mut body = ErrorResponse::new(err.to_string()).with_details(FAILURE_DETAILS);
    if let RawPeekError::PipelineExhausted { attempts } = err {
        body = body.with_attempts(attempts);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
