use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use tracing::{instrument, warn};

use super::dto::{IdentifyRequest, IdentifyResponse};
use crate::{error::AppError, state::AppState};

const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;
/// Base64 inflates by 4/3; the rest covers the JSON envelope and a data-URL prefix.
const MAX_BASE64_BODY_BYTES: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/food/identify",
            post(identify_base64).layer(DefaultBodyLimit::max(MAX_BASE64_BODY_BYTES)),
        )
        .route(
            "/food/identify/upload",
            post(identify_upload).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
}

/// Classifies the image and records any food found in history.
async fn identify_and_record(state: &AppState, image: &[u8]) -> Result<IdentifyResponse, AppError> {
    let identification = state.classifier.identify_food(image).await?;
    if let Some(food) = identification.food() {
        state.history.append(food.clone()).await;
    }
    Ok(identification.into())
}

fn decode_image(raw: &str) -> Result<Vec<u8>, AppError> {
    let payload = match raw.split_once("base64,") {
        Some((_, data)) => data,
        None => raw,
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::bad_request("invalid base64"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("image is empty"));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::bad_request("image exceeds 20 MB"));
    }
    Ok(bytes)
}

/// POST /food/identify { image_b64: "..." }
#[instrument(skip(state, body))]
pub async fn identify_base64(
    State(state): State<AppState>,
    Json(body): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>, AppError> {
    let image = decode_image(&body.image_b64)?;
    Ok(Json(identify_and_record(&state, &image).await?))
}

/// POST /food/identify/upload (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn identify_upload(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<IdentifyResponse>, AppError> {
    let mut image: Option<Bytes> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(e.to_string()))?;
            image = Some(data);
            break;
        }
    }
    let Some(image) = image.filter(|b| !b.is_empty()) else {
        warn!("multipart upload without image field");
        return Err(AppError::bad_request("image is required"));
    };
    Ok(Json(identify_and_record(&state, &image).await?))
}

#[cfg(test)]
mod food_handler_tests {
    use super::*;

    #[test]
    fn decode_accepts_data_url_prefix() {
        assert_eq!(decode_image("data:image/jpeg;base64,anBlZw==").unwrap(), b"jpeg");
        assert_eq!(decode_image("anBlZw==").unwrap(), b"jpeg");
        assert!(decode_image("***").is_err());
        assert!(decode_image("").is_err());
    }

    #[test]
    fn json_limit_fits_a_full_size_encoded_image() {
        let encoded_len = MAX_IMAGE_BYTES.div_ceil(3) * 4;
        let envelope = r#"{"image_b64":"data:image/jpeg;base64,"}"#.len();
        assert!(encoded_len + envelope <= MAX_BASE64_BODY_BYTES);
    }

    #[test]
    fn decoded_image_over_limit_is_rejected() {
        let encoded = STANDARD.encode(vec![0u8; MAX_IMAGE_BYTES + 1]);
        let err = decode_image(&encoded).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
