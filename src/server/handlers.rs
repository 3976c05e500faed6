// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::SplitBillResponse;
use crate::services::image::ImageAttachment;

use super::AppState;

const CONTEXT_FIELD: &str = "user_bill_context";
const IMAGE_FIELD: &str = "image";

#[derive(Serialize)]
pub(super) struct HeartbeatResponse {
    status: &'static str,
}

struct Upload {
    context: String,
    image: Vec<u8>,
    content_type: Option<String>,
}

type Rejection = (StatusCode, Json<SplitBillResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    let message = message.into();
    warn!(%status, %message, "rejecting split request");
    (status, Json(SplitBillResponse::error(message)))
}

fn multipart_rejection(e: MultipartError) -> Rejection {
    reject(e.status(), format!("invalid multipart body: {}", e.body_text()))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, Rejection> {
    let mut context = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_rejection)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(CONTEXT_FIELD) => {
                context = Some(field.text().await.map_err(multipart_rejection)?);
            }
            Some(IMAGE_FIELD) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_rejection)?;
                image = Some((bytes.to_vec(), content_type));
            }
            _ => {}
        }
    }

    let context = context.ok_or_else(|| {
        reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("missing form field '{CONTEXT_FIELD}'"),
        )
    })?;
    let (image, content_type) = image.ok_or_else(|| {
        reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("missing form field '{IMAGE_FIELD}'"),
        )
    })?;

    Ok(Upload {
        context,
        image,
        content_type,
    })
}

/// POST /api/split_bill
///
/// Extraction and validation failures keep a 200 status with
/// `"status": "error"`, which is what the web client checks.
pub(super) async fn split_bill(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SplitBillResponse>, Rejection> {
    let upload = read_upload(&mut multipart).await?;

    let image = ImageAttachment::from_bytes(&upload.image, upload.content_type.as_deref())
        .map_err(|e| reject(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    match state
        .extractor
        .extract_and_split(&upload.context, &image)
        .await
    {
        Ok((bill, calculation)) => {
            info!(
                people = calculation.per_person_split.len(),
                items = calculation.shared_item_counts.len(),
                total = %calculation.total_amount,
                currency = %bill.bill_item.currency,
                "bill split"
            );
            Ok(Json(SplitBillResponse::ok(bill, calculation)))
        }
        Err(e) => {
            error!(error = %e, validation = e.is_validation(), "error processing request");
            Ok(Json(SplitBillResponse::error(e.to_string())))
        }
    }
}

/// POST /api/heartbeat
pub(super) async fn heartbeat(State(state): State<AppState>) -> Json<HeartbeatResponse> {
    let status = if state.heartbeat.check().await {
        "ok"
    } else {
        "mongo error"
    };
    Json(HeartbeatResponse { status })
}
