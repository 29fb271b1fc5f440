//! Test-data surface: synthetic generation, manual inserts, device listing,
//! example payloads, and cleanup. Unauthenticated by design; this surface
//! exists for development and demo environments.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    response::IntoResponse,
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::database::feedback_repository::TypeCountRow;
use crate::error::AppError;
use crate::generator::{plan_devices, plan_feedback_batch, random_ip, random_session_id, CountPolicy};
use crate::models::FeedbackType;
use crate::response::ApiResponse;
use crate::sampler::{FeedbackTypeSampler, SamplingConfig};
use crate::state::AppState;

const DEFAULT_DEVICES_COUNT: u32 = 5;
const DEFAULT_FEEDBACKS_PER_DEVICE: u32 = 50;
const DEFAULT_DAYS_RANGE: u32 = 30;
const MAX_DAYS_RANGE: u32 = 365;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateTestDataRequest {
    pub devices_count: Option<u32>,
    pub feedbacks_count: Option<u32>,
    pub feedbacks_per_device: Option<u32>,
    pub days_range: Option<u32>,
    pub feedback_types: Option<Vec<FeedbackType>>,
    pub unsatisfied_percentage: Option<u32>,
    pub neutral_percentage: Option<u32>,
    pub satisfied_percentage: Option<u32>,
    pub distribute_evenly: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ManualFeedbackRequest {
    pub device_id: Uuid,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
}

pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateTestDataRequest>,
) -> Result<axum::response::Response, AppError> {
    let errors = validate_ranges(&request);
    if !errors.is_empty() {
        return Ok(validation_errors_response(errors).into_response());
    }

    // Semantic validation happens here, before any row is written.
    let config = SamplingConfig::from_parameters(
        request.feedback_types.as_deref(),
        request.unsatisfied_percentage,
        request.neutral_percentage,
        request.satisfied_percentage,
    )?;

    let devices_count = request.devices_count.unwrap_or(DEFAULT_DEVICES_COUNT);
    let days_range = request.days_range.unwrap_or(DEFAULT_DAYS_RANGE);
    let distribute_evenly = request.distribute_evenly.unwrap_or(true);
    let policy = match request.feedbacks_count {
        Some(total) => CountPolicy::GlobalTotal {
            total,
            distribute_evenly,
        },
        None => CountPolicy::PerDevice(
            request
                .feedbacks_per_device
                .unwrap_or(DEFAULT_FEEDBACKS_PER_DEVICE),
        ),
    };

    let mut rng = StdRng::from_entropy();
    let mut sampler = FeedbackTypeSampler::new(&config, StdRng::from_entropy());

    let devices = plan_devices(&mut rng, devices_count);
    let batch = plan_feedback_batch(
        &mut rng,
        &mut sampler,
        devices.len(),
        policy,
        days_range,
    );

    state.devices.insert_batch(&devices).await?;
    let feedbacks_created = state.feedbacks.insert_planned_batch(&devices, &batch).await?;

    let device_ids: Vec<Uuid> = devices.iter().map(|d| d.id).collect();
    let distribution = state.feedbacks.distribution_for_devices(&device_ids).await?;

    let response = ApiResponse::success(
        "Test data generated successfully",
        json!({
            "devices_created": devices.len(),
            "feedbacks_created": feedbacks_created,
            "feedback_distribution": distribution_summary(&distribution),
            "configuration_used": config.summary(),
            "devices": devices,
        }),
    );

    Ok(response.into_response())
}

pub async fn add_manual_feedback(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<ManualFeedbackRequest>,
) -> Result<axum::response::Response, AppError> {
    let device = match state.devices.get_summary(request.device_id).await? {
        Some(device) => device,
        None => {
            let errors = vec![("device_id", "device does not exist".to_string())];
            return Ok(validation_errors_response(errors).into_response());
        }
    };

    let mut rng = StdRng::from_entropy();
    let session_id = request
        .session_id
        .unwrap_or_else(|| random_session_id(&mut rng));
    let ip_address = request
        .ip_address
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| random_ip(&mut rng));

    let inserted = state
        .feedbacks
        .insert(device.id, request.feedback_type, &session_id, &ip_address)
        .await?;

    let response = ApiResponse::success(
        "Feedback added successfully",
        json!({
            "id": inserted.id,
            "device_name": device.name,
            "device_code": device.code,
            "type": request.feedback_type,
            "session_id": session_id,
            "ip_address": ip_address,
            "created_at": inserted.created_at,
        }),
    );

    Ok(response.into_response())
}

pub async fn devices_for_testing(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let devices = state.devices.list_summaries().await?;
    Ok(ApiResponse::success("Devices retrieved", devices))
}

pub async fn clean(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let feedbacks_deleted = state.feedbacks.count().await?;
    let devices_deleted = state.devices.count().await?;

    state.feedbacks.truncate().await?;
    state.devices.truncate().await?;

    Ok(ApiResponse::success(
        "Test data deleted successfully",
        json!({
            "feedbacks_deleted": feedbacks_deleted,
            "devices_deleted": devices_deleted,
        }),
    ))
}

/// Static catalogue of ready-to-send payloads for the generate endpoint.
pub async fn configuration_examples() -> impl IntoResponse {
    ApiResponse::success(
        "Configuration examples",
        json!({
            "examples": {
                "default_configuration": {
                    "description": "Default configuration with a balanced distribution",
                    "payload": {
                        "devices_count": 5,
                        "feedbacks_per_device": 50,
                        "days_range": 30,
                    },
                },
                "custom_percentages": {
                    "description": "Custom percentages",
                    "payload": {
                        "devices_count": 3,
                        "feedbacks_count": 200,
                        "days_range": 15,
                        "unsatisfied_percentage": 10,
                        "neutral_percentage": 25,
                        "satisfied_percentage": 65,
                        "distribute_evenly": true,
                    },
                },
                "only_satisfied": {
                    "description": "Satisfied feedback only",
                    "payload": {
                        "devices_count": 2,
                        "feedbacks_per_device": 30,
                        "days_range": 7,
                        "feedback_types": ["satisfied"],
                    },
                },
                "only_neutral": {
                    "description": "Neutral feedback only",
                    "payload": {
                        "devices_count": 4,
                        "feedbacks_count": 100,
                        "days_range": 20,
                        "feedback_types": ["neutral"],
                        "distribute_evenly": false,
                    },
                },
                "mixed_types": {
                    "description": "A mix of specific types",
                    "payload": {
                        "devices_count": 3,
                        "feedbacks_per_device": 40,
                        "days_range": 10,
                        "feedback_types": ["unsatisfied", "satisfied"],
                    },
                },
                "high_satisfaction": {
                    "description": "Very high satisfaction (90%)",
                    "payload": {
                        "devices_count": 5,
                        "feedbacks_count": 500,
                        "days_range": 60,
                        "unsatisfied_percentage": 5,
                        "neutral_percentage": 5,
                        "satisfied_percentage": 90,
                    },
                },
            },
            "parameters_documentation": {
                "devices_count": "Number of devices to create",
                "feedbacks_count": "Global total of feedbacks, distributed across all devices",
                "feedbacks_per_device": "Feedbacks per device (used when feedbacks_count is absent)",
                "days_range": "Window in days to spread feedback timestamps over (1-365)",
                "feedback_types": "Specific types to generate: ['unsatisfied', 'neutral', 'satisfied']",
                "unsatisfied_percentage": "Share of unsatisfied feedback (0-100)",
                "neutral_percentage": "Share of neutral feedback (0-100)",
                "satisfied_percentage": "Share of satisfied feedback (0-100)",
                "distribute_evenly": "Spread the global total evenly across devices (true/false)",
            },
        }),
    )
}

// ---------------------------------------------------------------------------
// Validation & shaping helpers
// ---------------------------------------------------------------------------

fn validate_ranges(request: &GenerateTestDataRequest) -> Vec<(&'static str, String)> {
    let mut errors = Vec::new();

    if request.devices_count == Some(0) {
        errors.push(("devices_count", "must be at least 1".to_string()));
    }
    if request.feedbacks_count == Some(0) {
        errors.push(("feedbacks_count", "must be at least 1".to_string()));
    }
    if request.feedbacks_per_device == Some(0) {
        errors.push(("feedbacks_per_device", "must be at least 1".to_string()));
    }
    if let Some(days) = request.days_range {
        if days == 0 || days > MAX_DAYS_RANGE {
            errors.push((
                "days_range",
                format!("must be between 1 and {MAX_DAYS_RANGE}"),
            ));
        }
    }

    errors
}

fn validation_errors_response(errors: Vec<(&'static str, String)>) -> ApiResponse<JsonValue> {
    let mut map: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (field, message) in errors {
        map.entry(field).or_default().push(message);
    }

    ApiResponse::error(
        axum::http::StatusCode::UNPROCESSABLE_ENTITY,
        "Validation errors",
        Some(json!(map)),
    )
}

/// Fold per-type counts into `{type: {count, percentage}, total}`.
fn distribution_summary(rows: &[TypeCountRow]) -> JsonValue {
    let total: i64 = rows.iter().map(|row| row.count).sum();

    let mut summary = serde_json::Map::new();
    for ty in FeedbackType::ALL {
        let count = rows
            .iter()
            .find(|row| row.feedback_type == ty)
            .map(|row| row.count)
            .unwrap_or(0);
        let percentage = if total > 0 {
            ((count as f64 / total as f64) * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        summary.insert(
            ty.as_str().to_string(),
            json!({ "count": count, "percentage": percentage }),
        );
    }
    summary.insert("total".to_string(), json!(total));

    JsonValue::Object(summary)
}
