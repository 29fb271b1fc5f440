//! Dashboard insights: global stats, temporal trends, device performance,
//! hourly patterns, sentiment distribution, alerts, and the combined payload.
//!
//! Chart payloads follow the shapes the dashboard frontend charts expect
//! (categories + series), so most endpoints return assembled JSON values.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::database::dashboard_queries::{DeviceRankingRow, TrendRow};
use crate::error::AppError;
use crate::models::FeedbackType;
use crate::response::ApiResponse;
use crate::state::AppState;

const LOW_SATISFACTION_THRESHOLD: f64 = 60.0;
const LOW_SATISFACTION_MIN_FEEDBACKS: i64 = 5;
const INACTIVITY_DAYS: i64 = 7;

const COLOR_GREEN: &str = "#28a745";
const COLOR_YELLOW: &str = "#ffc107";
const COLOR_ORANGE: &str = "#fd7e14";
const COLOR_RED: &str = "#dc3545";
const COLOR_BLUE: &str = "#007bff";
const COLOR_TEAL: &str = "#17a2b8";
const COLOR_CORAL: &str = "#ff6b6b";

/// Trend bucketing requested through `?period=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl TrendPeriod {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("weekly") => TrendPeriod::Weekly,
            Some("monthly") => TrendPeriod::Monthly,
            _ => TrendPeriod::Daily,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub period: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SentimentQuery {
    pub period: Option<i64>,
}

/// The combined endpoint reuses `period` for both the trend bucketing
/// (string) and the sentiment window in days (number).
#[derive(Debug, Deserialize)]
pub struct CompleteQuery {
    pub period: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn global_statistics(
    State(state): State<AppState>,
) -> Result<Json<JsonValue>, AppError> {
    Ok(Json(global_statistics_payload(&state).await?))
}

pub async fn temporal_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Result<ApiResponse<JsonValue>, AppError> {
    let period = TrendPeriod::parse(query.period.as_deref());
    let (start, end) = resolve_date_range(query.start_date, query.end_date);

    let data = temporal_trends_payload(&state, period, start, end).await?;
    Ok(ApiResponse::success("Temporal trends", data))
}

pub async fn device_performance(
    State(state): State<AppState>,
) -> Result<Json<JsonValue>, AppError> {
    Ok(Json(device_performance_payload(&state).await?))
}

pub async fn hourly_patterns(State(state): State<AppState>) -> Result<Json<JsonValue>, AppError> {
    Ok(Json(hourly_patterns_payload(&state).await?))
}

pub async fn sentiment_distribution(
    State(state): State<AppState>,
    Query(query): Query<SentimentQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let days = query.period.unwrap_or(7);
    Ok(Json(sentiment_distribution_payload(&state, days).await?))
}

pub async fn alerts(State(state): State<AppState>) -> Result<Json<JsonValue>, AppError> {
    Ok(Json(alerts_payload(&state).await?))
}

/// Every insight in one response.
pub async fn complete(
    State(state): State<AppState>,
    Query(query): Query<CompleteQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let trend_period = TrendPeriod::parse(query.period.as_deref());
    let (start, end) = resolve_date_range(query.start_date, query.end_date);
    let sentiment_days = query
        .period
        .as_deref()
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(7);

    Ok(Json(json!({
        "global_stats": global_statistics_payload(&state).await?,
        "temporal_trends": temporal_trends_payload(&state, trend_period, start, end).await?,
        "device_performance": device_performance_payload(&state).await?,
        "hourly_patterns": hourly_patterns_payload(&state).await?,
        "sentiment_distribution": sentiment_distribution_payload(&state, sentiment_days).await?,
        "alerts": alerts_payload(&state).await?,
        "last_updated": Utc::now().to_rfc3339(),
    })))
}

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

async fn global_statistics_payload(state: &AppState) -> Result<JsonValue, AppError> {
    let stats = state.dashboard.global_statistics().await?;

    Ok(json!({
        "total_feedbacks": stats.total_feedbacks,
        "satisfied_count": stats.satisfied_count,
        "neutral_count": stats.neutral_count,
        "unsatisfied_count": stats.unsatisfied_count,
        "satisfaction_rate": stats.satisfaction_rate,
        "chart_data": {
            "satisfaction_gauge": {
                "value": stats.satisfaction_rate,
                "title": "Satisfaction rate",
            },
            "distribution_pie": [
                { "name": "Satisfied", "y": stats.satisfied_count, "color": COLOR_GREEN },
                { "name": "Neutral", "y": stats.neutral_count, "color": COLOR_YELLOW },
                { "name": "Unsatisfied", "y": stats.unsatisfied_count, "color": COLOR_RED },
            ],
        },
    }))
}

async fn temporal_trends_payload(
    state: &AppState,
    period: TrendPeriod,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<JsonValue, AppError> {
    let rows = match period {
        TrendPeriod::Daily => state.dashboard.daily_trends(start, end).await?,
        TrendPeriod::Weekly => state.dashboard.bucketed_trends("week", start, end).await?,
        TrendPeriod::Monthly => state.dashboard.bucketed_trends("month", start, end).await?,
    };

    Ok(build_trend_chart(period, &rows))
}

async fn device_performance_payload(state: &AppState) -> Result<JsonValue, AppError> {
    let devices = state.dashboard.device_ranking().await?;

    let mut categories = Vec::new();
    let mut rate_series = Vec::new();
    let mut total_series = Vec::new();
    let mut table_data = Vec::new();

    for device in &devices {
        let rate = device.satisfaction_rate.unwrap_or(0.0);
        categories.push(device.code.clone());
        rate_series.push(json!(rate));
        total_series.push(json!(device.total_feedbacks));

        table_data.push(json!({
            "id": device.id,
            "name": device.code,
            "location": device.location,
            "total_feedbacks": device.total_feedbacks,
            "satisfaction_rate": device.satisfaction_rate,
            "avg_feedbacks_per_day": device.avg_feedbacks_per_day,
            "last_feedback_date": device.last_feedback_date,
            "status": device_status(device.total_feedbacks, rate),
        }));
    }

    Ok(json!({
        "chart_data": {
            "categories": categories,
            "series": [
                { "name": "Satisfaction rate (%)", "data": rate_series, "color": COLOR_GREEN },
                { "name": "Total feedbacks", "data": total_series, "color": COLOR_TEAL, "yAxis": 1 },
            ],
        },
        "table_data": table_data,
    }))
}

async fn hourly_patterns_payload(state: &AppState) -> Result<JsonValue, AppError> {
    let patterns = state.dashboard.hourly_patterns().await?;

    let mut categories = Vec::new();
    let mut count_series = Vec::new();
    let mut score_series = Vec::new();

    for pattern in &patterns {
        categories.push(format!("{:02}:00", pattern.hour));
        count_series.push(json!({
            "y": pattern.total_feedbacks,
            "color": hour_activity_color(pattern.total_feedbacks),
        }));
        score_series.push(json!(pattern.avg_score));
    }

    Ok(json!({
        "categories": categories,
        "series": [
            { "name": "Feedback count", "data": count_series, "type": "column" },
            { "name": "Average score", "data": score_series, "type": "spline", "yAxis": 1, "color": COLOR_CORAL },
        ],
    }))
}

async fn sentiment_distribution_payload(
    state: &AppState,
    days: i64,
) -> Result<JsonValue, AppError> {
    let since = Utc::now() - Duration::days(days);
    let rows = state.dashboard.sentiment_distribution(since).await?;

    let data: Vec<JsonValue> = rows
        .iter()
        .map(|row| {
            json!({
                "name": sentiment_label(row.feedback_type),
                "y": row.count,
                "percentage": row.percentage,
                "color": sentiment_color(row.feedback_type),
                "drilldown": row.feedback_type,
            })
        })
        .collect();

    Ok(json!({
        "series": [{
            "name": "Feedbacks",
            "colorByPoint": true,
            "data": data,
        }],
    }))
}

async fn alerts_payload(state: &AppState) -> Result<JsonValue, AppError> {
    let now = Utc::now();
    let mut alerts = Vec::new();

    let low_satisfaction = state
        .dashboard
        .low_satisfaction_devices(LOW_SATISFACTION_THRESHOLD, LOW_SATISFACTION_MIN_FEEDBACKS)
        .await?;

    for device in &low_satisfaction {
        let rate = device.satisfaction_rate.unwrap_or(0.0);
        alerts.push(json!({
            "type": "low_satisfaction",
            "severity": "high",
            "title": "Low satisfaction rate",
            "message": format!(
                "Device {} ({}) has a satisfaction rate of {rate}%",
                device.name, device.location
            ),
            "device_id": device.id,
            "value": rate,
        }));
    }

    let inactive = state
        .dashboard
        .inactive_devices(now - Duration::days(INACTIVITY_DAYS))
        .await?;

    for device in &inactive {
        alerts.push(inactive_alert(device, now));
    }

    Ok(JsonValue::Array(alerts))
}

// ---------------------------------------------------------------------------
// Shaping helpers
// ---------------------------------------------------------------------------

fn resolve_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    (start.unwrap_or(today - Duration::days(30)), end.unwrap_or(today))
}

fn build_trend_chart(period: TrendPeriod, rows: &[TrendRow]) -> JsonValue {
    let categories: Vec<String> = rows
        .iter()
        .map(|row| format_period_label(period, row.period))
        .collect();
    let rates: Vec<f64> = rows.iter().map(|row| row.satisfaction_rate).collect();
    let totals: Vec<i64> = rows.iter().map(|row| row.total_feedbacks).collect();

    json!({
        "categories": categories,
        "series": [
            {
                "name": "Satisfaction rate (%)",
                "type": "spline",
                "yAxis": 1,
                "data": rates,
                "color": COLOR_GREEN,
            },
            {
                "name": "Total feedbacks",
                "type": "column",
                "data": totals,
                "color": COLOR_BLUE,
            },
        ],
    })
}

/// Category label for one trend bucket: `dd/mm` daily, `<week>W<year>`
/// weekly, `mm/yyyy` monthly.
fn format_period_label(period: TrendPeriod, date: NaiveDate) -> String {
    match period {
        TrendPeriod::Daily => format!("{:02}/{:02}", date.day(), date.month()),
        TrendPeriod::Weekly => {
            let week = date.iso_week();
            format!("{:02}W{}", week.week(), week.year())
        }
        TrendPeriod::Monthly => format!("{:02}/{}", date.month(), date.year()),
    }
}

fn device_status(total_feedbacks: i64, satisfaction_rate: f64) -> &'static str {
    if total_feedbacks == 0 {
        return "inactive";
    }
    if satisfaction_rate < 50.0 {
        return "critical";
    }
    if satisfaction_rate < 70.0 {
        return "warning";
    }
    "good"
}

fn hour_activity_color(count: i64) -> &'static str {
    if count > 50 {
        return COLOR_GREEN;
    }
    if count > 20 {
        return COLOR_YELLOW;
    }
    if count > 5 {
        return COLOR_ORANGE;
    }
    COLOR_RED
}

fn sentiment_label(feedback_type: FeedbackType) -> &'static str {
    match feedback_type {
        FeedbackType::Satisfied => "Satisfied",
        FeedbackType::Neutral => "Neutral",
        FeedbackType::Unsatisfied => "Unsatisfied",
    }
}

fn sentiment_color(feedback_type: FeedbackType) -> &'static str {
    match feedback_type {
        FeedbackType::Satisfied => COLOR_GREEN,
        FeedbackType::Neutral => COLOR_YELLOW,
        FeedbackType::Unsatisfied => COLOR_RED,
    }
}

fn inactive_alert(device: &DeviceRankingRow, now: DateTime<Utc>) -> JsonValue {
    match device.last_feedback_date {
        Some(last) => {
            let days = (now - last).num_days();
            json!({
                "type": "inactive",
                "severity": "medium",
                "title": "Inactive device",
                "message": format!(
                    "Device {} ({}) has not received feedback for {days} days",
                    device.name, device.location
                ),
                "device_id": device.id,
                "value": days,
            })
        }
        None => json!({
            "type": "inactive",
            "severity": "medium",
            "title": "Inactive device",
            "message": format!(
                "Device {} ({}) has never received feedback",
                device.name, device.location
            ),
            "device_id": device.id,
            "value": "never",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_period_parse_defaults_to_daily() {
        assert_eq!(TrendPeriod::parse(None), TrendPeriod::Daily);
        assert_eq!(TrendPeriod::parse(Some("hourly")), TrendPeriod::Daily);
        assert_eq!(TrendPeriod::parse(Some("weekly")), TrendPeriod::Weekly);
        assert_eq!(TrendPeriod::parse(Some("monthly")), TrendPeriod::Monthly);
    }

    #[test]
    fn test_format_period_label() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(format_period_label(TrendPeriod::Daily, date), "09/03");
        assert_eq!(format_period_label(TrendPeriod::Monthly, date), "03/2025");
        // 2025-03-09 falls in ISO week 10 of 2025.
        assert_eq!(format_period_label(TrendPeriod::Weekly, date), "10W2025");
    }

    #[test]
    fn test_device_status_thresholds() {
        assert_eq!(device_status(0, 0.0), "inactive");
        assert_eq!(device_status(10, 49.9), "critical");
        assert_eq!(device_status(10, 50.0), "warning");
        assert_eq!(device_status(10, 69.9), "warning");
        assert_eq!(device_status(10, 70.0), "good");
    }

    #[test]
    fn test_hour_activity_color_thresholds() {
        assert_eq!(hour_activity_color(51), COLOR_GREEN);
        assert_eq!(hour_activity_color(50), COLOR_YELLOW);
        assert_eq!(hour_activity_color(21), COLOR_YELLOW);
        assert_eq!(hour_activity_color(6), COLOR_ORANGE);
        assert_eq!(hour_activity_color(5), COLOR_RED);
        assert_eq!(hour_activity_color(0), COLOR_RED);
    }

    #[test]
    fn test_build_trend_chart_shapes_series() {
        let rows = vec![
            TrendRow {
                period: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                total_feedbacks: 40,
                satisfied_count: 20,
                neutral_count: 10,
                unsatisfied_count: 10,
                satisfaction_rate: 50.0,
            },
            TrendRow {
                period: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                total_feedbacks: 10,
                satisfied_count: 9,
                neutral_count: 1,
                unsatisfied_count: 0,
                satisfaction_rate: 90.0,
            },
        ];

        let chart = build_trend_chart(TrendPeriod::Daily, &rows);

        assert_eq!(chart["categories"], json!(["01/01", "02/01"]));
        assert_eq!(chart["series"][0]["data"], json!([50.0, 90.0]));
        assert_eq!(chart["series"][1]["data"], json!([40, 10]));
    }

    #[test]
    fn test_inactive_alert_reports_days_or_never() {
        let now = Utc::now();
        let device = DeviceRankingRow {
            id: uuid::Uuid::new_v4(),
            name: "Device Test 01".to_string(),
            code: "TEST-ABC123".to_string(),
            location: "Main office".to_string(),
            total_feedbacks: 0,
            active_days: 0,
            avg_feedbacks_per_day: None,
            last_feedback_date: Some(now - Duration::days(12)),
            satisfaction_rate: None,
        };

        let alert = inactive_alert(&device, now);
        assert_eq!(alert["value"], 12);
        assert!(alert["message"].as_str().unwrap().contains("12 days"));

        let silent = DeviceRankingRow {
            last_feedback_date: None,
            ..device
        };
        let alert = inactive_alert(&silent, now);
        assert_eq!(alert["value"], "never");
    }
}
