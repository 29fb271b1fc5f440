//! Read-side queries over the reporting views.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One row from `v_global_statistics`.
#[derive(Debug, Clone, FromRow)]
pub struct GlobalStatsRow {
    pub total_feedbacks: i64,
    pub satisfied_count: i64,
    pub neutral_count: i64,
    pub unsatisfied_count: i64,
    pub satisfaction_rate: f64,
}

/// One bucket of the temporal trend series (a day, an ISO week or a month).
#[derive(Debug, Clone, FromRow)]
pub struct TrendRow {
    pub period: NaiveDate,
    pub total_feedbacks: i64,
    pub satisfied_count: i64,
    pub neutral_count: i64,
    pub unsatisfied_count: i64,
    pub satisfaction_rate: f64,
}

/// One row from `v_device_activity_ranking`. Aggregates are nullable for
/// devices that never received feedback.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceRankingRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub location: String,
    pub total_feedbacks: i64,
    pub active_days: i64,
    pub avg_feedbacks_per_day: Option<f64>,
    pub last_feedback_date: Option<DateTime<Utc>>,
    pub satisfaction_rate: Option<f64>,
}

/// One row from `v_hourly_patterns`.
#[derive(Debug, Clone, FromRow)]
pub struct HourlyPatternRow {
    pub hour: i32,
    pub total_feedbacks: i64,
    pub avg_score: f64,
    pub satisfaction_rate: f64,
}

/// Per-type share of feedback over a trailing window.
#[derive(Debug, Clone, FromRow)]
pub struct SentimentRow {
    #[sqlx(rename = "type")]
    pub feedback_type: crate::models::FeedbackType,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Clone, Debug)]
pub struct DashboardQueries {
    pool: PgPool,
}

impl DashboardQueries {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn global_statistics(&self) -> Result<GlobalStatsRow> {
        let row = sqlx::query_as::<_, GlobalStatsRow>(
            r#"
            SELECT total_feedbacks, satisfied_count, neutral_count,
                   unsatisfied_count, satisfaction_rate
            FROM v_global_statistics
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to query global statistics")?;

        Ok(row)
    }

    /// Daily buckets straight out of `v_daily_statistics`.
    pub async fn daily_trends(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TrendRow>> {
        let rows = sqlx::query_as::<_, TrendRow>(
            r#"
            SELECT date AS period, total_feedbacks, satisfied_count,
                   neutral_count, unsatisfied_count, satisfaction_rate
            FROM v_daily_statistics
            WHERE date BETWEEN $1 AND $2
            ORDER BY date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query daily trends")?;

        Ok(rows)
    }

    /// Weekly or monthly buckets, rolled up from the daily view. `bucket`
    /// must be a `date_trunc` field name ('week' or 'month').
    pub async fn bucketed_trends(
        &self,
        bucket: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrendRow>> {
        let rows = sqlx::query_as::<_, TrendRow>(
            r#"
            SELECT
                DATE_TRUNC($1, date::timestamp)::date AS period,
                SUM(total_feedbacks)::BIGINT AS total_feedbacks,
                SUM(satisfied_count)::BIGINT AS satisfied_count,
                SUM(neutral_count)::BIGINT AS neutral_count,
                SUM(unsatisfied_count)::BIGINT AS unsatisfied_count,
                ROUND(AVG(satisfaction_rate)::NUMERIC, 2)::FLOAT8 AS satisfaction_rate
            FROM v_daily_statistics
            WHERE date BETWEEN $2 AND $3
            GROUP BY DATE_TRUNC($1, date::timestamp)
            ORDER BY period
            "#,
        )
        .bind(bucket)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query bucketed trends")?;

        Ok(rows)
    }

    /// Full ranking, best satisfaction first.
    pub async fn device_ranking(&self) -> Result<Vec<DeviceRankingRow>> {
        let rows = sqlx::query_as::<_, DeviceRankingRow>(
            r#"
            SELECT id, name, code, location, total_feedbacks, active_days,
                   avg_feedbacks_per_day, last_feedback_date, satisfaction_rate
            FROM v_device_activity_ranking
            ORDER BY satisfaction_rate DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query device ranking")?;

        Ok(rows)
    }

    pub async fn hourly_patterns(&self) -> Result<Vec<HourlyPatternRow>> {
        let rows = sqlx::query_as::<_, HourlyPatternRow>(
            r#"
            SELECT hour, total_feedbacks, avg_score, satisfaction_rate
            FROM v_hourly_patterns
            ORDER BY hour
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to query hourly patterns")?;

        Ok(rows)
    }

    /// Per-type counts and shares since the given instant.
    pub async fn sentiment_distribution(&self, since: DateTime<Utc>) -> Result<Vec<SentimentRow>> {
        let rows = sqlx::query_as::<_, SentimentRow>(
            r#"
            SELECT
                type,
                COUNT(*) AS count,
                ROUND(
                    (COUNT(*)::DECIMAL /
                     (SELECT COUNT(*) FROM feedbacks
                      WHERE created_at >= $1 AND deleted_at IS NULL)::DECIMAL) * 100,
                    2
                )::FLOAT8 AS percentage
            FROM feedbacks
            WHERE created_at >= $1 AND deleted_at IS NULL
            GROUP BY type
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query sentiment distribution")?;

        Ok(rows)
    }

    /// Devices under the satisfaction threshold with enough volume to matter.
    pub async fn low_satisfaction_devices(
        &self,
        rate_below: f64,
        min_feedbacks: i64,
    ) -> Result<Vec<DeviceRankingRow>> {
        let rows = sqlx::query_as::<_, DeviceRankingRow>(
            r#"
            SELECT id, name, code, location, total_feedbacks, active_days,
                   avg_feedbacks_per_day, last_feedback_date, satisfaction_rate
            FROM v_device_activity_ranking
            WHERE satisfaction_rate < $1 AND total_feedbacks > $2
            "#,
        )
        .bind(rate_below)
        .bind(min_feedbacks)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query low-satisfaction devices")?;

        Ok(rows)
    }

    /// Devices silent since the cutoff, or that never reported at all.
    pub async fn inactive_devices(&self, cutoff: DateTime<Utc>) -> Result<Vec<DeviceRankingRow>> {
        let rows = sqlx::query_as::<_, DeviceRankingRow>(
            r#"
            SELECT id, name, code, location, total_feedbacks, active_days,
                   avg_feedbacks_per_day, last_feedback_date, satisfaction_rate
            FROM v_device_activity_ranking
            WHERE last_feedback_date < $1 OR last_feedback_date IS NULL
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query inactive devices")?;

        Ok(rows)
    }
}
