//! Feedback persistence.

use anyhow::{Context, Result};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::generator::{PlannedDevice, PlannedFeedback};
use crate::models::{Feedback, FeedbackType};

/// Per-type count, used for distribution summaries.
#[derive(Debug, Clone, FromRow)]
pub struct TypeCountRow {
    #[sqlx(rename = "type")]
    pub feedback_type: FeedbackType,
    pub count: i64,
}

#[derive(Clone, Debug)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one feedback stamped with the database clock.
    pub async fn insert(
        &self,
        device_id: Uuid,
        feedback_type: FeedbackType,
        session_id: &str,
        ip_address: &str,
    ) -> Result<Feedback> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedbacks (id, device_id, type, session_id, ip_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, device_id, type, session_id, ip_address, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(device_id)
        .bind(feedback_type)
        .bind(session_id)
        .bind(ip_address)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert feedback")?;

        info!("Inserted feedback {} for device {}", row.id, device_id);
        Ok(row)
    }

    /// Insert a planned synthetic batch in one transaction, mapping each
    /// record's device index onto the given device slice. Returns the number
    /// of rows written.
    pub async fn insert_planned_batch(
        &self,
        devices: &[PlannedDevice],
        batch: &[PlannedFeedback],
    ) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open feedback insert transaction")?;

        for feedback in batch {
            let device = &devices[feedback.device_index];
            sqlx::query(
                r#"
                INSERT INTO feedbacks
                    (id, device_id, type, session_id, ip_address, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                "#,
            )
            .bind(feedback.id)
            .bind(device.id)
            .bind(feedback.feedback_type)
            .bind(&feedback.session_id)
            .bind(&feedback.ip_address)
            .bind(feedback.created_at)
            .execute(&mut *tx)
            .await
            .context("Failed to insert synthetic feedback")?;
        }

        tx.commit()
            .await
            .context("Failed to commit feedback insert transaction")?;

        info!("Inserted {} synthetic feedbacks", batch.len());
        Ok(batch.len() as u64)
    }

    /// Per-type counts over the given devices.
    pub async fn distribution_for_devices(
        &self,
        device_ids: &[Uuid],
    ) -> Result<Vec<TypeCountRow>> {
        let rows = sqlx::query_as::<_, TypeCountRow>(
            r#"
            SELECT type, COUNT(*) AS count
            FROM feedbacks
            WHERE device_id = ANY($1) AND deleted_at IS NULL
            GROUP BY type
            "#,
        )
        .bind(device_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute feedback distribution")?;

        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedbacks")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count feedbacks")?;
        Ok(count)
    }

    pub async fn truncate(&self) -> Result<()> {
        sqlx::query("TRUNCATE TABLE feedbacks")
            .execute(&self.pool)
            .await
            .context("Failed to truncate feedbacks")?;
        Ok(())
    }
}
