//! Device persistence.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::generator::PlannedDevice;

/// Device fields exposed through the test-data API.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DeviceSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub location: String,
}

#[derive(Clone, Debug)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a batch of synthetic devices in one transaction.
    pub async fn insert_batch(&self, devices: &[PlannedDevice]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open device insert transaction")?;

        for device in devices {
            sqlx::query(
                r#"
                INSERT INTO devices (id, name, code, location)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(device.id)
            .bind(&device.name)
            .bind(&device.code)
            .bind(&device.location)
            .execute(&mut *tx)
            .await
            .context("Failed to insert device")?;
        }

        tx.commit()
            .await
            .context("Failed to commit device insert transaction")?;

        info!("Inserted {} synthetic devices", devices.len());
        Ok(())
    }

    /// Whether a live device with this id exists.
    pub async fn exists(&self, device_id: Uuid) -> Result<bool> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM devices WHERE id = $1 AND deleted_at IS NULL")
                .bind(device_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to check device existence")?;
        Ok(row.is_some())
    }

    pub async fn get_summary(&self, device_id: Uuid) -> Result<Option<DeviceSummaryRow>> {
        let row = sqlx::query_as::<_, DeviceSummaryRow>(
            r#"
            SELECT id, name, code, location
            FROM devices
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get device")?;

        Ok(row)
    }

    /// All live devices, ordered by name.
    pub async fn list_summaries(&self) -> Result<Vec<DeviceSummaryRow>> {
        let rows = sqlx::query_as::<_, DeviceSummaryRow>(
            r#"
            SELECT id, name, code, location
            FROM devices
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list devices")?;

        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count devices")?;
        Ok(count)
    }

    /// Remove every device. Cascades to feedbacks and statistics.
    pub async fn truncate(&self) -> Result<()> {
        sqlx::query("TRUNCATE TABLE devices CASCADE")
            .execute(&self.pool)
            .await
            .context("Failed to truncate devices")?;
        Ok(())
    }
}
