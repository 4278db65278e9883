use async_trait::async_trait;
use sqlx::{postgres::PgArguments, query::QueryAs, PgPool, Postgres};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Capability, Device};

/// Owns the lifecycle of `Device` rows.
///
/// Every mutator is a single atomic write of one field, never a
/// load-mutate-save, so concurrent setters on the same device cannot
/// overwrite each other.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Create a device with default flags. A second registration of the same
    /// `device_id` fails with `DatabaseError::Conflict` and writes nothing.
    async fn register(&self, device_id: &str) -> Result<Device, DatabaseError>;

    async fn get(&self, device_id: &str) -> Result<Device, DatabaseError>;

    /// Refresh `last_heartbeat`; the stored value strictly increases
    async fn update_heartbeat(&self, device_id: &str) -> Result<Device, DatabaseError>;

    async fn set_capability(
        &self,
        device_id: &str,
        capability: Capability,
        enabled: bool,
    ) -> Result<Device, DatabaseError>;

    async fn update_os_version(&self, device_id: &str, version: &str) -> Result<Device, DatabaseError>;

    async fn update_battery_level(&self, device_id: &str, level: i32) -> Result<Device, DatabaseError>;

    /// Every device; order carries no meaning
    async fn list(&self) -> Result<Vec<Device>, DatabaseError>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> Result<(), DatabaseError>;
}

pub(crate) fn device_not_found(device_id: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("device '{}' not found", device_id))
}

pub(crate) fn device_conflict(device_id: &str) -> DatabaseError {
    DatabaseError::Conflict(format!("device '{}' already registered", device_id))
}

const DEVICE_COLUMNS: &str = "id, device_id, camera_enabled, microphone_enabled, bluetooth_enabled, \
     os_version, battery_level, last_heartbeat, created_at, updated_at";

pub struct PgDeviceRepository {
    pool: PgPool,
}

impl PgDeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run a single-row `UPDATE ... RETURNING`; no row means no such device
    async fn update_one(
        &self,
        query: QueryAs<'_, Postgres, Device, PgArguments>,
        device_id: &str,
    ) -> Result<Device, DatabaseError> {
        query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| device_not_found(device_id))
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn register(&self, device_id: &str) -> Result<Device, DatabaseError> {
        let sql = format!(
            "INSERT INTO devices (id, device_id, last_heartbeat, created_at, updated_at)
             VALUES ($1, $2, clock_timestamp(), now(), now())
             ON CONFLICT (device_id) DO NOTHING
             RETURNING {}",
            DEVICE_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Device>(&sql)
            .bind(Uuid::new_v4())
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await?;

        match inserted {
            Some(device) => {
                info!(device_id, "device registered");
                Ok(device)
            }
            None => {
                warn!(device_id, "device already registered");
                Err(device_conflict(device_id))
            }
        }
    }

    async fn get(&self, device_id: &str) -> Result<Device, DatabaseError> {
        let sql = format!("SELECT {} FROM devices WHERE device_id = $1", DEVICE_COLUMNS);
        sqlx::query_as::<_, Device>(&sql)
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| device_not_found(device_id))
    }

    async fn update_heartbeat(&self, device_id: &str) -> Result<Device, DatabaseError> {
        let sql = format!(
            "UPDATE devices
             SET last_heartbeat = GREATEST(clock_timestamp(), last_heartbeat + interval '1 microsecond'),
                 updated_at = now()
             WHERE device_id = $1
             RETURNING {}",
            DEVICE_COLUMNS
        );
        let query = sqlx::query_as::<_, Device>(&sql).bind(device_id);
        self.update_one(query, device_id).await
    }

    async fn set_capability(
        &self,
        device_id: &str,
        capability: Capability,
        enabled: bool,
    ) -> Result<Device, DatabaseError> {
        // Column name comes from a closed enum, never from input
        let sql = format!(
            "UPDATE devices SET {} = $2, updated_at = now() WHERE device_id = $1 RETURNING {}",
            capability.column(),
            DEVICE_COLUMNS
        );
        let query = sqlx::query_as::<_, Device>(&sql).bind(device_id).bind(enabled);
        self.update_one(query, device_id).await
    }

    async fn update_os_version(&self, device_id: &str, version: &str) -> Result<Device, DatabaseError> {
        let sql = format!(
            "UPDATE devices SET os_version = $2, updated_at = now() WHERE device_id = $1 RETURNING {}",
            DEVICE_COLUMNS
        );
        let query = sqlx::query_as::<_, Device>(&sql).bind(device_id).bind(version);
        self.update_one(query, device_id).await
    }

    async fn update_battery_level(&self, device_id: &str, level: i32) -> Result<Device, DatabaseError> {
        let sql = format!(
            "UPDATE devices SET battery_level = $2, updated_at = now() WHERE device_id = $1 RETURNING {}",
            DEVICE_COLUMNS
        );
        let query = sqlx::query_as::<_, Device>(&sql).bind(device_id).bind(level);
        self.update_one(query, device_id).await
    }

    async fn list(&self) -> Result<Vec<Device>, DatabaseError> {
        let sql = format!("SELECT {} FROM devices ORDER BY created_at", DEVICE_COLUMNS);
        let devices = sqlx::query_as::<_, Device>(&sql).fetch_all(&self.pool).await?;
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        crate::database::DatabaseManager::health_check(&self.pool).await
    }
}
