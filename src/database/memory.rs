//! In-process repositories with the same contracts as the Postgres ones.
//!
//! A single `RwLock` guards the map; each mutation changes one field while
//! holding the write lock, which gives the same per-field atomicity the
//! Postgres `UPDATE ... SET field = $2` statements have.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::device_repository::{device_conflict, device_not_found, DeviceRepository};
use crate::database::manager::DatabaseError;
use crate::database::models::{Capability, Device, User};
use crate::database::user_repository::{user_not_found, UserRepository};

#[derive(Default)]
pub struct MemoryDeviceRepository {
    devices: RwLock<HashMap<String, Device>>,
}

impl MemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn mutate<F>(&self, device_id: &str, apply: F) -> Result<Device, DatabaseError>
    where
        F: FnOnce(&mut Device, DateTime<Utc>) + Send,
    {
        let mut devices = self.devices.write().await;
        let device = devices
            .get_mut(device_id)
            .ok_or_else(|| device_not_found(device_id))?;
        let now = Utc::now();
        apply(device, now);
        device.updated_at = now;
        Ok(device.clone())
    }
}

#[async_trait]
impl DeviceRepository for MemoryDeviceRepository {
    async fn register(&self, device_id: &str) -> Result<Device, DatabaseError> {
        let mut devices = self.devices.write().await;
        if devices.contains_key(device_id) {
            tracing::warn!(device_id, "device already registered");
            return Err(device_conflict(device_id));
        }
        let device = Device::new(device_id, Utc::now());
        devices.insert(device_id.to_string(), device.clone());
        tracing::info!(device_id, "device registered");
        Ok(device)
    }

    async fn get(&self, device_id: &str) -> Result<Device, DatabaseError> {
        self.devices
            .read()
            .await
            .get(device_id)
            .cloned()
            .ok_or_else(|| device_not_found(device_id))
    }

    async fn update_heartbeat(&self, device_id: &str) -> Result<Device, DatabaseError> {
        self.mutate(device_id, |device, now| {
            let floor = device.last_heartbeat + Duration::microseconds(1);
            device.last_heartbeat = now.max(floor);
        })
        .await
    }

    async fn set_capability(
        &self,
        device_id: &str,
        capability: Capability,
        enabled: bool,
    ) -> Result<Device, DatabaseError> {
        self.mutate(device_id, |device, _| device.set_capability(capability, enabled))
            .await
    }

    async fn update_os_version(&self, device_id: &str, version: &str) -> Result<Device, DatabaseError> {
        let version = version.to_string();
        self.mutate(device_id, move |device, _| device.os_version = version)
            .await
    }

    async fn update_battery_level(&self, device_id: &str, level: i32) -> Result<Device, DatabaseError> {
        self.mutate(device_id, |device, _| device.battery_level = level)
            .await
    }

    async fn list(&self) -> Result<Vec<Device>, DatabaseError> {
        let mut devices: Vec<Device> = self.devices.read().await.values().cloned().collect();
        devices.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(devices)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a user from an already-hashed password
    pub async fn insert(&self, username: &str, password_hash: &str, role: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.users
            .write()
            .await
            .insert(username.to_string(), user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| user_not_found(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn register_then_get_returns_defaults() {
        let repo = MemoryDeviceRepository::new();
        let before = Utc::now();
        let created = repo.register("dev-1").await.unwrap();
        let fetched = repo.get("dev-1").await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.device_id, "dev-1");
        assert!(!fetched.camera_enabled && !fetched.microphone_enabled && !fetched.bluetooth_enabled);
        assert!(fetched.last_heartbeat >= before);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_without_new_row() {
        let repo = MemoryDeviceRepository::new();
        let first = repo.register("dev-1").await.unwrap();

        let second = repo.register("dev-1").await;
        assert!(matches!(second, Err(DatabaseError::Conflict(_))));

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, first.id);
    }

    #[tokio::test]
    async fn unknown_device_is_not_found() {
        let repo = MemoryDeviceRepository::new();
        assert!(matches!(repo.get("ghost").await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(
            repo.update_heartbeat("ghost").await,
            Err(DatabaseError::NotFound(_))
        ));
        assert!(matches!(
            repo.set_capability("ghost", Capability::Camera, true).await,
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn heartbeat_strictly_increases() {
        let repo = MemoryDeviceRepository::new();
        let mut last = repo.register("dev-1").await.unwrap().last_heartbeat;
        for _ in 0..50 {
            let next = repo.update_heartbeat("dev-1").await.unwrap().last_heartbeat;
            assert!(next > last);
            last = next;
        }
    }

    #[tokio::test]
    async fn capability_flags_are_independent() {
        let repo = MemoryDeviceRepository::new();
        repo.register("dev-1").await.unwrap();

        for capability in Capability::ALL {
            let on = repo.set_capability("dev-1", capability, true).await.unwrap();
            assert!(on.capability(capability));
            let off = repo.set_capability("dev-1", capability, false).await.unwrap();
            assert!(!off.capability(capability));
        }

        repo.set_capability("dev-1", Capability::Bluetooth, true).await.unwrap();
        let device = repo.get("dev-1").await.unwrap();
        assert!(device.bluetooth_enabled);
        assert!(!device.camera_enabled);
        assert!(!device.microphone_enabled);
    }

    #[tokio::test]
    async fn attributes_round_trip() {
        let repo = MemoryDeviceRepository::new();
        repo.register("dev-1").await.unwrap();
        repo.update_os_version("dev-1", "Android 14").await.unwrap();
        let device = repo.update_battery_level("dev-1", 57).await.unwrap();
        assert_eq!(device.os_version, "Android 14");
        assert_eq!(device.battery_level, 57);
    }

    #[tokio::test]
    async fn concurrent_setters_do_not_lose_updates() {
        let repo = Arc::new(MemoryDeviceRepository::new());
        repo.register("dev-1").await.unwrap();

        let mut tasks = Vec::new();
        for round in 0..20 {
            for capability in Capability::ALL {
                let repo = Arc::clone(&repo);
                tasks.push(tokio::spawn(async move {
                    repo.set_capability("dev-1", capability, true).await.unwrap();
                }));
            }
            let repo = Arc::clone(&repo);
            tasks.push(tokio::spawn(async move {
                repo.update_battery_level("dev-1", round).await.unwrap();
                repo.update_heartbeat("dev-1").await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let device = repo.get("dev-1").await.unwrap();
        assert!(device.camera_enabled);
        assert!(device.microphone_enabled);
        assert!(device.bluetooth_enabled);
    }

    #[tokio::test]
    async fn users_are_looked_up_by_username() {
        let repo = MemoryUserRepository::new();
        repo.insert("alice", "$argon2id$stub", "admin").await;
        let alice = repo.get_by_username("alice").await.unwrap();
        assert_eq!(alice.role, "admin");
        assert!(matches!(
            repo.get_by_username("bob").await,
            Err(DatabaseError::NotFound(_))
        ));
    }
}
