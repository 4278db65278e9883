use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One managed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    pub device_id: String,
    pub camera_enabled: bool,
    pub microphone_enabled: bool,
    pub bluetooth_enabled: bool,
    pub os_version: String,
    pub battery_level: i32,
    pub last_heartbeat: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Fresh device with every capability off and a heartbeat of `now`
    pub fn new(device_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id: device_id.into(),
            camera_enabled: false,
            microphone_enabled: false,
            bluetooth_enabled: false,
            os_version: String::new(),
            battery_level: 0,
            last_heartbeat: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Camera => self.camera_enabled,
            Capability::Microphone => self.microphone_enabled,
            Capability::Bluetooth => self.bluetooth_enabled,
        }
    }

    pub fn set_capability(&mut self, capability: Capability, enabled: bool) {
        match capability {
            Capability::Camera => self.camera_enabled = enabled,
            Capability::Microphone => self.microphone_enabled = enabled,
            Capability::Bluetooth => self.bluetooth_enabled = enabled,
        }
    }
}

/// Hardware feature an operator can toggle remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Camera,
    Microphone,
    Bluetooth,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Camera, Capability::Microphone, Capability::Bluetooth];

    /// Backing column in the `devices` table
    pub fn column(&self) -> &'static str {
        match self {
            Capability::Camera => "camera_enabled",
            Capability::Microphone => "microphone_enabled",
            Capability::Bluetooth => "bluetooth_enabled",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Camera => "camera",
            Capability::Microphone => "microphone",
            Capability::Bluetooth => "bluetooth",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_device_has_defaults() {
        let now = Utc::now();
        let device = Device::new("dev-1", now);
        assert_eq!(device.device_id, "dev-1");
        assert!(Capability::ALL.iter().all(|c| !device.capability(*c)));
        assert_eq!(device.os_version, "");
        assert_eq!(device.last_heartbeat, now);
    }

    #[test]
    fn set_capability_touches_one_flag() {
        let mut device = Device::new("dev-1", Utc::now());
        device.set_capability(Capability::Microphone, true);
        assert!(device.microphone_enabled);
        assert!(!device.camera_enabled);
        assert!(!device.bluetooth_enabled);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let device = Device::new("dev-1", Utc::now());
        let value = serde_json::to_value(&device).unwrap();
        for key in [
            "id",
            "device_id",
            "camera_enabled",
            "microphone_enabled",
            "bluetooth_enabled",
            "os_version",
            "battery_level",
            "last_heartbeat",
            "created_at",
            "updated_at",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
