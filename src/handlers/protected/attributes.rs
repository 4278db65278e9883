// handlers/protected/attributes.rs - reported OS version and battery level

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::database::models::Device;
use crate::dispatch::{FromPayload, Handler, Payload, PATH_ID_KEY};
use crate::error::ApiError;

#[derive(Debug)]
pub struct OsVersionRequest {
    pub device_id: String,
    pub os_version: String,
}

impl FromPayload for OsVersionRequest {
    fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        Ok(Self {
            device_id: payload.require_str(PATH_ID_KEY)?.to_string(),
            os_version: payload.require_str("os_version")?.to_string(),
        })
    }
}

/// POST /devices/{id}/os - `{"os_version": "14.2"}`
#[derive(Debug, Default)]
pub struct SetOsVersion;

#[async_trait]
impl Handler for SetOsVersion {
    const NAME: &'static str = "set_os_version";
    type Request = OsVersionRequest;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: OsVersionRequest) -> Result<Device, ApiError> {
        Ok(ctx
            .devices()
            .update_os_version(&request.device_id, &request.os_version)
            .await?)
    }
}

#[derive(Debug)]
pub struct BatteryLevelRequest {
    pub device_id: String,
    pub battery_level: i32,
}

impl FromPayload for BatteryLevelRequest {
    fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        Ok(Self {
            device_id: payload.require_str(PATH_ID_KEY)?.to_string(),
            battery_level: payload.require_whole_number("battery_level")?,
        })
    }
}

/// POST /devices/{id}/battery - `{"battery_level": 57}`
///
/// Any whole number is stored as reported; no 0..=100 range is enforced.
#[derive(Debug, Default)]
pub struct SetBatteryLevel;

#[async_trait]
impl Handler for SetBatteryLevel {
    const NAME: &'static str = "set_battery_level";
    type Request = BatteryLevelRequest;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: BatteryLevelRequest) -> Result<Device, ApiError> {
        Ok(ctx
            .devices()
            .update_battery_level(&request.device_id, request.battery_level)
            .await?)
    }
}
