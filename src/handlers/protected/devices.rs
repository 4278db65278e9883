// handlers/protected/devices.rs - heartbeat, status and listing

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::database::models::Device;
use crate::dispatch::{FromPayload, Handler, Payload, PATH_ID_KEY};
use crate::error::ApiError;

/// Request addressed at one device through the `{id}` path segment
#[derive(Debug)]
pub struct DeviceRef {
    pub device_id: String,
}

impl FromPayload for DeviceRef {
    fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        Ok(Self {
            device_id: payload.require_str(PATH_ID_KEY)?.to_string(),
        })
    }
}

/// POST /devices/{id}/heartbeat - mark the device as alive now
#[derive(Debug, Default)]
pub struct Heartbeat;

#[async_trait]
impl Handler for Heartbeat {
    const NAME: &'static str = "heartbeat";
    type Request = DeviceRef;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: DeviceRef) -> Result<Device, ApiError> {
        let device = ctx.devices().update_heartbeat(&request.device_id).await?;
        tracing::debug!(device_id = %device.device_id, last_heartbeat = %device.last_heartbeat, "heartbeat");
        Ok(device)
    }
}

/// GET /devices/{id}/status
#[derive(Debug, Default)]
pub struct GetDeviceStatus;

#[async_trait]
impl Handler for GetDeviceStatus {
    const NAME: &'static str = "get_device_status";
    type Request = DeviceRef;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: DeviceRef) -> Result<Device, ApiError> {
        Ok(ctx.devices().get(&request.device_id).await?)
    }
}

/// GET /devices - every registered device, in no particular order
#[derive(Debug, Default)]
pub struct ListDevices;

#[async_trait]
impl Handler for ListDevices {
    const NAME: &'static str = "list_devices";
    type Request = ();
    type Output = Vec<Device>;

    async fn handle(&self, ctx: &RequestContext, _request: ()) -> Result<Vec<Device>, ApiError> {
        Ok(ctx.devices().list().await?)
    }
}
