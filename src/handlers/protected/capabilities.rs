// handlers/protected/capabilities.rs - camera / microphone / bluetooth toggles

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::database::models::{Capability, Device};
use crate::dispatch::{FromPayload, Handler, Payload, PATH_ID_KEY};
use crate::error::ApiError;

/// `{"enabled": bool}` aimed at the device in the path
#[derive(Debug)]
pub struct ToggleRequest {
    pub device_id: String,
    pub enabled: bool,
}

impl FromPayload for ToggleRequest {
    fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        Ok(Self {
            device_id: payload.require_str(PATH_ID_KEY)?.to_string(),
            enabled: payload.require_flag("enabled")?,
        })
    }
}

/// Writes exactly one flag; the other two are never touched
async fn toggle(ctx: &RequestContext, capability: Capability, request: ToggleRequest) -> Result<Device, ApiError> {
    let device = ctx
        .devices()
        .set_capability(&request.device_id, capability, request.enabled)
        .await?;

    tracing::info!(
        device_id = %device.device_id,
        capability = %capability,
        enabled = request.enabled,
        "capability updated"
    );
    Ok(device)
}

/// POST /devices/{id}/camera
#[derive(Debug, Default)]
pub struct SetCameraState;

#[async_trait]
impl Handler for SetCameraState {
    const NAME: &'static str = "set_camera_state";
    type Request = ToggleRequest;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: ToggleRequest) -> Result<Device, ApiError> {
        toggle(ctx, Capability::Camera, request).await
    }
}

/// POST /devices/{id}/microphone
#[derive(Debug, Default)]
pub struct SetMicrophoneState;

#[async_trait]
impl Handler for SetMicrophoneState {
    const NAME: &'static str = "set_microphone_state";
    type Request = ToggleRequest;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: ToggleRequest) -> Result<Device, ApiError> {
        toggle(ctx, Capability::Microphone, request).await
    }
}

/// POST /devices/{id}/bluetooth
#[derive(Debug, Default)]
pub struct SetBluetoothState;

#[async_trait]
impl Handler for SetBluetoothState {
    const NAME: &'static str = "set_bluetooth_state";
    type Request = ToggleRequest;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: ToggleRequest) -> Result<Device, ApiError> {
        toggle(ctx, Capability::Bluetooth, request).await
    }
}
