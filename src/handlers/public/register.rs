// handlers/public/register.rs - POST /devices/register

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::database::models::Device;
use crate::dispatch::{FromPayload, Handler, Payload};
use crate::error::ApiError;

#[derive(Debug)]
pub struct RegisterRequest {
    pub device_id: String,
}

impl FromPayload for RegisterRequest {
    fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        Ok(Self {
            device_id: payload.require_str("device_id")?.to_string(),
        })
    }
}

/// POST /devices/register - enroll a new device with every capability off
///
/// Input: `{"device_id": "..."}`
/// Output: the stored device record. A device_id that is already
/// registered fails with 409 and leaves the existing record untouched.
#[derive(Debug, Default)]
pub struct RegisterDevice;

#[async_trait]
impl Handler for RegisterDevice {
    const NAME: &'static str = "register_device";
    type Request = RegisterRequest;
    type Output = Device;

    async fn handle(&self, ctx: &RequestContext, request: RegisterRequest) -> Result<Device, ApiError> {
        Ok(ctx.devices().register(&request.device_id).await?)
    }
}
