// handlers/protected/mod.rs - Protected handlers (JWT required)
//
// Security Level: valid bearer token
// Middleware: jwt_auth_middleware, which places `AuthUser` in the request
// extensions; `dispatch::serve` hands it on as `RequestContext::caller`.

pub mod attributes;
pub mod capabilities;
pub mod devices;

pub use attributes::{SetBatteryLevel, SetOsVersion};
pub use capabilities::{SetBluetoothState, SetCameraState, SetMicrophoneState};
pub use devices::{GetDeviceStatus, Heartbeat, ListDevices};
