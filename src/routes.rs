// routes.rs - HTTP surface
//
// Public:    POST /devices/register, POST /login, GET /health
// Protected: everything else under /devices, behind the JWT gate

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::dispatch::serve;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Assemble the full router with its global layers
pub fn app(ctx: AppContext, config: &AppConfig) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(device_routes(ctx.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(ctx)
}

fn public_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(public::health))
        .route("/login", post(serve::<public::Login>))
        .route("/devices/register", post(serve::<public::RegisterDevice>))
}

fn device_routes(ctx: AppContext) -> Router<AppContext> {
    Router::new()
        .route("/devices", get(serve::<protected::ListDevices>))
        .route("/devices/:id/status", get(serve::<protected::GetDeviceStatus>))
        .route("/devices/:id/heartbeat", post(serve::<protected::Heartbeat>))
        .route("/devices/:id/camera", post(serve::<protected::SetCameraState>))
        .route("/devices/:id/microphone", post(serve::<protected::SetMicrophoneState>))
        .route("/devices/:id/bluetooth", post(serve::<protected::SetBluetoothState>))
        .route("/devices/:id/os", post(serve::<protected::SetOsVersion>))
        .route("/devices/:id/battery", post(serve::<protected::SetBatteryLevel>))
        .route_layer(from_fn_with_state(ctx, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
