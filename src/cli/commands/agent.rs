use std::time::Duration;

use clap::{ArgGroup, Args};
use serde_json::json;

use crate::cli::client::{ApiClient, ClientError};
use crate::cli::{utils::output_success, OutputFormat, DEFAULT_SERVER};
use crate::database::models::{Capability, Device};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("credentials").required(true).args(["username", "token"])))]
pub struct AgentArgs {
    #[arg(long, help = "Identifier this device registers under")]
    pub device_id: String,

    #[arg(long, env = "MDM_SERVER", default_value = DEFAULT_SERVER, help = "Server base URL")]
    pub server: String,

    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..), help = "Seconds between heartbeats")]
    pub interval: u64,

    #[arg(long, requires = "password", help = "Operator username used to obtain a token")]
    pub username: Option<String>,

    #[arg(long, env = "MDM_PASSWORD", hide_env_values = true, requires = "username", help = "Operator password")]
    pub password: Option<String>,

    #[arg(long, env = "MDM_TOKEN", hide_env_values = true, help = "Pre-issued bearer token")]
    pub token: Option<String>,
}

impl AgentArgs {
    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

pub async fn handle(args: AgentArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::new(&args.server)?;
    match (&args.token, args.credentials()) {
        (Some(token), _) => client.set_token(token.clone()),
        (None, Some((username, password))) => {
            client.login(username, password).await?;
            tracing::info!(username, "logged in");
        }
        (None, None) => anyhow::bail!("either --token or --username/--password is required"),
    }

    let mut last = enroll(&client, &args.device_id).await?;
    output_success(
        &output_format,
        &format!("Agent started for device '{}'", args.device_id),
        Some(json!({ "device": last })),
    )?;

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down agent");
                return Ok(());
            }
        }

        match beat(&mut client, &args).await {
            Ok(device) => {
                log_changes(&last, &device);
                last = device;
            }
            // The server being briefly away must not stop the agent
            Err(e) => tracing::warn!(device_id = %args.device_id, "heartbeat failed: {}", e),
        }
    }
}

/// Register, or pick up the existing record when the device is already known
async fn enroll(client: &ApiClient, device_id: &str) -> Result<Device, ClientError> {
    match client.register(device_id).await {
        Ok(device) => {
            tracing::info!(device_id, "device registered");
            Ok(device)
        }
        Err(ClientError::Conflict(_)) => {
            tracing::info!(device_id, "device already registered, resuming");
            client.status(device_id).await
        }
        Err(e) => Err(e),
    }
}

/// One heartbeat; on 401 log in again once and retry
async fn beat(client: &mut ApiClient, args: &AgentArgs) -> Result<Device, ClientError> {
    match client.heartbeat(&args.device_id).await {
        Err(ClientError::Unauthorized(reason)) => match args.credentials() {
            Some((username, password)) => {
                tracing::info!("token rejected ({}), logging in again", reason);
                client.login(username, password).await?;
                client.heartbeat(&args.device_id).await
            }
            None => Err(ClientError::Unauthorized(reason)),
        },
        other => other,
    }
}

fn log_changes(previous: &Device, current: &Device) {
    for capability in Capability::ALL {
        let (was, now) = (previous.capability(capability), current.capability(capability));
        if was != now {
            tracing::info!(
                device_id = %current.device_id,
                capability = %capability,
                enabled = now,
                "capability changed by operator"
            );
        }
    }
}
