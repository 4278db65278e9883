use serde_json::json;

use crate::cli::{client::ApiClient, utils::output_success, OutputFormat};

pub async fn handle(server: &str, username: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::new(server)?;
    let login = client.login(username, password).await?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Logged in as {}", username),
            Some(json!({ "token": login.token, "expires_at": login.expires_at })),
        ),
        OutputFormat::Text => {
            // Bare token on stdout so it can be captured by a shell
            println!("{}", login.token);
            tracing::info!("token expires at {}", login.expires_at);
            Ok(())
        }
    }
}
