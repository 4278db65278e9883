use serde_json::json;

use crate::auth::PasswordService;
use crate::cli::{utils::output_success, OutputFormat};

/// Print an Argon2 PHC string for provisioning a user row by hand
pub fn handle(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    let hash = PasswordService::new().hash(password)?;

    match output_format {
        OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
