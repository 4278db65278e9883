//! Shared fixtures for unit tests: an in-memory `AppContext` with one seeded user.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{PasswordService, TokenIssuer};
use crate::context::AppContext;
use crate::database::{MemoryDeviceRepository, MemoryUserRepository};

pub const TEST_SECRET: &str = "test-secret-key";
pub const TEST_USERNAME: &str = "alice";
pub const TEST_PASSWORD: &str = "correct-password";
pub const TEST_ROLE: &str = "admin";

/// Fresh context backed by empty in-memory repositories plus `alice`
pub async fn test_context() -> AppContext {
    let users = MemoryUserRepository::new();
    let hash = PasswordService::new()
        .hash(TEST_PASSWORD)
        .expect("hash test password");
    users.insert(TEST_USERNAME, &hash, TEST_ROLE).await;

    let tokens = TokenIssuer::new(TEST_SECRET, Duration::hours(24)).expect("test token issuer");

    AppContext::new(Arc::new(MemoryDeviceRepository::new()), Arc::new(users), tokens)
}
