use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{PasswordService, TokenIssuer};
use crate::database::{DeviceRepository, UserRepository};
use crate::middleware::AuthUser;

/// Process-wide dependencies, built once at startup and cloned into every request
#[derive(Clone)]
pub struct AppContext {
    devices: Arc<dyn DeviceRepository>,
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenIssuer>,
    passwords: PasswordService,
}

impl AppContext {
    pub fn new(
        devices: Arc<dyn DeviceRepository>,
        users: Arc<dyn UserRepository>,
        tokens: TokenIssuer,
    ) -> Self {
        let passwords = PasswordService::new();
        passwords.prepare();
        Self {
            devices,
            users,
            tokens: Arc::new(tokens),
            passwords,
        }
    }

    pub fn devices(&self) -> &dyn DeviceRepository {
        self.devices.as_ref()
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }
}

/// Request-scoped view handed to every domain handler
#[derive(Clone)]
pub struct RequestContext {
    pub app: AppContext,
    pub request_id: Uuid,
    /// Present on protected routes once the gate has accepted the token
    pub caller: Option<AuthUser>,
}

impl RequestContext {
    pub fn new(app: AppContext, caller: Option<AuthUser>) -> Self {
        Self {
            app,
            request_id: Uuid::new_v4(),
            caller,
        }
    }

    pub fn devices(&self) -> &dyn DeviceRepository {
        self.app.devices()
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.app.users()
    }
}
