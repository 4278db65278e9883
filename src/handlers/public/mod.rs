// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: None. Inputs are validated by each request type.

pub mod health;
pub mod login;
pub mod register;

pub use health::health;
pub use login::Login;
pub use register::RegisterDevice;
