pub mod device_repository;
pub mod manager;
pub mod memory;
pub mod models;
pub mod user_repository;

pub use device_repository::{DeviceRepository, PgDeviceRepository};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryDeviceRepository, MemoryUserRepository};
pub use user_repository::{PgUserRepository, UserRepository};
