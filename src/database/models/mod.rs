pub mod device;
pub mod user;

pub use device::{Capability, Device};
pub use user::User;
