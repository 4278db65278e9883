pub mod agent;
pub mod login;
pub mod password;
