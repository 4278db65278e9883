// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (JWT gate)
//
// Every handler implements `dispatch::Handler` and is mounted with
// `dispatch::serve::<H>`, so none of them touch the transport directly.

pub mod public; // No authentication: registration, login
pub mod protected; // JWT required: device operations

pub use protected::*;
pub use public::*;
