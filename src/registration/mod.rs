//! Registration service client module for gRPC communication

mod client;
mod traits;

pub use client::RegistrationClient;
pub use traits::RegistrationService;

#[cfg(test)]
pub use traits::MockRegistrationService;
