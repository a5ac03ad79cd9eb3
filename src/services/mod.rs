//! Business logic services layer

pub mod chirp_service;
pub mod session_service;

pub use chirp_service::ChirpService;
pub use session_service::{Session, SessionService};
