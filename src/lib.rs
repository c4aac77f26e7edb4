pub mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod store;
pub mod validation;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result, ValidationFailure, Violation};
pub use model::{seed_records, LegacyCalendarRecord, NewUser, RegistrationRequest, UserRecord};
pub use server::GatewayServer;
pub use store::{MemoryStore, UserStore};
pub use validation::{ValidationProfile, Validator};
