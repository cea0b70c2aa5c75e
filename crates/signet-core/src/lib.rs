//! signet-core: shared configuration, errors, time source and health checks
//! for the signet encryption and signed-URL crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod health;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{SignetError, SignetResult};
pub use health::{check_app_key, HealthReport, MIN_APP_KEY_LEN};
