#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

pub mod clock;
pub mod secret_string;

pub use clock::{epoch_millis, now_epoch_millis};
pub use secret_string::SecretString;
