mod helpers;
mod secret;

pub use helpers::{non_empty, parse_boolean_flag};
pub use secret::Secret;
