pub mod wizard_config;

pub use wizard_config::*;
