pub mod data;
pub mod defaults;
pub mod io;
pub mod orchestrator;
pub mod printing;

pub use data::{path_display, Config, ModelOverride};
pub use io::ConfigError;

#[cfg(test)]
pub mod tests;
