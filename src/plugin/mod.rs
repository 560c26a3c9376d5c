pub mod discovery;
pub mod installer;
pub mod manager;
pub mod manifest;

pub use manager::PluginManager;
