pub mod manager;
pub mod registry_file;

pub use manager::ComponentManager;
