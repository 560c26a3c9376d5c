pub mod component;
pub mod config;
pub mod scene;
pub mod system;
