//! Adapters implementing the domain ports.

pub mod http_config;
pub mod in_memory;
