pub mod backend;
pub mod config;
pub mod relay;
pub mod serve;
pub mod session;
