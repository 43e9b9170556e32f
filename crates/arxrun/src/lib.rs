pub mod app;
pub mod boundary;
pub mod config;
pub mod container;
pub mod context;
pub mod factory;
pub mod info;
pub mod proxy;
pub mod registry;
pub mod runtime;
pub mod status;
pub mod telemetry;
