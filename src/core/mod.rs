//! Core modules: the store handle, configuration, database access and the
//! shared helpers every subsystem builds on.

pub mod broker;
pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod output;
pub mod schemas;
pub mod store;
pub mod time;
