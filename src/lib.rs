// Library for tests to access modules

pub mod aggregation;
pub mod config;
pub mod exporter;
pub mod gateway;
pub mod models;
pub mod routes;
pub mod signer;
pub mod snapshot;
pub mod version;
