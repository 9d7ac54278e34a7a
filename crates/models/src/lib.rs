//! SeaORM entities for the service catalog plus the field rules every
//! write path must respect.

pub mod errors;
pub mod db;
pub mod service;
pub mod service_version;
