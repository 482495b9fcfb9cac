//! Integrators
pub mod plain;
