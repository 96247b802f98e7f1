//! Modules layer - Infrastructure components shared by features
//!
//! Contains the upload store and the soft-delete aware persistence layer.

pub mod persistence;
pub mod storage;
