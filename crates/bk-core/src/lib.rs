//! BK Core: domain models, error taxonomy and repository traits for the
//! student case-management subsystem.
//!
//! This crate has no storage dependency. Persistence lives in `bk-db`,
//! orchestration in `bk-service`.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{BkError, BkResult, ErrorKind};
