//! Repository modules implementing CRUD operations for all grc entities.
//!
//! Each module adds methods to `GrcService` via `impl GrcService` blocks.

pub mod audit;
pub mod audit_plan;
pub mod finding;
pub mod kri;
pub mod review;
pub mod risk;
pub mod workpaper;
