//! # grc-core
//!
//! Core types and pure logic for the grc audit workbench.
//!
//! This crate provides the foundational types shared across all grc crates:
//! - The ISO 27001:2022 clause catalog (management clauses and Annex A controls)
//! - Workpaper template definitions and the [`template::TemplateService`]
//! - The [`selection::CategorySelector`] state machine
//! - Entity structs for audit plans, workpapers, findings, risks, and KRIs
//! - Status enums with state machine transitions
//! - Risk scoring and heat map aggregation
//! - ID prefix constants and cross-cutting error types
//!
//! Nothing in here performs I/O. Persistence lives in `grc-db`.

pub mod audit_detail;
pub mod catalog;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
pub mod risk;
pub mod selection;
pub mod template;
