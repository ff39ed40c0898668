//! Entity structs for grc domain objects.
//!
//! Each entity maps to a table in the libSQL database (see `grc-db/migrations`).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip
//! and schema validation.

mod audit;
mod audit_plan;
mod finding;
mod kri;
mod risk;
mod workpaper;

pub use audit::AuditEntry;
pub use audit_plan::AuditPlan;
pub use finding::Finding;
pub use kri::Kri;
pub use risk::Risk;
pub use workpaper::{TickMark, Workpaper};
