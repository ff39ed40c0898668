//! ID prefix constants.
//!
//! Every persisted entity ID is `{prefix}-{8 hex chars}`, e.g. `pln-a3f8b2c1`.

pub const PREFIX_AUDIT_PLAN: &str = "pln";
pub const PREFIX_WORKPAPER: &str = "wpp";
pub const PREFIX_FINDING: &str = "fnd";
pub const PREFIX_RISK: &str = "rsk";
pub const PREFIX_KRI: &str = "kri";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_AUDIT_PLAN,
    PREFIX_WORKPAPER,
    PREFIX_FINDING,
    PREFIX_RISK,
    PREFIX_KRI,
    PREFIX_AUDIT,
];

/// Format the human-facing reference code of the `seq`-th finding (`F-007`).
#[must_use]
pub fn finding_reference_code(seq: u32) -> String {
    format!("F-{seq:03}")
}
