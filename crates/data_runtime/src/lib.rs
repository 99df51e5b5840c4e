//! data_runtime: declarative stat tables for the combat core.
//!
//! Tables load from `data/config/*.toml` when present and fall back to
//! compiled-in defaults otherwise, so the core and its tests run without a
//! data checkout.

pub mod specs {
    pub mod projectiles;
    pub mod units;
}
