//! Sensor drivers
//!
//! - [`proximity`]: Capella cm36672p / cm36686 proximity sensor

pub mod proximity;

// Re-export main types
pub use proximity::{Cm36672p, ThresholdPair, Variant, VariantConfig, variant_config};
