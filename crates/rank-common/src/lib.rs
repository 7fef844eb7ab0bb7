//! Common types shared across the monetary-rank crates.

pub mod color;
pub mod config;
pub mod error;
pub mod records;

pub use color::{Rgb, Rgba};
pub use config::{RankConfig, RankStyle, RenderReadiness};
pub use error::{RankError, RankResult};
pub use records::{BalanceRecord, BindingRecord, IdentityRecord, RankEntry, RenderDatum};
