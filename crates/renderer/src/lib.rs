//! Image rendering for the monetary leaderboard.
//!
//! Implements the chart pipeline:
//! - Average color and contrasting text color of images
//! - Per-user decorative assets (icons, bar backgrounds)
//! - Horizontal bar chart layout as a list of draw operations
//! - Medal list layout
//! - Rasterization of draw operations and PNG encoding
//! - Document composition and two-phase page rendering

pub mod assets;
pub mod canvas;
pub mod color;
pub mod compose;
pub mod layout;
pub mod list;
pub mod text;

pub use assets::{AssetIndex, AssetKind};
pub use compose::{compose, compose_list, PageRenderer, RasterPageRenderer, RenderableDocument};
pub use layout::{ChartLayout, ChartLayoutEngine, DrawOp, LayoutOptions};
pub use text::{FixedAdvanceMeasurer, FontMeasurer, TextMeasurer};
