//! Conversion of ranking entries into chart rows.

use rank_common::{RankEntry, RenderDatum};

/// Convert ranking entries into chart rows with share percentages.
///
/// The share is informational only; it is 0 for every row when the total is
/// not positive. Rows are re-sorted by value (stable), so already sorted
/// input keeps its order.
pub fn to_render_data(entries: &[RankEntry]) -> Vec<RenderDatum> {
    // Summed as f64 so large balances cannot overflow.
    let total: f64 = entries.iter().map(|e| e.value as f64).sum();

    let mut data: Vec<RenderDatum> = entries
        .iter()
        .map(|entry| RenderDatum {
            name: entry.display_name.clone(),
            external_user_id: entry.external_user_id.clone(),
            avatar_url: entry.avatar_url.clone(),
            value: entry.value,
            share_percent: share_percent(entry.value, total),
            avatar_raster: None,
        })
        .collect();

    data.sort_by(|a, b| b.value.cmp(&a.value));
    data
}

fn share_percent(value: i64, total: f64) -> f64 {
    if total > 0.0 {
        value as f64 / total * 100.0
    } else {
        0.0
    }
}
