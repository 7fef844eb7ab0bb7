//! Medal list style: a narrow card with one line per user.

use rank_common::{RankEntry, Rgb};
use serde::{Deserialize, Serialize};

use crate::layout::{truncate_name, ChartLayout, DrawOp, Rect, TextAlign};
use crate::text::TextMeasurer;

pub const LIST_WIDTH: f32 = 550.0;
const CARD_X: f32 = 25.0;
const CARD_WIDTH: f32 = 500.0;
const CARD_PADDING: f32 = 30.0;

const TITLE_FONT_SIZE: f32 = 28.0;
const ROW_FONT_SIZE: f32 = 18.0;
const SUFFIX_FONT_SIZE: f32 = 14.0;

const ROWS_TOP: f32 = 88.0;
const LIST_ROW_HEIGHT: f32 = 50.0;
const MEDAL_SIZE: f32 = 24.0;
const NUMBER_WIDTH: f32 = 30.0;
const GAP: f32 = 15.0;

pub const CURRENCY_SUFFIX: &str = " 币";

const PAGE_BACKGROUND: Rgb = Rgb::new(0xf0, 0xf4, 0xf8);
const TITLE_COLOR: Rgb = Rgb::new(0x2c, 0x3e, 0x50);
const NUMBER_COLOR: Rgb = Rgb::new(0x7f, 0x8c, 0x8d);
const VALUE_COLOR: Rgb = Rgb::new(0xe7, 0x4c, 0x3c);
const SUFFIX_COLOR: Rgb = Rgb::new(0x95, 0xa5, 0xa6);
const DIVIDER_COLOR: Rgb = Rgb::new(0xec, 0xf0, 0xf1);

/// Gold, silver and bronze.
const MEDAL_COLORS: [Rgb; 3] = [
    Rgb::new(0xf1, 0xc4, 0x0f),
    Rgb::new(0xbd, 0xc3, 0xc7),
    Rgb::new(0xcd, 0x7f, 0x32),
];

/// One line of the list. `order` starts at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub order: usize,
    pub name: String,
    pub value: i64,
}

pub fn list_rows(entries: &[RankEntry]) -> Vec<ListRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| ListRow {
            order: i + 1,
            name: e.display_name.clone(),
            value: e.value,
        })
        .collect()
}

/// Lay out the list card.
pub fn layout_list(title: &str, rows: &[ListRow], measurer: &dyn TextMeasurer) -> ChartLayout {
    let height = ROWS_TOP + LIST_ROW_HEIGHT * rows.len() as f32 + CARD_PADDING;
    let inner_left = CARD_X + CARD_PADDING;
    let inner_right = CARD_X + CARD_WIDTH - CARD_PADDING;

    let mut ops = vec![
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, LIST_WIDTH, height),
            color: PAGE_BACKGROUND.opaque(),
        },
        DrawOp::FillRect {
            rect: Rect::new(CARD_X, 0.0, CARD_WIDTH, height),
            color: Rgb::WHITE.opaque(),
        },
    ];

    let title_width = measurer.measure(title, TITLE_FONT_SIZE);
    ops.push(DrawOp::Text {
        text: title.to_string(),
        x: LIST_WIDTH / 2.0 - title_width / 2.0,
        baseline: CARD_PADDING + TITLE_FONT_SIZE,
        align: TextAlign::Left,
        color: TITLE_COLOR.opaque(),
        font_size: TITLE_FONT_SIZE,
    });

    let suffix_width = measurer.measure(CURRENCY_SUFFIX, SUFFIX_FONT_SIZE);
    for (i, row) in rows.iter().enumerate() {
        let top = ROWS_TOP + LIST_ROW_HEIGHT * i as f32;
        let baseline = top + LIST_ROW_HEIGHT / 2.0 + ROW_FONT_SIZE / 3.0;
        let number_x = inner_left + 10.0;

        ops.push(DrawOp::Text {
            text: row.order.to_string(),
            x: number_x,
            baseline,
            align: TextAlign::Left,
            color: NUMBER_COLOR.opaque(),
            font_size: ROW_FONT_SIZE,
        });

        let mut name_x = number_x + NUMBER_WIDTH + GAP;
        if let Some(medal) = row.order.checked_sub(1).and_then(|i| MEDAL_COLORS.get(i)) {
            ops.push(DrawOp::FillRect {
                rect: Rect::new(
                    name_x,
                    top + (LIST_ROW_HEIGHT - MEDAL_SIZE) / 2.0,
                    MEDAL_SIZE,
                    MEDAL_SIZE,
                ),
                color: medal.opaque(),
            });
            name_x += MEDAL_SIZE + GAP;
        }

        let suffix_right = inner_right - 10.0;
        let value_right = suffix_right - suffix_width;
        let value_text = row.value.to_string();
        let value_left = value_right - measurer.measure(&value_text, ROW_FONT_SIZE);

        let name = truncate_name(measurer, &row.name, value_left - 10.0 - name_x, ROW_FONT_SIZE);
        ops.push(DrawOp::Text {
            text: name,
            x: name_x,
            baseline,
            align: TextAlign::Left,
            color: Rgb::BLACK.opaque(),
            font_size: ROW_FONT_SIZE,
        });
        ops.push(DrawOp::Text {
            text: value_text,
            x: value_right,
            baseline,
            align: TextAlign::Right,
            color: VALUE_COLOR.opaque(),
            font_size: ROW_FONT_SIZE,
        });
        ops.push(DrawOp::Text {
            text: CURRENCY_SUFFIX.to_string(),
            x: suffix_right,
            baseline,
            align: TextAlign::Right,
            color: SUFFIX_COLOR.opaque(),
            font_size: SUFFIX_FONT_SIZE,
        });
        ops.push(DrawOp::FillRect {
            rect: Rect::new(inner_left, top + LIST_ROW_HEIGHT - 1.0, inner_right - inner_left, 1.0),
            color: DIVIDER_COLOR.opaque(),
        });
    }

    ChartLayout {
        canvas_width: LIST_WIDTH as u32,
        canvas_height: height as u32,
        draw_ops: ops,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FixedAdvanceMeasurer;

    fn row(order: usize) -> ListRow {
        ListRow {
            order,
            name: format!("user{}", order),
            value: 100 - order as i64,
        }
    }

    #[test]
    fn test_only_top_three_get_medals() {
        let rows: Vec<_> = (1..=5).map(row).collect();
        let layout = layout_list("Top", &rows, &FixedAdvanceMeasurer::default());

        let medals = layout
            .draw_ops
            .iter()
            .filter(|op| {
                matches!(op, DrawOp::FillRect { rect, .. } if rect.width == MEDAL_SIZE && rect.height == MEDAL_SIZE)
            })
            .count();
        assert_eq!(medals, 3);
        assert_eq!(layout.canvas_width, 550);
        assert_eq!(layout.canvas_height, 88 + 5 * 50 + 30);
    }
}
