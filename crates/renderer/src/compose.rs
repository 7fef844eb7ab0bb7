//! Document composition and page rendering.
//!
//! A [`RenderableDocument`] carries everything needed to produce the final
//! image: the title and timestamp headers plus either chart data or list
//! rows. Rendering is two-phase: the layout is realized first to learn the
//! canvas size from measured text, the page is sized from that, and only
//! then is the raster captured.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{Rgba, RgbaImage};
use rand::Rng;
use rank_common::{RankError, RankResult, RenderDatum, RenderReadiness, Rgb};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::assets::{AssetIndex, AssetKind};
use crate::canvas::{encode_png, Rasterizer};
use crate::layout::{ChartLayout, ChartLayoutEngine, DrawOp, LayoutOptions, TextAlign};
use crate::list::{layout_list, ListRow, LIST_WIDTH};
use crate::text::{FontMeasurer, TextMeasurer};

/// Horizontal padding on each side of the chart canvas.
pub const PAGE_PADDING: f32 = 20.0;

/// Initial viewport height; the capture grows to the full page.
pub const VIEWPORT_HEIGHT: u32 = 256;

const TITLE_FONT_SIZE: f32 = 32.0;
const TIMESTAMP_FONT_SIZE: f32 = 20.0;
const HEADER_LINE_SPACING: f32 = 1.5;
const HEADER_COLOR: Rgb = Rgb::new(0x33, 0x33, 0x33);
const GRADIENT_START: Rgb = Rgb::new(0xf6, 0xf8, 0xf9);
const GRADIENT_END: Rgb = Rgb::new(0xe5, 0xeb, 0xee);

/// What the document draws below its headers.
#[derive(Debug, Clone)]
pub enum DocumentBody {
    Chart {
        data: Vec<RenderDatum>,
        assets: Arc<AssetIndex>,
        options: LayoutOptions,
    },
    List {
        rows: Vec<ListRow>,
    },
}

/// A document ready for rendering.
#[derive(Debug, Clone)]
pub struct RenderableDocument {
    pub title: String,
    pub timestamp: Option<String>,
    pub body: DocumentBody,
}

/// Assemble a bar chart document.
pub fn compose(
    title: impl Into<String>,
    timestamp: Option<String>,
    data: Vec<RenderDatum>,
    assets: Arc<AssetIndex>,
    options: LayoutOptions,
) -> RenderableDocument {
    RenderableDocument {
        title: title.into(),
        timestamp,
        body: DocumentBody::Chart {
            data,
            assets,
            options,
        },
    }
}

/// Assemble a medal list document.
pub fn compose_list(title: impl Into<String>, rows: Vec<ListRow>) -> RenderableDocument {
    RenderableDocument {
        title: title.into(),
        timestamp: None,
        body: DocumentBody::List { rows },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayloadDatum<'a> {
    name: &'a str,
    user_id: &'a str,
    avatar_url: &'a str,
    value: i64,
    share_percent: f64,
    avatar_base64: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayloadAsset<'a> {
    user_id: &'a str,
    base64: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayloadOptions {
    full_background_opacity: f32,
    background_opacity: f32,
    move_icon_to_bar_end: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartPayload<'a> {
    ranking_data: Vec<PayloadDatum<'a>>,
    icon_data: Vec<PayloadAsset<'a>>,
    bar_background_data: Vec<PayloadAsset<'a>>,
    options: PayloadOptions,
}

fn asset_payload(assets: &AssetIndex, kind: AssetKind) -> Vec<PayloadAsset<'_>> {
    let mut out: Vec<_> = assets
        .entries(kind)
        .map(|(user_id, bytes)| PayloadAsset {
            user_id,
            base64: STANDARD.encode(bytes),
        })
        .collect();
    // HashMap order is arbitrary; keep the payload stable.
    out.sort_by(|a, b| a.user_id.cmp(b.user_id));
    out
}

impl RenderableDocument {
    /// Serialized payload of the document body.
    pub fn payload_json(&self) -> RankResult<String> {
        let json = match &self.body {
            DocumentBody::Chart {
                data,
                assets,
                options,
            } => {
                let payload = ChartPayload {
                    ranking_data: data
                        .iter()
                        .map(|d| PayloadDatum {
                            name: &d.name,
                            user_id: &d.external_user_id,
                            avatar_url: &d.avatar_url,
                            value: d.value,
                            share_percent: d.share_percent,
                            avatar_base64: d.avatar_raster.as_ref().map(|b| STANDARD.encode(b)),
                        })
                        .collect(),
                    icon_data: asset_payload(assets, AssetKind::Icon),
                    bar_background_data: asset_payload(assets, AssetKind::BarBackground),
                    options: PayloadOptions {
                        full_background_opacity: options.full_background_opacity,
                        background_opacity: options.background_opacity,
                        move_icon_to_bar_end: options.move_icon_to_bar_end,
                    },
                };
                serde_json::to_string(&payload)?
            }
            DocumentBody::List { rows } => serde_json::to_string(rows)?,
        };
        Ok(json)
    }

    /// Phase one: lay out the body to discover its size.
    pub fn realize<R: Rng + ?Sized>(&self, measurer: &dyn TextMeasurer, rng: &mut R) -> ChartLayout {
        match &self.body {
            DocumentBody::Chart {
                data,
                assets,
                options,
            } => ChartLayoutEngine::new(*options, measurer).layout_with_rng(data, assets, rng),
            DocumentBody::List { rows } => layout_list(&self.title, rows, measurer),
        }
    }

    /// Viewport for the capture, derived from a realized layout.
    pub fn viewport(&self, layout: &ChartLayout) -> (u32, u32) {
        match self.body {
            DocumentBody::Chart { .. } => (
                layout.canvas_width + (PAGE_PADDING * 2.0) as u32,
                VIEWPORT_HEIGHT,
            ),
            DocumentBody::List { .. } => (LIST_WIDTH as u32, VIEWPORT_HEIGHT),
        }
    }

    /// Standalone HTML with the headers and the embedded JSON payload.
    pub fn to_html(&self) -> RankResult<String> {
        let payload = self.payload_json()?.replace("</", "<\\/");
        let mut html = String::from("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"UTF-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        html.push_str("<style>html { background: linear-gradient(135deg, #f6f8f9 0%, #e5ebee 100%); }</style>\n");
        html.push_str("</head>\n<body>\n");
        if let Some(ts) = &self.timestamp {
            html.push_str(&format!("<h2>{}</h2>\n", escape_html(ts)));
        }
        if matches!(self.body, DocumentBody::Chart { .. }) {
            html.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        }
        html.push_str("<canvas id=\"rankingCanvas\"></canvas>\n");
        html.push_str(&format!(
            "<script type=\"application/json\" id=\"payload\">{}</script>\n",
            payload
        ));
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }

    fn headers(&self) -> Vec<(String, f32)> {
        if matches!(self.body, DocumentBody::List { .. }) {
            return Vec::new();
        }
        // Timestamp line sits above the title.
        let mut lines = Vec::with_capacity(2);
        if let Some(ts) = &self.timestamp {
            lines.push((ts.clone(), TIMESTAMP_FONT_SIZE));
        }
        lines.push((self.title.clone(), TITLE_FONT_SIZE));
        lines
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Produces PNG bytes from a document.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(
        &self,
        document: &RenderableDocument,
        readiness: RenderReadiness,
    ) -> RankResult<Vec<u8>>;
}

/// In-process renderer drawing with `image`/`imageproc`.
pub struct RasterPageRenderer {
    font: Option<Arc<FontMeasurer>>,
}

impl RasterPageRenderer {
    pub fn new(font: Option<FontMeasurer>) -> Self {
        Self {
            font: font.map(Arc::new),
        }
    }

    pub fn is_available(&self) -> bool {
        self.font.is_some()
    }

    /// Render with an explicit RNG for bar background selection.
    pub fn render_with_rng<R: Rng + ?Sized>(
        &self,
        document: &RenderableDocument,
        rng: &mut R,
    ) -> RankResult<Vec<u8>> {
        let font = self.font.as_deref().ok_or_else(|| {
            RankError::RenderServiceUnavailable("no font loaded for page rendering".to_string())
        })?;

        let layout = document.realize(font, rng);
        let (viewport_width, _) = document.viewport(&layout);
        let headers = document.headers();

        let (offset_x, header_height) = if headers.is_empty() {
            (0.0, 0.0)
        } else {
            let h: f32 = headers
                .iter()
                .map(|(_, size)| size * HEADER_LINE_SPACING)
                .sum();
            (PAGE_PADDING, PAGE_PADDING + h)
        };
        let page_width = viewport_width.max(layout.canvas_width);
        let page_height =
            header_height as u32 + layout.canvas_height + if headers.is_empty() { 0 } else { PAGE_PADDING as u32 };

        debug!(
            page_width,
            page_height,
            canvas_width = layout.canvas_width,
            canvas_height = layout.canvas_height,
            "Page geometry"
        );

        let mut page = if headers.is_empty() {
            RgbaImage::from_pixel(page_width, page_height, Rgba([255, 255, 255, 255]))
        } else {
            gradient(page_width, page_height)
        };

        let mut header_ops = Vec::with_capacity(headers.len());
        let mut y = PAGE_PADDING;
        for (text, size) in headers {
            let width = font.measure(&text, size);
            y += size * HEADER_LINE_SPACING;
            header_ops.push(DrawOp::Text {
                x: page_width as f32 / 2.0 - width / 2.0,
                baseline: y - size * (HEADER_LINE_SPACING - 1.0),
                text,
                align: TextAlign::Left,
                color: HEADER_COLOR.opaque(),
                font_size: size,
            });
        }

        let rasterizer = Rasterizer::new(Some(font));
        rasterizer.draw_all(&mut page, &header_ops, 0.0, 0.0);
        rasterizer.draw_all(&mut page, &layout.draw_ops, offset_x, header_height);

        encode_png(&page)
    }
}

#[async_trait]
impl PageRenderer for RasterPageRenderer {
    #[instrument(skip(self, document), fields(title = %document.title))]
    async fn render(
        &self,
        document: &RenderableDocument,
        readiness: RenderReadiness,
    ) -> RankResult<Vec<u8>> {
        debug!(readiness = readiness.as_str(), "Rendering document");
        let png = self.render_with_rng(document, &mut rand::thread_rng())?;
        info!(bytes = png.len(), "Rendered leaderboard image");
        Ok(png)
    }
}

/// 135 degree linear gradient over the page.
fn gradient(width: u32, height: u32) -> RgbaImage {
    let span = (width + height).saturating_sub(2).max(1) as f32;
    RgbaImage::from_fn(width, height, |x, y| {
        let t = (x + y) as f32 / span;
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba([
            lerp(GRADIENT_START.r, GRADIENT_END.r),
            lerp(GRADIENT_START.g, GRADIENT_END.g),
            lerp(GRADIENT_START.b, GRADIENT_END.b),
            255,
        ])
    })
}
