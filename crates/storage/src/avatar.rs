//! Avatar download with timeout and fallback.
//!
//! Avatars are fetched over HTTP, decoded, and normalized to a small PNG so
//! the chart only ever sees one raster format. Any failure yields the
//! fallback avatar; a broken avatar URL never fails a ranking.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use rank_common::{RankError, RankResult, RenderDatum};
use tracing::{debug, instrument, warn};

/// Edge length of normalized avatars.
pub const AVATAR_EDGE: u32 = 50;

/// Default per-request timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);

const FALLBACK_COLOR: Rgba<u8> = Rgba([0xb0, 0xb0, 0xb0, 0xff]);

/// Counters for avatar fetches.
#[derive(Debug, Default)]
pub struct AvatarFetchStats {
    pub fetched: AtomicU64,
    pub fallbacks: AtomicU64,
}

impl AvatarFetchStats {
    pub fn fetched(&self) -> u64 {
        self.fetched.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }
}

/// Downloads and normalizes avatars.
#[derive(Clone)]
pub struct AvatarFetcher {
    client: reqwest::Client,
    fallback: Bytes,
    stats: Arc<AvatarFetchStats>,
}

impl AvatarFetcher {
    pub fn new(timeout: Duration) -> RankResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RankError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let placeholder = RgbaImage::from_pixel(AVATAR_EDGE, AVATAR_EDGE, FALLBACK_COLOR);
        let fallback = Bytes::from(encode_png(DynamicImage::ImageRgba8(placeholder))?);

        Ok(Self {
            client,
            fallback,
            stats: Arc::new(AvatarFetchStats::default()),
        })
    }

    /// PNG used whenever a fetch fails.
    pub fn fallback(&self) -> &[u8] {
        &self.fallback
    }

    pub fn stats(&self) -> &AvatarFetchStats {
        &self.stats
    }

    /// Fetch an avatar, falling back on any failure.
    pub async fn fetch(&self, url: &str) -> Vec<u8> {
        match self.try_fetch(url).await {
            Ok(png) => {
                self.stats.fetched.fetch_add(1, Ordering::Relaxed);
                png
            }
            Err(e) => {
                warn!(url = url, error = %e, "Avatar fetch failed, using fallback");
                self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                self.fallback.to_vec()
            }
        }
    }

    /// Fetch and normalize an avatar.
    #[instrument(skip(self))]
    pub async fn try_fetch(&self, url: &str) -> RankResult<Vec<u8>> {
        if url.is_empty() {
            return Err(RankError::RemoteFetch("empty avatar URL".to_string()));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;
        let body = response.bytes().await.map_err(fetch_error)?;
        debug!(bytes = body.len(), "Avatar downloaded");

        normalize_avatar(&body)
    }

    /// Fill `avatar_raster` of every row, fetching concurrently.
    pub async fn fetch_all(&self, data: &mut [RenderDatum]) {
        let urls: Vec<String> = data.iter().map(|d| d.avatar_url.clone()).collect();
        let rasters = join_all(urls.iter().map(|url| self.fetch(url))).await;

        for (datum, raster) in data.iter_mut().zip(rasters) {
            datum.avatar_raster = Some(raster);
        }
    }
}

fn fetch_error(err: reqwest::Error) -> RankError {
    if err.is_timeout() {
        RankError::Timeout
    } else {
        RankError::RemoteFetch(err.to_string())
    }
}

/// Decode any supported image and re-encode it as an `AVATAR_EDGE` PNG.
pub fn normalize_avatar(bytes: &[u8]) -> RankResult<Vec<u8>> {
    let image = image::load_from_memory(bytes)?;
    encode_png(image.resize_exact(AVATAR_EDGE, AVATAR_EDGE, FilterType::Triangle))
}

fn encode_png(image: DynamicImage) -> RankResult<Vec<u8>> {
    let mut out = Vec::new();
    image.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)?;
    Ok(out)
}
