/// Remote image loading for the grid and the photo dialog
///
/// Images are downloaded with reqwest, decoded and downscaled on a blocking
/// thread, and kept in memory as iced image handles keyed by URL.

use iced::widget::image::Handle;
use image::imageops::FilterType;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use tracing::{debug, warn};

use crate::config::Config;

/// Longest edge of a grid thumbnail, in pixels
pub const THUMBNAIL_SIZE: u32 = 256;

/// Longest edge of the image shown in the photo dialog
pub const FULL_SIZE: u32 = 1600;

/// Downloads and decodes images
#[derive(Debug, Clone)]
pub struct ImageLoader {
    client: Client,
}

impl ImageLoader {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.image_timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch `url` and decode it, shrinking it to fit `max_edge`
    pub fn load(
        &self,
        url: String,
        max_edge: u32,
    ) -> impl Future<Output = Result<Handle, String>> + Send + 'static {
        let client = self.client.clone();

        async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| format!("Failed to download {}: {}", url, e))?;

            let bytes = response
                .bytes()
                .await
                .map_err(|e| format!("Failed to read {}: {}", url, e))?;

            debug!(%url, size = bytes.len(), "Downloaded image");

            // Decoding is CPU-bound
            tokio::task::spawn_blocking(move || decode_image(&bytes, max_edge))
                .await
                .map_err(|e| format!("Task join error: {}", e))?
        }
    }
}

/// Decode encoded image bytes into an RGBA handle no larger than `max_edge`
pub fn decode_image(bytes: &[u8], max_edge: u32) -> Result<Handle, String> {
    let (width, height, pixels) = decode_rgba(bytes, max_edge)?;
    Ok(Handle::from_rgba(width, height, pixels))
}

fn decode_rgba(bytes: &[u8], max_edge: u32) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("Failed to decode image: {}", e))?;

    let img = if img.width() > max_edge || img.height() > max_edge {
        img.resize(max_edge, max_edge, FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((width, height, rgba.into_raw()))
}

/// Load state of one image
#[derive(Debug, Clone)]
pub enum ImageSlot {
    Loading,
    Ready(Handle),
    Failed,
}

/// In-memory image store keyed by URL
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageSlot>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` as loading. Returns false if it is loading or loaded
    /// already, in which case no download should be started. Failed
    /// entries are retried.
    pub fn begin(&mut self, url: &str) -> bool {
        match self.entries.get(url) {
            Some(ImageSlot::Failed) => debug!(%url, "Retrying failed image"),
            Some(_) => return false,
            None => {}
        }
        self.entries.insert(url.to_string(), ImageSlot::Loading);
        true
    }

    /// Store a finished download. Results for evicted URLs are dropped.
    pub fn finish(&mut self, url: &str, result: Result<Handle, String>) {
        let Some(slot) = self.entries.get_mut(url) else {
            debug!(%url, "Dropping image for evicted entry");
            return;
        };

        *slot = match result {
            Ok(handle) => ImageSlot::Ready(handle),
            Err(e) => {
                warn!("⚠️  {}", e);
                ImageSlot::Failed
            }
        };
    }

    pub fn get(&self, url: &str) -> Option<&ImageSlot> {
        self.entries.get(url)
    }

    /// Drop every entry whose URL is not in `keep`
    pub fn retain<'a>(&mut self, keep: impl IntoIterator<Item = &'a str>) {
        let keep: HashSet<&str> = keep.into_iter().collect();
        let before = self.entries.len();
        self.entries.retain(|url, _| keep.contains(url.as_str()));

        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "Evicted cached images");
        }
    }
}
