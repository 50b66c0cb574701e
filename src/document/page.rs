use std::borrow::Cow;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::debug;

use crate::document::error::LayoutError;

/// Decodes an encoded page image (PNG, JPEG, TIFF, ...) into RGB.
pub fn decode_page(bytes: &[u8]) -> Result<RgbImage, LayoutError> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| LayoutError::ImageLoadError { source })?
        .to_rgb8();
    debug!("Decoded {}x{} page image", image.width(), image.height());
    Ok(image)
}

/// Opens a page image from disk.
pub fn open_page<P: AsRef<Path>>(path: P) -> Result<RgbImage, LayoutError> {
    let image = image::open(path.as_ref())
        .map_err(|source| LayoutError::ImageLoadError { source })?
        .to_rgb8();
    Ok(image)
}

/// A page of a document, decoded only when its turn comes.
///
/// Loading happens inside the page's own unit of work, so a page that fails
/// to decode fails alone.
pub trait PageInput: Sync {
    fn load(&self) -> Result<Cow<'_, RgbImage>, LayoutError>;
}

impl PageInput for RgbImage {
    fn load(&self) -> Result<Cow<'_, RgbImage>, LayoutError> {
        Ok(Cow::Borrowed(self))
    }
}

/// Where a page comes from.
#[derive(Debug, Clone)]
pub enum PageSource {
    Image(RgbImage),
    /// Encoded image bytes such as an upload.
    Encoded(Vec<u8>),
    File(PathBuf),
}

impl PageInput for PageSource {
    fn load(&self) -> Result<Cow<'_, RgbImage>, LayoutError> {
        match self {
            PageSource::Image(image) => Ok(Cow::Borrowed(image)),
            PageSource::Encoded(bytes) => decode_page(bytes).map(Cow::Owned),
            PageSource::File(path) => open_page(path).map(Cow::Owned),
        }
    }
}

impl From<RgbImage> for PageSource {
    fn from(image: RgbImage) -> Self {
        PageSource::Image(image)
    }
}
