//! Detection of blank images.
//!
//! When the service's content filter trips it still answers `200`, but the
//! image it sends back is a single flat colour. A uniform image is treated as
//! filtered output. A legitimately uniform generation is misreported the same
//! way; there is no signal that tells the two apart.

/// Reports whether encoded image bytes are blank.
pub trait BlankImageDetector: Send + Sync {
    fn is_blank(&self, bytes: &[u8]) -> bool;
}

impl<F> BlankImageDetector for F
where
    F: Fn(&[u8]) -> bool + Send + Sync,
{
    fn is_blank(&self, bytes: &[u8]) -> bool {
        self(bytes)
    }
}

/// Never reports an image as blank.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverBlank;

impl BlankImageDetector for NeverBlank {
    fn is_blank(&self, _bytes: &[u8]) -> bool {
        false
    }
}

/// Decodes the image and reports it blank when every pixel has the same colour.
#[cfg(feature = "image")]
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformColorDetector;

#[cfg(feature = "image")]
impl BlankImageDetector for UniformColorDetector {
    fn is_blank(&self, bytes: &[u8]) -> bool {
        let decoded = match ::image::load_from_memory(bytes) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                tracing::warn!(error = %e, len = bytes.len(), "could not decode image");
                return false;
            }
        };

        let mut pixels = decoded.pixels();
        match pixels.next() {
            Some(first) => pixels.all(|p| p == first),
            None => true,
        }
    }
}

#[cfg(feature = "image")]
pub(crate) fn default_detector() -> std::sync::Arc<dyn BlankImageDetector> {
    std::sync::Arc::new(UniformColorDetector)
}

#[cfg(not(feature = "image"))]
pub(crate) fn default_detector() -> std::sync::Arc<dyn BlankImageDetector> {
    std::sync::Arc::new(NeverBlank)
}
