use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::types::ImageRef;

/// The external image-generation capability.
///
/// Takes a prompt and asynchronously produces either a displayable
/// [`ImageRef`] or a failure. Implemented by
/// [`ImagenClient`](crate::ImagenClient); tests plug in scripted doubles.
///
/// # Example
///
/// ```ignore
/// use imagen_studio::{ImageGenerator, ImageRef, Result};
///
/// struct Placeholder;
///
/// impl ImageGenerator for Placeholder {
///     async fn generate(&self, prompt: &str) -> Result<ImageRef> {
///         Ok(ImageRef::new(format!("placeholder://{}", prompt.len())))
///     }
/// }
/// ```
pub trait ImageGenerator: Send + Sync {
    /// Generate one image for `prompt`. The prompt is passed through untrimmed.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<ImageRef>> + Send;

    /// Human-readable name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<G: ImageGenerator> ImageGenerator for Arc<G> {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<ImageRef>> + Send {
        (**self).generate(prompt)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
