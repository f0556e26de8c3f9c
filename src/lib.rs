//! # imagen-studio
//!
//! Prompt-to-image studio built around Google's Imagen models.
//!
//! Provides an async [`ImagenClient`] for the Generative Language `predict`
//! endpoint, a [`GenerationController`] that runs the request lifecycle
//! (validate, go in flight, settle to an image or an error) over an
//! explicit [`GenerationState`], and plain-text renderers for the form.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imagen_studio::{GenerationController, ImagenClient, StudioConfig};
//!
//! # async fn example() -> imagen_studio::Result<()> {
//! let config = StudioConfig::from_env();
//! let controller = GenerationController::new(ImagenClient::new(&config)?);
//!
//! match controller.request_generation("a red fox in fresh snow").await {
//!     Ok(image) => {
//!         image.save(std::path::Path::new("fox.jpg"))?;
//!     }
//!     Err(_) => eprintln!("{}", controller.snapshot().error.unwrap_or_default()),
//! }
//!
//! controller.set_review_notes("fur detail is great, background too busy");
//! println!("{}", imagen_studio::view::render_form(&controller.snapshot()));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod generator;
pub mod imagen;
pub mod logging;
pub mod state;
pub mod types;
pub mod view;

pub use config::{StudioConfig, StudioConfigBuilder};
pub use controller::GenerationController;
pub use error::{Result, StudioError, EMPTY_PROMPT_MESSAGE, UNKNOWN_FAILURE_MESSAGE};
pub use generator::ImageGenerator;
pub use imagen::ImagenClient;
pub use state::{AttemptTicket, GenerationState, DEFAULT_PROMPT};
pub use types::ImageRef;
