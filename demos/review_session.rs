//! Drive the generation controller the way the form does: watch state
//! changes, generate, then attach review notes.
//!
//! Requires `GEMINI_API_KEY` (or `API_KEY`) in the environment.
//!
//! ```sh
//! cargo run --example review_session -- "a lighthouse in a storm"
//! ```

use imagen_studio::view::render_form;
use imagen_studio::{GenerationController, ImagenClient, StudioConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a lighthouse in a storm".to_string());

    let client = ImagenClient::new(&StudioConfig::from_env())?;
    let controller = Arc::new(GenerationController::new(client));

    // Re-render on every state change
    let mut updates = controller.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            println!("{}\n", render_form(&state));
        }
    });

    if controller.request_generation(&prompt).await.is_ok() {
        controller.set_review_notes("Composition works; waves could be more dramatic.");
    }

    drop(controller);
    renderer.await?;
    Ok(())
}
