//! Generate a single image from a text prompt and save it.
//!
//! Requires `GEMINI_API_KEY` (or `API_KEY`) in the environment.
//!
//! ```sh
//! cargo run --example simple_generation
//! ```

use imagen_studio::{ImagenClient, StudioConfig};
use std::path::Path;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = StudioConfig::from_env();
    let client = ImagenClient::new(&config)?;
    println!("Using model: {}", client.model());

    let image = client
        .generate_image("a beautiful sunset over mountains, ultra detailed")
        .await?;

    let path = format!("sunset.{}", image.file_extension());
    let bytes = image.save(Path::new(&path))?;
    println!("Saved {} bytes to {}", bytes, path);

    Ok(())
}
