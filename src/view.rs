//! Plain-text renderers for the studio form.
//!
//! Each function is a pure function of a [`GenerationState`] snapshot; the
//! CLI prints whatever they return.

use crate::error::Result;
use crate::state::GenerationState;
use crate::types::ImageRef;

pub const APP_TITLE: &str = "Imagen Studio";
pub const IMAGE_ALT_TEXT: &str = "AI generated image based on the prompt";

/// Label of the submit control for the given state.
pub fn submit_label(state: &GenerationState) -> &'static str {
    if state.in_flight {
        "[ Generating... ]"
    } else if state.can_submit() {
        "[ Generate Image ]"
    } else {
        "[ Generate Image ] (disabled)"
    }
}

/// One-line description of an image reference.
pub fn describe_image(image: &ImageRef) -> String {
    if image.is_data_url() {
        let payload = image.locator().split_once(',').map(|(_, p)| p).unwrap_or("");
        format!(
            "{} ({}, ~{} bytes)",
            IMAGE_ALT_TEXT,
            image.mime_type().unwrap_or("unknown type"),
            payload.len() / 4 * 3
        )
    } else {
        format!("{} ({})", IMAGE_ALT_TEXT, image.locator())
    }
}

/// Render the whole form: prompt, submit control, error banner, image area,
/// and review notes when an image is on screen.
pub fn render_form(state: &GenerationState) -> String {
    let mut lines = vec![format!("== {} ==", APP_TITLE)];

    let lock = if state.prompt_editable() { "" } else { " (locked)" };
    lines.push(format!("Prompt{}: {}", lock, state.prompt));
    lines.push(submit_label(state).to_string());

    if let Some(error) = &state.error {
        lines.push(format!("! {}", error));
    }

    let image_line = match (state.in_flight, state.final_image()) {
        (true, _) => "Image: generating...".to_string(),
        (false, Some(image)) => format!("Image: {}", describe_image(image)),
        (false, None) => "Image: none yet".to_string(),
    };
    lines.push(image_line);

    if state.review_notes_visible() {
        let notes = if state.review_notes.is_empty() {
            "(empty, use :notes <text>)"
        } else {
            state.review_notes.as_str()
        };
        lines.push(format!("Review notes: {}", notes));
    }

    lines.join("\n")
}

/// Machine-readable snapshot of the state.
pub fn render_json(state: &GenerationState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}
