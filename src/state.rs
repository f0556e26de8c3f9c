use serde::Serialize;

use crate::error::{Result, StudioError, EMPTY_PROMPT_MESSAGE, UNKNOWN_FAILURE_MESSAGE};
use crate::types::ImageRef;

/// Prompt shown when a studio session starts.
pub const DEFAULT_PROMPT: &str = "A hyper-detailed, ultra-high-definition photograph of a lone red fox standing in fresh snow at golden hour, cinematic lighting, 8k";

/// Everything the form surface renders, held for the lifetime of a session.
///
/// Mutated only through [`begin_attempt`](Self::begin_attempt),
/// [`settle`](Self::settle) and the plain field setters, so every transition
/// can be exercised without a runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationState {
    pub prompt: String,
    pub image: Option<ImageRef>,
    pub error: Option<String>,
    pub in_flight: bool,
    pub review_notes: String,
    /// Number of attempts that passed validation so far.
    pub attempt: u64,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::with_prompt(DEFAULT_PROMPT)
    }
}

/// Identifies one validated attempt. Handed back to [`GenerationState::settle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptTicket {
    pub attempt: u64,
    pub prompt: String,
}

impl GenerationState {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            error: None,
            in_flight: false,
            review_notes: String::new(),
            attempt: 0,
        }
    }

    /// Validate the current prompt and enter the in-flight state.
    ///
    /// A blank prompt stores the validation message and leaves everything
    /// else untouched; in-flight is never raised for it.
    pub fn begin_attempt(&mut self) -> Result<AttemptTicket> {
        if self.prompt.trim().is_empty() {
            self.error = Some(EMPTY_PROMPT_MESSAGE.to_string());
            return Err(StudioError::Validation(EMPTY_PROMPT_MESSAGE.to_string()));
        }

        self.error = None;
        self.image = None;
        self.in_flight = true;
        self.attempt += 1;

        Ok(AttemptTicket {
            attempt: self.attempt,
            prompt: self.prompt.clone(),
        })
    }

    /// Apply the outcome of an attempt. Returns `false` (and changes nothing)
    /// when a newer attempt has started since `ticket` was issued.
    pub fn settle(&mut self, ticket: &AttemptTicket, outcome: &Result<ImageRef>) -> bool {
        if ticket.attempt != self.attempt {
            return false;
        }

        match outcome {
            Ok(image) => {
                self.image = Some(image.clone());
                self.error = None;
            }
            Err(err) => {
                self.image = None;
                self.error = Some(
                    err.failure_message()
                        .unwrap_or_else(|| UNKNOWN_FAILURE_MESSAGE.to_string()),
                );
            }
        }
        self.in_flight = false;
        true
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.in_flight && !self.prompt.trim().is_empty()
    }

    /// Whether the prompt field accepts edits.
    pub fn prompt_editable(&self) -> bool {
        !self.in_flight
    }

    /// The image of the last settled attempt; `None` while a call is outstanding.
    pub fn final_image(&self) -> Option<&ImageRef> {
        if self.in_flight {
            None
        } else {
            self.image.as_ref()
        }
    }

    /// Review notes are offered once an image is on screen.
    pub fn review_notes_visible(&self) -> bool {
        self.final_image().is_some()
    }
}
