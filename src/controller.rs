use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::generator::ImageGenerator;
use crate::state::{AttemptTicket, GenerationState};
use crate::types::ImageRef;

/// Owns the studio state and runs generation attempts against an
/// [`ImageGenerator`].
///
/// All methods take `&self`. The state lock is released before the external
/// call is awaited, so notes can be edited (and snapshots rendered) while an
/// attempt is outstanding. Nothing stops a second attempt from starting while
/// one is in flight; callers gate submission on [`can_submit`](Self::can_submit).
/// When attempts overlap, only the most recent one is allowed to settle the
/// state.
///
/// # Example
/// ```no_run
/// use imagen_studio::{GenerationController, ImagenClient, StudioConfig};
///
/// # async fn example() -> imagen_studio::Result<()> {
/// let client = ImagenClient::new(&StudioConfig::from_env())?;
/// let controller = GenerationController::new(client);
///
/// controller.request_generation("a red fox").await?;
/// let state = controller.snapshot();
/// println!("{:?}", state.final_image());
/// # Ok(())
/// # }
/// ```
pub struct GenerationController<G> {
    generator: G,
    state: Mutex<GenerationState>,
    updates: watch::Sender<GenerationState>,
}

impl<G: ImageGenerator> GenerationController<G> {
    /// Create a controller starting from the default state.
    pub fn new(generator: G) -> Self {
        Self::with_state(generator, GenerationState::default())
    }

    /// Create a controller starting from `state`.
    pub fn with_state(generator: G, state: GenerationState) -> Self {
        let (updates, _) = watch::channel(state.clone());
        Self {
            generator,
            state: Mutex::new(state),
            updates,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> GenerationState {
        self.read(|s| s.clone())
    }

    /// Receive a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.updates.subscribe()
    }

    /// Replace the prompt text. Editing is a UI-level concern: check
    /// [`prompt_editable`](Self::prompt_editable) before offering it.
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.publish(|s| s.prompt = prompt);
    }

    /// Replace the review notes. Independent of generation state.
    pub fn set_review_notes(&self, notes: impl Into<String>) {
        let notes = notes.into();
        self.publish(|s| s.review_notes = notes);
    }

    pub fn can_submit(&self) -> bool {
        self.read(|s| s.can_submit())
    }

    pub fn prompt_editable(&self) -> bool {
        self.read(|s| s.prompt_editable())
    }

    pub fn is_in_flight(&self) -> bool {
        self.read(|s| s.in_flight)
    }

    /// Store `prompt` and run one generation attempt with it.
    ///
    /// Returns the generator's outcome. The same outcome is reflected in the
    /// state unless a newer attempt started in the meantime.
    pub async fn request_generation(&self, prompt: &str) -> Result<ImageRef> {
        let ticket = self.begin_generation(prompt)?;
        self.complete(ticket).await
    }

    /// Run one generation attempt with the stored prompt.
    pub async fn generate(&self) -> Result<ImageRef> {
        let ticket = self.begin(|s| s.begin_attempt())?;
        self.complete(ticket).await
    }

    /// Store `prompt` and enter the in-flight state in one step, without
    /// calling the generator yet. Finish the attempt with
    /// [`complete`](Self::complete).
    pub fn begin_generation(&self, prompt: &str) -> Result<AttemptTicket> {
        self.begin(|s| {
            s.prompt = prompt.to_string();
            s.begin_attempt()
        })
    }

    /// Call the generator for a begun attempt and settle the state with its
    /// outcome.
    pub async fn complete(&self, ticket: AttemptTicket) -> Result<ImageRef> {
        info!(
            attempt = ticket.attempt,
            generator = self.generator.name(),
            "starting image generation"
        );

        let outcome = self.generator.generate(&ticket.prompt).await;

        match &outcome {
            Ok(image) => info!(
                attempt = ticket.attempt,
                mime_type = image.mime_type().unwrap_or("unknown"),
                "image generation succeeded"
            ),
            Err(err) => error!(attempt = ticket.attempt, error = ?err, "image generation failed"),
        }

        if !self.publish(|s| s.settle(&ticket, &outcome)) {
            warn!(
                attempt = ticket.attempt,
                "discarding result of superseded generation attempt"
            );
        }

        outcome
    }

    fn begin(
        &self,
        start: impl FnOnce(&mut GenerationState) -> Result<AttemptTicket>,
    ) -> Result<AttemptTicket> {
        let begun = self.publish(start);
        if let Err(err) = &begun {
            warn!(error = %err, "generation request rejected");
        }
        begun
    }

    /// Read through the locked state without notifying subscribers.
    fn read<R>(&self, f: impl FnOnce(&GenerationState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    /// Run `f` against the locked state and broadcast the result.
    fn publish<R>(&self, f: impl FnOnce(&mut GenerationState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let result = f(&mut state);
        self.updates.send_replace(state.clone());
        result
    }
}
