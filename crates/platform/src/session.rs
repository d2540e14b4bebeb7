//! Viewer session state, owned by whoever drives the drop surface.

use anyhow::{Result, bail};
use asset::{HandleRegistry, Intake, RenderHints, Scene, SceneLoader, sample};
use corelib::IntakeResult;

/// Identifies one drop. Results carrying an outdated ticket are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct DropTicket(u64);

/// File buffers, entry and scene of the model currently shown.
#[derive(Debug, Default)]
pub struct Session {
    hints: RenderHints,
    generation: u64,
    intake: Option<Intake>,
    scene: Option<Scene>,
    registry: HandleRegistry,
}

impl Session {
    pub fn new(hints: RenderHints) -> Self {
        Self {
            hints,
            ..Self::default()
        }
    }

    pub fn hints(&self) -> &RenderHints {
        &self.hints
    }

    pub fn intake(&self) -> Option<&Intake> {
        self.intake.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn has_animations(&self) -> bool {
        self.scene.as_ref().is_some_and(Scene::has_animations)
    }

    /// Resource handles still held by a scene load.
    pub fn live_handles(&self) -> usize {
        self.registry.live()
    }

    /// Forget the current model.
    pub fn reset(&mut self) {
        self.intake = None;
        self.scene = None;
    }

    /// Start a new drop. Anything still in flight for an older drop becomes stale.
    pub fn begin_drop(&mut self) -> DropTicket {
        self.reset();
        self.generation += 1;
        log::debug!("Drop #{} started", self.generation);
        DropTicket(self.generation)
    }

    /// Store the outcome of an ingest.
    ///
    /// Returns `Ok(false)` when the ticket is stale and the result was dropped.
    pub fn finish_drop(&mut self, ticket: DropTicket, result: IntakeResult<Intake>) -> Result<bool> {
        if ticket.0 != self.generation {
            log::debug!(
                "Discarding result of drop #{} (current is #{})",
                ticket.0,
                self.generation
            );
            return Ok(false);
        }
        self.intake = Some(result?);
        Ok(true)
    }

    /// Show the bundled sample model instead of a dropped file.
    pub fn load_sample(&mut self) {
        let _ = self.begin_drop();
        log::info!("Loading bundled sample '{}'", sample::SUZANNE_PATH);
        self.intake = Some(sample::suzanne());
    }

    /// Parse the current intake into a scene.
    ///
    /// The first scene built for an intake is kept; later calls return it
    /// unchanged.
    pub async fn generate_scene<L: SceneLoader>(&mut self, loader: &L) -> Result<&Scene> {
        let Some(intake) = self.intake.as_ref() else {
            bail!("Nothing has been dropped yet");
        };

        let scene = asset::generate_scene(intake, &self.hints, &self.registry, loader).await?;
        Ok(self.scene.get_or_insert(scene))
    }
}
