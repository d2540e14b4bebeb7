//! Platform layer: drop surface and session driving.
//!
//! Paths handed over by the user are treated like a browser drop: they are
//! read into a fresh session, unpacked and parsed into a scene summary.

use std::path::PathBuf;

use anyhow::Result;
use asset::{GltfSceneLoader, RenderHints};

pub mod drop;
pub mod session;

pub use drop::{DiskFile, collect_dropped};
pub use session::{DropTicket, Session};

/// What the user asked to view.
#[derive(Clone, Debug)]
pub enum ViewRequest {
    /// Files or directories dropped onto the viewer.
    Drop(Vec<PathBuf>),
    /// The bundled sample model.
    Sample,
}

/// Ingest the dropped paths into `session`.
pub async fn drop_paths(session: &mut Session, paths: &[PathBuf]) -> Result<()> {
    let ticket = session.begin_drop();
    let files = collect_dropped(paths)?;
    let result = asset::ingest(&files).await;
    session.finish_drop(ticket, result)?;
    Ok(())
}

/// Replace whatever `session` shows with the bundled sample.
pub fn open_sample(session: &mut Session) {
    session.load_sample();
}

/// Build a session for `request` and parse its scene.
/// Returns once the scene is ready or loading failed.
pub fn run_viewer(request: ViewRequest, hints: RenderHints) -> Result<Session> {
    let mut session = Session::new(hints);

    match &request {
        ViewRequest::Drop(paths) => pollster::block_on(drop_paths(&mut session, paths))?,
        ViewRequest::Sample => open_sample(&mut session),
    }

    if let Some(intake) = session.intake() {
        if session.hints().verbose {
            for (path, data) in intake.buffers().iter() {
                log::info!("  {:<40} {:>10} bytes", path, data.len());
            }
        } else {
            log::info!(
                "{} buffer(s), {} bytes, entry '{}'",
                intake.buffers().len(),
                intake.buffers().total_bytes(),
                intake.entry()
            );
        }
        if !intake.expansion().overwritten.is_empty() {
            log::warn!(
                "{} file(s) were overwritten by archive members",
                intake.expansion().overwritten.len()
            );
        }
    }

    pollster::block_on(session.generate_scene(&GltfSceneLoader))?;
    Ok(session)
}
