//! Bundled sample model, available without dropping anything.

use bytes::Bytes;

use crate::{archive::ExpansionReport, buffers::BufferSet, intake::Intake};

/// Buffer Set key and entry path of the sample.
pub const SUZANNE_PATH: &str = "suzanne.gltf";

static SUZANNE: &[u8] = include_bytes!("../assets/suzanne.gltf");

/// Intake holding only the bundled sample model.
pub fn suzanne() -> Intake {
    let mut buffers = BufferSet::new();
    buffers.insert(SUZANNE_PATH, Bytes::from_static(SUZANNE));
    Intake::with_entry(buffers, SUZANNE_PATH.to_owned(), ExpansionReport::default())
}
