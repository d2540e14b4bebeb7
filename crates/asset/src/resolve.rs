//! Path-resolution callback handed to the scene loader.
//!
//! A [`ResourceScope`] lives for exactly one scene load. Every resource it
//! resolves is tracked as a live handle in the session's [`HandleRegistry`]
//! and released when the scope is dropped, whether the load succeeded or not.

use std::{
    cell::Cell,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use bytes::Bytes;
use corelib::{IntakeError, IntakeResult};

use crate::{buffers::BufferSet, paths};

/// Counts resource handles that are still held by an in-flight load.
#[derive(Clone, Debug, Default)]
pub struct HandleRegistry {
    live: Arc<AtomicUsize>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles issued and not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    fn acquire(&self) {
        self.live.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self, count: usize) {
        self.live.fetch_sub(count, Ordering::AcqRel);
    }
}

/// Resolves sub-resources of one entry asset against a Buffer Set.
pub struct ResourceScope<'a> {
    buffers: &'a BufferSet,
    base: String,
    registry: HandleRegistry,
    issued: Cell<usize>,
}

impl<'a> ResourceScope<'a> {
    pub fn new(buffers: &'a BufferSet, base: impl Into<String>, registry: &HandleRegistry) -> Self {
        Self {
            buffers,
            base: base.into(),
            registry: registry.clone(),
            issued: Cell::new(0),
        }
    }

    /// Base path that relative URIs are resolved against.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Handles issued by this scope so far.
    pub fn issued(&self) -> usize {
        self.issued.get()
    }

    /// Look up `uri` (relative to the base path) in the Buffer Set.
    ///
    /// Fails with [`IntakeError::MissingResource`] if the file was not dropped;
    /// an absent resource is never served as empty content.
    pub fn resolve(&self, uri: &str) -> IntakeResult<Bytes> {
        let data = self
            .lookup(uri)
            .ok_or_else(|| IntakeError::MissingResource {
                uri: paths::join(&self.base, uri),
            })?;

        self.registry.acquire();
        self.issued.set(self.issued.get() + 1);
        log::debug!("Resolved '{}' ({} bytes)", uri, data.len());
        Ok(data.clone())
    }

    fn lookup(&self, uri: &str) -> Option<&'a Bytes> {
        let buffers = self.buffers;
        let raw = paths::join(&self.base, uri);
        if let Some(data) = buffers.get(&raw) {
            return Some(data);
        }
        // URIs in glTF files are percent-encoded, dropped file names are not.
        let decoded = urlencoding::decode(uri).ok()?;
        buffers.get(&paths::join(&self.base, &decoded))
    }
}

impl Drop for ResourceScope<'_> {
    fn drop(&mut self) {
        let issued = self.issued.get();
        if issued > 0 {
            self.registry.release(issued);
            log::debug!("Released {} resource handle(s)", issued);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> BufferSet {
        [
            ("models/car.gltf", b"{}".to_vec()),
            ("models/car.bin", vec![0u8; 8]),
            ("models/tex/paint job.png", b"png".to_vec()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn resolves_relative_to_base() {
        let buffers = set();
        let registry = HandleRegistry::new();
        let scope = ResourceScope::new(&buffers, "models/", &registry);

        assert_eq!(scope.resolve("car.bin").expect("bin").len(), 8);
        assert_eq!(&scope.resolve("tex/paint%20job.png").expect("png")[..], b"png");
        assert_eq!(registry.live(), 2);
    }

    #[test]
    fn missing_resource_fails_loudly() {
        let buffers = set();
        let registry = HandleRegistry::new();
        let scope = ResourceScope::new(&buffers, "models/", &registry);

        match scope.resolve("wheels.bin") {
            Err(IntakeError::MissingResource { uri }) => assert_eq!(uri, "models/wheels.bin"),
            other => panic!("expected missing resource, got {other:?}"),
        }
        assert_eq!(scope.issued(), 0);
    }

    #[test]
    fn handles_are_released_on_drop() {
        let buffers = set();
        let registry = HandleRegistry::new();
        {
            let scope = ResourceScope::new(&buffers, "models/", &registry);
            scope.resolve("car.bin").expect("bin");
            scope.resolve("car.gltf").expect("gltf");
            assert_eq!(registry.live(), 2);
        }
        assert_eq!(registry.live(), 0);
    }
}
