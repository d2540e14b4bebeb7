//! Asset intake: dropped files in, Buffer Set and Entry Path out.

use std::{future::Future, io};

use bytes::Bytes;
use corelib::{IntakeError, IntakeResult};
use futures::future::try_join_all;

use crate::{
    archive::{self, ExpansionReport},
    buffers::BufferSet,
    paths,
    resolve::{HandleRegistry, ResourceScope},
};

/// A file handed over by the drop surface.
pub trait DroppedFile {
    /// Path relative to the drop root, possibly with a leading slash.
    fn path(&self) -> &str;

    /// Read the whole file into memory.
    fn read(&self) -> impl Future<Output = io::Result<Bytes>>;
}

/// Dropped file whose content is already in memory.
#[derive(Clone, Debug)]
pub struct MemoryFile {
    path: String,
    data: Bytes,
}

impl MemoryFile {
    pub fn new(path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

impl DroppedFile for MemoryFile {
    fn path(&self) -> &str {
        &self.path
    }

    async fn read(&self) -> io::Result<Bytes> {
        Ok(self.data.clone())
    }
}

/// Fully expanded Buffer Set plus the asset to load first.
#[derive(Clone, Debug)]
pub struct Intake {
    buffers: BufferSet,
    entry: String,
    expansion: ExpansionReport,
}

impl Intake {
    pub(crate) fn with_entry(buffers: BufferSet, entry: String, expansion: ExpansionReport) -> Self {
        debug_assert!(buffers.contains(&entry));
        Self {
            buffers,
            entry,
            expansion,
        }
    }

    /// Pick the entry of an already expanded Buffer Set.
    pub fn from_buffers(buffers: BufferSet) -> IntakeResult<Self> {
        let entry = resolve_entry(&buffers)?;
        Ok(Self::with_entry(buffers, entry, ExpansionReport::default()))
    }

    pub fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    /// Key of the root model asset; always present in [`Intake::buffers`].
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn expansion(&self) -> &ExpansionReport {
        &self.expansion
    }

    /// Path-resolution callback for sub-resources of the entry asset.
    pub fn resolver<'a>(&'a self, base: &str, registry: &HandleRegistry) -> ResourceScope<'a> {
        ResourceScope::new(&self.buffers, base, registry)
    }
}

/// Read every dropped file, unpack archives and pick the entry asset.
///
/// Reads are issued together and joined; a single failed read fails the
/// whole ingest and no partial Buffer Set is returned.
pub async fn ingest<F: DroppedFile>(files: &[F]) -> IntakeResult<Intake> {
    if files.is_empty() {
        return Err(IntakeError::EmptyDrop);
    }

    let reads = files.iter().map(|file| async move {
        let data = file.read().await.map_err(|source| IntakeError::Read {
            path: file.path().to_owned(),
            source,
        })?;
        log::debug!("Read '{}' ({} bytes)", file.path(), data.len());
        Ok::<_, IntakeError>((file.path(), data))
    });
    let loaded = try_join_all(reads).await?;

    let mut buffers = BufferSet::new();
    for (path, data) in loaded {
        buffers.insert(path, data);
    }

    let expansion = archive::expand_archives(&mut buffers)?;
    let entry = resolve_entry(&buffers)?;

    log::info!(
        "Ingested {} file(s) into {} buffer(s), {} bytes, entry '{}'",
        files.len(),
        buffers.len(),
        buffers.total_bytes(),
        entry
    );

    Ok(Intake::with_entry(buffers, entry, expansion))
}

/// First key, in insertion order, that names a `.glb` or `.gltf` file.
pub fn resolve_entry(buffers: &BufferSet) -> IntakeResult<String> {
    buffers
        .paths()
        .find(|p| paths::is_model(p))
        .map(str::to_owned)
        .ok_or(IntakeError::NoEntry)
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
        task::Poll,
    };

    use corelib::ErrorKind;

    use super::*;
    use crate::archive::tests::zip_of;

    struct Unreadable(&'static str);

    impl DroppedFile for Unreadable {
        fn path(&self) -> &str {
            self.0
        }

        async fn read(&self) -> io::Result<Bytes> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        }
    }

    enum Dropped {
        Ok(MemoryFile),
        Broken(Unreadable),
    }

    impl DroppedFile for Dropped {
        fn path(&self) -> &str {
            match self {
                Dropped::Ok(f) => f.path(),
                Dropped::Broken(f) => f.path(),
            }
        }

        async fn read(&self) -> io::Result<Bytes> {
            match self {
                Dropped::Ok(f) => f.read().await,
                Dropped::Broken(f) => f.read().await,
            }
        }
    }

    /// Completes only after every sibling read of the drop has started.
    struct Gated {
        file: MemoryFile,
        total: usize,
        started: Rc<Cell<usize>>,
        events: Rc<RefCell<Vec<String>>>,
    }

    impl DroppedFile for Gated {
        fn path(&self) -> &str {
            self.file.path()
        }

        async fn read(&self) -> io::Result<Bytes> {
            self.started.set(self.started.get() + 1);
            self.events.borrow_mut().push(format!("start {}", self.path()));

            let mut polls = 0;
            futures::future::poll_fn(|cx| {
                if self.started.get() == self.total {
                    return Poll::Ready(Ok(()));
                }
                polls += 1;
                if polls > 100 {
                    return Poll::Ready(Err(io::Error::other("sibling reads never started")));
                }
                cx.waker().wake_by_ref();
                Poll::Pending
            })
            .await?;

            self.events.borrow_mut().push(format!("end {}", self.path()));
            self.file.read().await
        }
    }

    #[test]
    fn reads_overlap_instead_of_running_one_by_one() {
        let started = Rc::new(Cell::new(0));
        let events = Rc::new(RefCell::new(Vec::new()));
        let names = ["car.gltf", "car.bin", "paint.png"];
        let files: Vec<Gated> = names
            .iter()
            .map(|name| Gated {
                file: MemoryFile::new(*name, &b"data"[..]),
                total: names.len(),
                started: Rc::clone(&started),
                events: Rc::clone(&events),
            })
            .collect();

        let intake = pollster::block_on(ingest(&files)).expect("ingest");

        assert_eq!(intake.buffers().paths().collect::<Vec<_>>(), names);
        let events = events.borrow();
        let first_end = events.iter().position(|e| e.starts_with("end")).expect("an end");
        assert_eq!(first_end, names.len(), "all reads start before any finishes: {events:?}");
    }

    #[test]
    fn single_glb_is_its_own_entry() {
        let files = [MemoryFile::new("/scene.glb", &b"glTF"[..])];
        let intake = pollster::block_on(ingest(&files)).expect("ingest");
        assert_eq!(intake.buffers().len(), 1);
        assert_eq!(intake.buffers().paths().next(), Some("scene.glb"));
        assert_eq!(intake.entry(), "scene.glb");
    }

    #[test]
    fn model_wins_over_other_files() {
        let files = [
            MemoryFile::new("readme.txt", &b"hello"[..]),
            MemoryFile::new("scene.glb", &b"glTF"[..]),
        ];
        let intake = pollster::block_on(ingest(&files)).expect("ingest");
        assert_eq!(intake.entry(), "scene.glb");
        assert_eq!(intake.buffers().len(), 2);
    }

    #[test]
    fn no_model_is_unresolvable() {
        let files = [MemoryFile::new("readme.txt", &b"hello"[..])];
        let err = pollster::block_on(ingest(&files)).unwrap_err();
        assert!(matches!(err, IntakeError::NoEntry));
        assert_eq!(err.kind(), ErrorKind::Unresolvable);
    }

    #[test]
    fn empty_drop_is_rejected() {
        let files: [MemoryFile; 0] = [];
        let err = pollster::block_on(ingest(&files)).unwrap_err();
        assert!(matches!(err, IntakeError::EmptyDrop));
    }

    #[test]
    fn one_failed_read_fails_everything() {
        let files = [
            Dropped::Ok(MemoryFile::new("car.gltf", &b"{}"[..])),
            Dropped::Broken(Unreadable("car.bin")),
            Dropped::Ok(MemoryFile::new("paint.png", &b"png"[..])),
        ];
        match pollster::block_on(ingest(&files)) {
            Err(IntakeError::Read { path, source }) => {
                assert_eq!(path, "car.bin");
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected read failure, got {other:?}"),
        }
    }

    #[test]
    fn zipped_gltf_is_expanded_and_resolved() {
        let zip = zip_of(&[("x.gltf", b"{}"), ("x.bin", b"\0\0\0\0")]);
        let files = [MemoryFile::new("/bundle.zip", zip)];
        let intake = pollster::block_on(ingest(&files)).expect("ingest");

        let mut keys: Vec<_> = intake.buffers().paths().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["x.bin", "x.gltf"]);
        assert_eq!(intake.entry(), "x.gltf");
        assert_eq!(intake.expansion().archives, ["bundle.zip"]);
    }

    #[test]
    fn resolver_serves_dropped_siblings() {
        let files = [
            MemoryFile::new("/car/car.gltf", &b"{}"[..]),
            MemoryFile::new("/car/car.bin", vec![7u8; 4]),
        ];
        let intake = pollster::block_on(ingest(&files)).expect("ingest");
        let registry = HandleRegistry::new();
        let scope = intake.resolver(paths::base_dir(intake.entry()), &registry);
        assert_eq!(&scope.resolve("car.bin").expect("bin")[..], &[7u8; 4]);
    }
}
