//! Drop surface: turns paths given by the user into dropped files.

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use asset::DroppedFile;
use bytes::Bytes;
use corelib::IntakeError;
use futures::channel::oneshot;
use walkdir::WalkDir;

/// A dropped file that still lives on disk.
#[derive(Clone, Debug)]
pub struct DiskFile {
    path: String,
    fs_path: PathBuf,
}

impl DiskFile {
    pub fn new(path: impl Into<String>, fs_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fs_path: fs_path.into(),
        }
    }
}

impl DroppedFile for DiskFile {
    fn path(&self) -> &str {
        &self.path
    }

    /// Reads on a helper thread so sibling reads of the same drop overlap.
    async fn read(&self) -> io::Result<Bytes> {
        let (tx, rx) = oneshot::channel();
        let fs_path = self.fs_path.clone();
        std::thread::spawn(move || {
            let _ = tx.send(std::fs::read(&fs_path).map(Bytes::from));
        });
        rx.await
            .map_err(|_| io::Error::other(format!("reader for {} exited early", self.path)))?
    }
}

/// Collect the files behind `paths` the way a browser drop reports them:
/// a file becomes `/<name>`, a directory contributes `/<dir>/<relative path>`
/// for every file below it.
pub fn collect_dropped(paths: &[PathBuf]) -> Result<Vec<DiskFile>> {
    let mut files = Vec::new();

    for path in paths {
        let meta = std::fs::metadata(path).map_err(|source| read_error(path, source))?;
        let name = file_name(path)?;

        if !meta.is_dir() {
            files.push(DiskFile::new(format!("/{name}"), path));
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let at = err.path().unwrap_or(path.as_path()).to_path_buf();
                read_error(&at, err.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(path)
                .with_context(|| format!("{} escaped its drop root", entry.path().display()))?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(DiskFile::new(format!("/{name}/{relative}"), entry.path()));
        }
    }

    log::debug!("Collected {} dropped file(s) from {} path(s)", files.len(), paths.len());
    Ok(files)
}

fn read_error(path: &Path, source: io::Error) -> IntakeError {
    IntakeError::Read {
        path: path.display().to_string(),
        source,
    }
}

fn file_name(path: &Path) -> Result<String> {
    let canonical;
    let path = if path.file_name().is_some() {
        path
    } else {
        // `.` or `..` have no name of their own.
        canonical = path
            .canonicalize()
            .map_err(|source| read_error(path, source))?;
        canonical.as_path()
    };
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use corelib::ErrorKind;

    use super::*;

    #[test]
    fn files_and_directories_get_drop_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model_dir = dir.path().join("car");
        fs::create_dir_all(model_dir.join("tex")).expect("mkdir");
        fs::write(model_dir.join("car.gltf"), b"{}").expect("write");
        fs::write(model_dir.join("tex").join("paint.png"), b"png").expect("write");
        let loose = dir.path().join("extra.bin");
        fs::write(&loose, b"\0").expect("write");

        let files = collect_dropped(&[model_dir, loose]).expect("collect");
        let paths: Vec<_> = files.iter().map(|f| f.path()).collect();
        assert_eq!(paths, ["/car/car.gltf", "/car/tex/paint.png", "/extra.bin"]);
    }

    #[test]
    fn missing_path_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.glb");

        let err = collect_dropped(&[missing.clone()]).unwrap_err();
        let intake_err = err.downcast_ref::<IntakeError>().expect("typed error");
        assert_eq!(intake_err.kind(), ErrorKind::Read);
        match intake_err {
            IntakeError::Read { path, .. } => assert_eq!(path, &missing.display().to_string()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_disk_file_fails_its_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = DiskFile::new("/gone.glb", dir.path().join("gone.glb"));
        let err = pollster::block_on(file.read()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn disk_file_reads_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.glb");
        fs::write(&path, b"glTF").expect("write");
        let file = DiskFile::new("/a.glb", &path);
        let data = pollster::block_on(file.read()).expect("read");
        assert_eq!(&data[..], b"glTF");
    }
}
