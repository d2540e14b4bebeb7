//! Path helpers for Buffer Set keys.
//!
//! Keys are relative, use forward slashes and never start with a slash.

use std::borrow::Cow;

/// Normalize a dropped or archived path into a Buffer Set key.
pub fn normalize(raw: &str) -> String {
    let slashed: Cow<'_, str> = if raw.contains('\\') {
        Cow::Owned(raw.replace('\\', "/"))
    } else {
        Cow::Borrowed(raw)
    };
    collapse(&slashed)
}

/// Drop empty and `.` segments and apply `..`, so equal paths compare equal.
fn collapse(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn has_extension(path: &str, ext: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(stem, found)| !stem.is_empty() && found.eq_ignore_ascii_case(ext))
}

pub fn is_glb(path: &str) -> bool {
    has_extension(path, "glb")
}

pub fn is_gltf(path: &str) -> bool {
    has_extension(path, "gltf")
}

/// `true` for files the scene loader can use as an entry point.
pub fn is_model(path: &str) -> bool {
    is_glb(path) || is_gltf(path)
}

pub fn is_zip(path: &str) -> bool {
    has_extension(path, "zip")
}

/// Directory part of `path`, including the trailing slash (`""` for top-level files).
pub fn base_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Resolve `uri` relative to `base` into a Buffer Set key.
pub fn join(base: &str, uri: &str) -> String {
    normalize(&format!("{base}{uri}"))
}
