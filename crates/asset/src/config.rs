//! Options forwarded to the renderer/exporter collaborator.

/// Rendering and export hints. Only `path_prefix` is interpreted here; the
/// rest is passed through untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderHints {
    pub types: bool,
    pub shadows: bool,
    pub instance: bool,
    pub instance_all: bool,
    pub verbose: bool,
    pub keep_names: bool,
    pub keep_groups: bool,
    pub meta: bool,
    /// Decimal digits kept when numbers are written out.
    pub precision: u8,
    /// Directory prepended to the entry path when looking it up.
    pub path_prefix: String,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            types: false,
            shadows: true,
            instance: false,
            instance_all: false,
            verbose: false,
            keep_names: false,
            keep_groups: false,
            meta: false,
            precision: 3,
            path_prefix: String::new(),
        }
    }
}

impl RenderHints {
    /// Buffer Set key of the entry asset once the path prefix is applied.
    pub fn entry_key(&self, entry: &str) -> String {
        let prefix = self.path_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            entry.to_owned()
        } else {
            format!("{prefix}/{entry}")
        }
    }
}
