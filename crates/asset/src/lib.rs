//! Asset intake for the viewer.
//! Dropped files are read into a Buffer Set, zip archives are unpacked and
//! the first glTF/GLB becomes the entry handed to the scene loader.

pub mod archive;
pub mod buffers;
pub mod config;
pub mod intake;
pub mod loader;
pub mod paths;
pub mod resolve;
pub mod sample;

pub use buffers::BufferSet;
pub use config::RenderHints;
pub use intake::{DroppedFile, Intake, MemoryFile, ingest};
pub use loader::{GltfSceneLoader, Scene, SceneLoader, generate_scene};
pub use resolve::{HandleRegistry, ResourceScope};
