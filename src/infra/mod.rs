pub mod recording_loader;

pub use recording_loader::{LoadedModule, RecordingLoader};
