pub mod artwork;
pub mod audio_controller;
pub mod error_handling;
pub mod errors;
pub mod http;
pub mod mediaplay;
pub mod sound_picker;

// Re-export commonly used types
pub use audio_controller::AudioController;
