//! Application constants and configuration values

// === Window & Layout ===
pub const APP_WIDTH: f32 = 300.0;
pub const APP_HEIGHT: f32 = 300.0;
pub const CANVAS_SIZE: f32 = 300.0;
pub const ORB_SIZE_PX: u32 = 80;
pub const ORB_PRESS_SCALE: f32 = 0.9;
pub const COUNTER_FONT_SIZE: f32 = 16.0;
pub const BACKGROUND_GRAY: u8 = 190; // Tk "grey"

// Orb placement on the canvas (top-left corner)
pub const BLUE_ORB_OFFSET: (f32, f32) = (90.0, 90.0);
pub const RED_ORB_OFFSET: (f32, f32) = (130.0, 130.0);

// === Sound categories ===
pub const BLUE_SOUND_FOLDER: &str = "cmcsounds";
pub const RED_SOUND_FOLDER: &str = "gavinsounds";
pub const SOUND_EXTENSION: &str = "mp3";

// === Counter API ===
pub const COUNTER_URL: &str = "https://orborb.org/api/orbcounter";
pub const COUNTER_PROTOCOL_VERSION: u32 = 2;
pub const SYNC_INTERVAL_MILLIS: u64 = 500;
pub const REQUEST_TIMEOUT_MILLIS: u64 = 5000;
pub const SYNC_QUEUE_CAPACITY: usize = 64;
pub const MAX_IN_FLIGHT_SYNCS: usize = 8;
pub const WORKER_SHUTDOWN_GRACE_MILLIS: u64 = 250;

// === Resources ===
pub const RESOURCE_DIR: &str = "resources";
pub const RESOURCE_BASE_URL: &str = "https://raw.githubusercontent.com/NullRien/OrbOnTheGo/refs/heads/main";
pub const BLUE_ORB_FILE: &str = "orb-blue.png";
pub const RED_ORB_FILE: &str = "orb-red.png";
pub const FAVICON_FILE: &str = "favicon.png";
pub const SOUNDS_ARCHIVE_FILE: &str = "sounds.zip";
pub const SOUNDS_DIR: &str = "sounds";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 60;
