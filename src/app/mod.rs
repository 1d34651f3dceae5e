pub mod orb_app;

pub use orb_app::{OrbApp, OrbImages};
