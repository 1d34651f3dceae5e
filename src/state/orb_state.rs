use crate::constants::*;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrbKind {
    Blue,
    Red,
}

impl OrbKind {
    /// Draw order: later entries are painted and hit-tested on top
    pub const ALL: [OrbKind; 2] = [OrbKind::Blue, OrbKind::Red];

    pub fn name(&self) -> &'static str {
        match self {
            OrbKind::Blue => "blue",
            OrbKind::Red => "red",
        }
    }

    pub fn image_file(&self) -> &'static str {
        match self {
            OrbKind::Blue => BLUE_ORB_FILE,
            OrbKind::Red => RED_ORB_FILE,
        }
    }

    /// Sound category folder under `resources/sounds`
    pub fn sound_folder(&self) -> &'static str {
        match self {
            OrbKind::Blue => BLUE_SOUND_FOLDER,
            OrbKind::Red => RED_SOUND_FOLDER,
        }
    }

    /// Top-left corner on the canvas
    pub fn canvas_offset(&self) -> (f32, f32) {
        match self {
            OrbKind::Blue => BLUE_ORB_OFFSET,
            OrbKind::Red => RED_ORB_OFFSET,
        }
    }

    pub fn sound_dir(&self, sounds_root: &Path) -> PathBuf {
        sounds_root.join(self.sound_folder())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressEdge {
    Pressed,
    Released,
    /// Press and release landed in the same frame
    Tapped,
    Unchanged,
}

impl PressEdge {
    /// Whether this edge starts a new press
    pub fn fires(self) -> bool {
        matches!(self, PressEdge::Pressed | PressEdge::Tapped)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbState {
    pub kind: OrbKind,
    pub pressed: bool,
}

impl OrbState {
    pub fn new(kind: OrbKind) -> Self {
        Self {
            kind,
            pressed: false,
        }
    }

    /// Feed the per-frame pointer state: `down` is the button held on this orb
    /// at the end of the frame, `clicked` a completed click during the frame.
    /// A click whose press was already seen as held does not fire again.
    pub fn update_pressed(&mut self, down: bool, clicked: bool) -> PressEdge {
        match (self.pressed, down) {
            (false, true) => {
                self.pressed = true;
                PressEdge::Pressed
            }
            (true, false) => {
                self.pressed = false;
                PressEdge::Released
            }
            (false, false) if clicked => PressEdge::Tapped,
            _ => PressEdge::Unchanged,
        }
    }

    /// Drawn edge length: shrunk while held
    pub fn display_size(&self) -> f32 {
        let full = ORB_SIZE_PX as f32;
        if self.pressed {
            (full * ORB_PRESS_SCALE).round()
        } else {
            full
        }
    }
}
