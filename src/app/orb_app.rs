use eframe::egui;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::constants::*;
use crate::services::{CounterSync, SyncSettings, SyncTrigger};
use crate::state::{CounterState, OrbKind, OrbState};
use crate::utils::AudioController;

/// Decoded orb images, loaded before the window opens
pub struct OrbImages {
    pub blue: egui::ColorImage,
    pub red: egui::ColorImage,
}

struct OrbSlot {
    state: OrbState,
    texture: egui::TextureHandle,
}

pub struct OrbApp {
    counter: CounterState,
    sync: CounterSync,
    audio: AudioController,
    orbs: Vec<OrbSlot>,
    sounds_dir: PathBuf,
    is_shutting_down: bool,
}

/// What one orb press did
#[derive(Debug, PartialEq)]
pub struct PressEffect {
    pub sound: Option<PathBuf>,
    pub sync_seq: Option<u64>,
}

/// One press = one sound pick from the orb's category + one sync call
pub fn handle_orb_press<R: Rng + ?Sized>(
    kind: OrbKind,
    sounds_dir: &Path,
    sync: &mut CounterSync,
    audio: &AudioController,
    rng: &mut R,
) -> PressEffect {
    let sound = crate::utils::sound_picker::pick_random_sound(&kind.sound_dir(sounds_dir), rng);
    if let Some(path) = &sound {
        audio.play(path.clone());
    }

    let sync_seq = sync.request(SyncTrigger::Click(kind));
    PressEffect { sound, sync_seq }
}

fn orb_rect(origin: egui::Pos2, kind: OrbKind) -> egui::Rect {
    let (x, y) = kind.canvas_offset();
    egui::Rect::from_min_size(origin + egui::vec2(x, y), egui::Vec2::splat(ORB_SIZE_PX as f32))
}

/// Hit-test every orb against this frame's pointer input and return the ones
/// that started a press. Later orbs are registered last, so they win where
/// they overlap.
fn detect_presses<'a>(
    ui: &mut egui::Ui,
    origin: egui::Pos2,
    orbs: impl Iterator<Item = &'a mut OrbState>,
) -> Vec<OrbKind> {
    let primary_down = ui.input(|i| i.pointer.primary_down());
    let mut pressed = Vec::new();

    for orb in orbs {
        let kind = orb.kind;
        let response = ui.interact(orb_rect(origin, kind), ui.id().with(kind.name()), egui::Sense::click());

        // A quick tap can press and release inside one frame; only `clicked` sees it
        let down = primary_down && response.is_pointer_button_down_on();
        if orb.update_pressed(down, response.clicked()).fires() {
            pressed.push(kind);
        }
    }

    pressed
}

impl OrbApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig, images: OrbImages) -> Self {
        let ctx = cc.egui_ctx.clone();
        let mut sync = CounterSync::start(
            SyncSettings::from(config),
            Arc::new(move || ctx.request_repaint()),
        );
        sync.request(SyncTrigger::Startup);

        let OrbImages { blue, red } = images;
        let orbs = OrbKind::ALL
            .iter()
            .map(|&kind| {
                let image = match kind {
                    OrbKind::Blue => blue.clone(),
                    OrbKind::Red => red.clone(),
                };
                OrbSlot {
                    state: OrbState::new(kind),
                    texture: cc.egui_ctx.load_texture(
                        format!("orb-{}", kind.name()),
                        image,
                        egui::TextureOptions::LINEAR,
                    ),
                }
            })
            .collect();

        log::info!(
            "[OrbApp] Ready - syncing every {:?}, sounds from {}",
            config.sync_interval,
            config.sounds_dir().display()
        );

        Self {
            counter: CounterState::new(config.sync_interval, Instant::now()),
            sync,
            audio: AudioController::new(),
            orbs,
            sounds_dir: config.sounds_dir(),
            is_shutting_down: false,
        }
    }

    /// Apply every finished sync call, oldest arrival first
    fn check_sync_results(&mut self) {
        while let Some(outcome) = self.sync.try_recv() {
            if self.counter.apply(&outcome) {
                log::debug!(
                    "[OrbApp] Counter {} (sync #{}, {})",
                    self.counter.value(),
                    outcome.seq,
                    outcome.trigger
                );
            }
        }
    }

    fn press(&mut self, kind: OrbKind) {
        let effect = handle_orb_press(
            kind,
            &self.sounds_dir,
            &mut self.sync,
            &self.audio,
            &mut rand::rng(),
        );
        match (&effect.sound, effect.sync_seq) {
            (Some(sound), Some(seq)) => {
                log::debug!("[OrbApp] {} orb: playing {}, sync #{}", kind.name(), sound.display(), seq)
            }
            (None, seq) => log::debug!("[OrbApp] {} orb: no sound available, sync {:?}", kind.name(), seq),
            (Some(sound), None) => {
                log::debug!("[OrbApp] {} orb: playing {}, sync not issued", kind.name(), sound.display())
            }
        }
    }

    /// Stop audio and cancel in-flight sync calls before the window closes
    fn cleanup(&mut self) {
        log::info!("[Shutdown] Cancelling sync calls...");
        self.sync.shutdown();
        log::info!("[Shutdown] Stopping audio...");
        self.audio.stop();
        self.audio.shutdown();
        log::info!("[Shutdown] Cleanup complete, closing application...");
    }

    fn render(&mut self, ui: &mut egui::Ui) -> Vec<OrbKind> {
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(self.counter.label())
                    .size(COUNTER_FONT_SIZE)
                    .color(egui::Color32::BLACK),
            );
        });

        let (canvas, _) = ui.allocate_exact_size(egui::Vec2::splat(CANVAS_SIZE), egui::Sense::hover());
        let pressed = detect_presses(ui, canvas.min, self.orbs.iter_mut().map(|slot| &mut slot.state));

        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        for slot in &self.orbs {
            // Shrink toward the top-left corner while held
            let draw_rect = egui::Rect::from_min_size(
                orb_rect(canvas.min, slot.state.kind).min,
                egui::Vec2::splat(slot.state.display_size()),
            );
            ui.painter()
                .image(slot.texture.id(), draw_rect, uv, egui::Color32::WHITE);
        }

        pressed
    }
}

impl eframe::App for OrbApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) && !self.is_shutting_down {
            self.is_shutting_down = true;
            self.cleanup();
        }

        self.check_sync_results();

        if !self.is_shutting_down {
            let now = Instant::now();
            if self.counter.poll_timer(now) {
                self.sync.request(SyncTrigger::Timer);
            }
            ctx.request_repaint_after(self.counter.time_until_tick(now));
        }

        let background = egui::Color32::from_gray(BACKGROUND_GRAY);
        let pressed = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(background))
            .show(ctx, |ui| self.render(ui))
            .inner;

        if !self.is_shutting_down {
            for kind in pressed {
                self.press(kind);
            }
        }
    }
}
