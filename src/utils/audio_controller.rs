use crate::utils::mediaplay::{load_clip, AudioPlayer};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;

pub enum AudioCommand {
    Play(PathBuf),
    Stop,
    Shutdown,
}

/// Handle to the audio thread. The rodio output stream is not `Send`, so the
/// device is opened and used only on that thread; the UI just sends commands.
pub struct AudioController {
    command_tx: Sender<AudioCommand>,
    worker: Option<JoinHandle<()>>,
}

impl AudioController {
    pub fn new() -> Self {
        let (command_tx, command_rx): (Sender<AudioCommand>, Receiver<AudioCommand>) = channel();

        let worker = std::thread::spawn(move || {
            let mut player: Option<AudioPlayer> = None;

            while let Ok(cmd) = command_rx.recv() {
                match cmd {
                    AudioCommand::Play(path) => {
                        log::info!("[AudioController] Playing {}", path.display());

                        let clip = match load_clip(&path) {
                            Ok(c) => c,
                            Err(e) => {
                                log::error!("[AudioController] Error loading audio: {}", e);
                                continue;
                            }
                        };

                        // Open the device lazily so a machine without audio still runs the app
                        if player.is_none() {
                            match AudioPlayer::new() {
                                Ok(p) => player = Some(p),
                                Err(e) => {
                                    log::error!("[AudioController] No audio output available: {}", e);
                                    continue;
                                }
                            }
                        }

                        if let Some(p) = player.as_mut() {
                            if let Err(e) = p.play(clip) {
                                log::error!("[AudioController] Playback failed: {}", e);
                            }
                        }
                    }
                    AudioCommand::Stop => {
                        log::debug!("[AudioController] Received Stop command");
                        if let Some(p) = player.as_mut() {
                            p.stop();
                        }
                    }
                    AudioCommand::Shutdown => break,
                }
            }

            if let Some(mut p) = player.take() {
                p.stop();
            }
            log::debug!("[AudioController] Audio thread exited");
        });

        Self {
            command_tx,
            worker: Some(worker),
        }
    }

    pub fn play(&self, path: PathBuf) {
        if self.command_tx.send(AudioCommand::Play(path)).is_err() {
            log::warn!("[AudioController] Audio thread is gone, dropping play request");
        }
    }

    pub fn stop(&self) {
        let _ = self.command_tx.send(AudioCommand::Stop);
    }

    /// Stop playback and join the audio thread
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("[AudioController] Audio thread panicked");
            }
        }
    }
}

impl Drop for AudioController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
