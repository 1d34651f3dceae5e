use minimp3::{Decoder as Mp3Decoder, Error as Mp3Error, Frame};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::path::Path;
use std::time::Duration;

/// Fully decoded sound effect, interleaved 16-bit PCM
#[derive(Debug, Clone)]
pub struct DecodedClip {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl DecodedClip {
    pub fn duration(&self) -> Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        Duration::from_micros(frames * 1_000_000 / self.sample_rate as u64)
    }

    fn into_source(self) -> SamplesBuffer<i16> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples)
    }
}

/// Decode a whole MP3 file with minimp3. Sound effects are short, so the
/// clip is decoded up front instead of streamed.
pub fn decode_mp3(bytes: &[u8]) -> Result<DecodedClip, String> {
    let mut decoder = Mp3Decoder::new(bytes);
    let mut clip: Option<DecodedClip> = None;
    let mut skipped_frames = 0usize;

    loop {
        match decoder.next_frame() {
            Ok(Frame {
                data,
                sample_rate,
                channels,
                ..
            }) => {
                let (rate, ch) = (sample_rate.max(0) as u32, channels as u16);
                match clip.as_mut() {
                    None => {
                        clip = Some(DecodedClip {
                            channels: ch,
                            sample_rate: rate,
                            samples: data,
                        })
                    }
                    Some(c) if c.channels == ch && c.sample_rate == rate => c.samples.extend(data),
                    Some(_) => skipped_frames += 1,
                }
            }
            Err(Mp3Error::Eof) | Err(Mp3Error::InsufficientData) => break,
            Err(Mp3Error::SkippedData) => continue,
            Err(e) => return Err(format!("MP3 decode failed: {:?}", e)),
        }
    }

    if skipped_frames > 0 {
        log::debug!("[Audio] Dropped {} frames with a different format", skipped_frames);
    }

    match clip {
        Some(c) if !c.samples.is_empty() && c.channels > 0 && c.sample_rate > 0 => Ok(c),
        _ => Err("no MP3 frames found".to_string()),
    }
}

pub fn load_clip(path: &Path) -> Result<DecodedClip, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("read {}: {}", path.display(), e))?;
    decode_mp3(&bytes)
}

/// Owns the output device. Must live on the thread that created it.
pub struct AudioPlayer {
    sink: Option<Sink>,
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl AudioPlayer {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (_stream, stream_handle) = OutputStream::try_default()?;
        log::info!("[AudioPlayer] Output device opened");
        Ok(Self {
            sink: None,
            _stream,
            stream_handle,
        })
    }

    /// Replace whatever is playing with `clip` (single channel, like a music mixer)
    pub fn play(&mut self, clip: DecodedClip) -> Result<(), Box<dyn std::error::Error>> {
        self.stop();

        let duration = clip.duration();
        let sink = Sink::try_new(&self.stream_handle)?;
        sink.append(clip.into_source());
        self.sink = Some(sink);

        log::debug!("[AudioPlayer] Playing clip ({:?})", duration);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}
