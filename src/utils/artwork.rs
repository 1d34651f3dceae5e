use crate::utils::errors::AssetError;
use eframe::egui;
use image::imageops::FilterType;
use std::path::Path;

/// Load an orb image and scale it to `size`×`size` for display.
/// A missing or undecodable file is fatal for the caller.
pub fn load_orb_image(path: &Path, size: u32) -> Result<egui::ColorImage, AssetError> {
    let img = image::open(path).map_err(|e| AssetError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let resized = image::imageops::resize(&img.to_rgba8(), size, size, FilterType::Lanczos3);
    let dims = [resized.width() as usize, resized.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(dims, resized.as_raw()))
}

/// Window icon from `favicon.png`, or a drawn orb when the file is unavailable
pub fn load_icon(path: &Path) -> egui::IconData {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            egui::IconData {
                rgba: rgba.into_raw(),
                width,
                height,
            }
        }
        Err(e) => {
            log::debug!("[Artwork] No icon at {} ({}), drawing fallback", path.display(), e);
            fallback_icon()
        }
    }
}

/// Simple shaded red orb on a transparent background
fn fallback_icon() -> egui::IconData {
    let size = 64usize;
    let mut pixels = vec![0u8; size * size * 4];
    let center = size as f32 / 2.0;
    let radius = center - 2.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > radius {
                continue;
            }

            // Highlight toward the upper left
            let hx = dx + radius * 0.35;
            let hy = dy + radius * 0.35;
            let highlight = (1.0 - (hx * hx + hy * hy).sqrt() / (radius * 1.4)).clamp(0.0, 1.0);
            let shade = 0.55 + 0.45 * (1.0 - dist / radius);

            let idx = (y * size + x) * 4;
            pixels[idx] = (255.0 * shade).min(255.0) as u8; // R
            pixels[idx + 1] = (200.0 * highlight * highlight) as u8; // G
            pixels[idx + 2] = (200.0 * highlight * highlight) as u8; // B
            pixels[idx + 3] = 255; // A
        }
    }

    egui::IconData {
        rgba: pixels,
        width: size as u32,
        height: size as u32,
    }
}
