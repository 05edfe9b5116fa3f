//! Download filenames and writing images to disk.

use std::path::{Path, PathBuf};

use crate::client::GeneratedImage;
use crate::error::ImageError;

/// Downloads are always written as JPEG.
const DOWNLOAD_EXTENSION: &str = "jpg";

/// Prompt characters kept in a download filename.
const PROMPT_CHARS: usize = 40;

/// Build the download filename for an image.
///
/// Takes the first 40 characters of the prompt, replaces everything that is
/// not an ASCII letter or digit with `_`, lower-cases it, and appends the
/// lower-cased style label and the `.jpg` extension.
#[must_use]
pub fn download_filename(prompt: &str, style: &str) -> String {
    let stem: String = prompt
        .chars()
        .take(PROMPT_CHARS)
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "generated".to_string() } else { stem };
    format!("{stem}_{}.{DOWNLOAD_EXTENSION}", style.to_lowercase())
}

/// Save `image` into `dir` under its download filename and return the path.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written or the image
/// cannot be converted to JPEG.
pub fn download(image: &GeneratedImage, prompt: &str, dir: &Path) -> Result<PathBuf, ImageError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(download_filename(prompt, &image.style));
    save_as_jpeg(&image.image.data, &image.image.mime_type, &path)?;
    tracing::debug!(path = %path.display(), style = %image.style, "image saved");
    Ok(path)
}

/// Write image bytes as JPEG, re-encoding anything that isn't JPEG already.
fn save_as_jpeg(data: &[u8], mime_type: &str, path: &Path) -> Result<(), ImageError> {
    if mime_type == "image/jpeg" {
        return std::fs::write(path, data).map_err(ImageError::Io);
    }

    let img = image::load_from_memory(data)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to decode {mime_type}: {e}")))?;
    // JPEG has no alpha channel.
    img.to_rgb8()
        .save_with_format(path, image::ImageFormat::Jpeg)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to save as jpeg: {e}")))
}
