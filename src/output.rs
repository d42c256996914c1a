//! Image export and output path generation

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::buffer::PixelBuffer;
use crate::codec::{Codec, OutputFormat};
use crate::error::PixelateError;

/// Suffix appended to the input stem when no output file is named.
pub const OUTPUT_SUFFIX: &str = "_pixelated";

/// Encode `image` and write it to `path`.
///
/// The format is `format` if given, otherwise inferred from the extension of
/// `path`. Parent directories are created as needed.
///
/// # Returns
///
/// The format the file was written in.
pub fn save_image(
    image: &PixelBuffer,
    path: &Path,
    format: Option<OutputFormat>,
    quality: u8,
    codec: &dyn Codec,
) -> Result<OutputFormat, PixelateError> {
    let format = format
        .or_else(|| OutputFormat::from_path(path))
        .ok_or_else(|| PixelateError::UnsupportedFormat(path.to_path_buf()))?;

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let bytes = codec.encode(image, format, quality)?;
    std::fs::write(path, bytes)?;
    Ok(format)
}

/// Write `image` as JPEG to a fresh temporary file that outlives the process.
///
/// The caller owns the returned path and is responsible for removing it.
pub fn export_temp_jpeg(
    image: &PixelBuffer,
    quality: u8,
    codec: &dyn Codec,
) -> Result<PathBuf, PixelateError> {
    let bytes = codec.encode(image, OutputFormat::Jpeg, quality)?;
    let mut file = tempfile::Builder::new().prefix("blockpix-").suffix(".jpg").tempfile()?;
    file.write_all(&bytes)?;
    file.flush()?;
    let (_, path) = file.keep()?;
    Ok(path)
}

/// Generate the output path for one input image.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{dir}/{stem}_pixelated.{ext}` next to the input |
/// | `-o out.png` | `out.png` |
/// | `-o dir/` or existing directory | `dir/{stem}_pixelated.{ext}` |
/// | Several inputs with `-o out` | `out/{stem}_pixelated.{ext}` |
pub fn generate_output_path(
    input: &Path,
    output_arg: Option<&Path>,
    format: OutputFormat,
    is_batch: bool,
) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let file_name = format!("{}{}.{}", stem, OUTPUT_SUFFIX, format.extension());

    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir || is_batch {
                output.join(file_name)
            } else {
                output.to_path_buf()
            }
        }
        None => {
            let parent = input.parent().unwrap_or(Path::new(""));
            if parent.as_os_str().is_empty() {
                PathBuf::from(file_name)
            } else {
                parent.join(file_name)
            }
        }
    }
}
