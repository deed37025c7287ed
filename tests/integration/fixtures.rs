use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// A deterministic image with horizontal and vertical structure.
pub fn pattern_image(width: u32, height: u32, seed: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let band = ((x * 4 / width.max(1)) + seed) % 2 == 0;
        let shade = ((y * 255) / height.max(1)) as u8;
        if band {
            Rgb([shade, 255 - shade, 40])
        } else {
            Rgb([20, shade / 2, 255 - shade])
        }
    })
}

/// Save `img` as PNG at `dir/name`.
pub fn save_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}

/// Byte-identical copy of `src` at `dir/name`.
pub fn copy_file(src: &Path, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::copy(src, &path).unwrap();
    path
}

/// A file that no decoder accepts.
pub fn write_text(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "these are notes, not pixels\n").unwrap();
    path
}

/// An empty config file so tests never pick up the user's config.
pub fn empty_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, "").unwrap();
    path
}
