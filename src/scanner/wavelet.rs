//! Haar wavelet hash (wHash).
//!
//! The image is reduced to a `hash_size × hash_size` luma grid with Lanczos3.
//! A full Haar decomposition is taken and its coarsest approximation band is
//! zeroed, which removes the overall brightness. After reconstruction every
//! cell is compared with the grid median; cells above it set their bit.
//! Bits are emitted row by row.

use image::imageops::{self, FilterType};
use image::DynamicImage;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Compute the `hash_size²` bits of the Haar wavelet hash of `img`.
#[must_use]
pub fn haar_wavelet_hash(img: &DynamicImage, hash_size: u32) -> Vec<bool> {
    let side = hash_size as usize;
    let gray = imageops::resize(&img.to_luma8(), hash_size, hash_size, FilterType::Lanczos3);
    let mut grid: Vec<f64> = gray.pixels().map(|p| f64::from(p.0[0]) / 255.0).collect();

    remove_approximation(&mut grid, side);

    let median = median(&grid);
    grid.iter().map(|&v| v > median).collect()
}

/// Decompose `grid` as far as its side stays even, zero the last
/// approximation block and reconstruct in place.
fn remove_approximation(grid: &mut [f64], side: usize) {
    let mut sizes = Vec::new();
    let mut size = side;
    while size >= 2 && size % 2 == 0 {
        forward_level(grid, side, size);
        sizes.push(size);
        size /= 2;
    }

    for row in 0..size {
        grid[row * side..row * side + size].fill(0.0);
    }

    for &size in sizes.iter().rev() {
        inverse_level(grid, side, size);
    }
}

/// One 2D analysis step on the top-left `size × size` block.
fn forward_level(grid: &mut [f64], stride: usize, size: usize) {
    let half = size / 2;
    let mut line = vec![0.0; size];

    for row in 0..size {
        let base = row * stride;
        for i in 0..half {
            let (a, b) = (grid[base + 2 * i], grid[base + 2 * i + 1]);
            line[i] = (a + b) / SQRT_2;
            line[half + i] = (a - b) / SQRT_2;
        }
        grid[base..base + size].copy_from_slice(&line);
    }

    for col in 0..size {
        for i in 0..half {
            let (a, b) = (grid[2 * i * stride + col], grid[(2 * i + 1) * stride + col]);
            line[i] = (a + b) / SQRT_2;
            line[half + i] = (a - b) / SQRT_2;
        }
        for (i, &v) in line.iter().enumerate() {
            grid[i * stride + col] = v;
        }
    }
}

/// Inverse of [`forward_level`].
fn inverse_level(grid: &mut [f64], stride: usize, size: usize) {
    let half = size / 2;
    let mut line = vec![0.0; size];

    for col in 0..size {
        for i in 0..half {
            let (s, d) = (grid[i * stride + col], grid[(half + i) * stride + col]);
            line[2 * i] = (s + d) / SQRT_2;
            line[2 * i + 1] = (s - d) / SQRT_2;
        }
        for (i, &v) in line.iter().enumerate() {
            grid[i * stride + col] = v;
        }
    }

    for row in 0..size {
        let base = row * stride;
        for i in 0..half {
            let (s, d) = (grid[base + i], grid[base + half + i]);
            line[2 * i] = (s + d) / SQRT_2;
            line[2 * i + 1] = (s - d) / SQRT_2;
        }
        grid[base..base + size].copy_from_slice(&line);
    }
}

/// Median with the mean of the two middle values for even counts.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
