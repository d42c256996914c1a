//! Pre-processing blur applied once before subdivision

use crate::buffer::PixelBuffer;

/// Blur capability used by [`Pixelator`](crate::pixelate::Pixelator).
///
/// Implementations must return a buffer with the same dimensions and channel
/// layout as `source`.
pub trait Filter: Send + Sync {
    fn blur(&self, source: &PixelBuffer, radius: f32) -> PixelBuffer;
}

/// Separable Gaussian blur with `sigma = radius`.
///
/// The kernel spans `ceil(3 * sigma)` pixels on each side. Samples past the
/// image edge repeat the nearest edge pixel, and results are rounded to the
/// nearest integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianBlur;

impl Filter for GaussianBlur {
    fn blur(&self, source: &PixelBuffer, radius: f32) -> PixelBuffer {
        if radius <= 0.0 || source.width() == 0 || source.height() == 0 {
            return source.clone();
        }
        let kernel = gaussian_kernel(radius);
        let horizontal = convolve(source, &kernel, Axis::Horizontal);
        convolve(&horizontal, &kernel, Axis::Vertical)
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Normalized 1D Gaussian kernel of length `2 * ceil(3 * sigma) + 1`.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let half = (3.0 * sigma).ceil() as i32;
    let sigma2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> =
        (-half..=half).map(|d| (-((d * d) as f32) / sigma2).exp()).collect();

    // Normalize
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

fn convolve(source: &PixelBuffer, kernel: &[f32], axis: Axis) -> PixelBuffer {
    let (width, height) = source.dimensions();
    let channels = source.channels().count();
    let half = (kernel.len() / 2) as i64;

    PixelBuffer::from_fn(width, height, source.channels(), |x, y| {
        let mut acc = [0.0f32; 3];
        for (k, &weight) in kernel.iter().enumerate() {
            let offset = k as i64 - half;
            let (sx, sy) = match axis {
                Axis::Horizontal => ((x as i64 + offset).clamp(0, width as i64 - 1) as u32, y),
                Axis::Vertical => (x, (y as i64 + offset).clamp(0, height as i64 - 1) as u32),
            };
            for (a, &c) in acc.iter_mut().zip(source.pixel(sx, sy)) {
                *a += c as f32 * weight;
            }
        }
        let mut out = [0u8; 3];
        for (o, a) in out.iter_mut().zip(acc).take(channels) {
            *o = a.round().clamp(0.0, 255.0) as u8;
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    #[test]
    fn test_gaussian_kernel_generation() {
        let kernel = gaussian_kernel(1.0);
        assert_eq!(kernel.len(), 7);

        // Sum should be 1.0 (normalized)
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 0.001);

        // Center should be highest weight, symmetric
        assert!(kernel[3] > kernel[2]);
        assert!((kernel[0] - kernel[6]).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_radius_kernel() {
        assert_eq!(gaussian_kernel(0.5).len(), 5);
        assert_eq!(gaussian_kernel(2.0).len(), 13);
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let buf = PixelBuffer::from_fn(5, 4, Channels::Rgb, |x, y| [(x * 40) as u8, (y * 60) as u8, 7]);
        assert_eq!(GaussianBlur.blur(&buf, 0.0), buf);
    }

    #[test]
    fn test_uniform_image_is_unchanged() {
        let buf = PixelBuffer::from_fn(9, 6, Channels::Rgb, |_, _| [12, 130, 250]);
        assert_eq!(GaussianBlur.blur(&buf, 3.0), buf);
    }

    #[test]
    fn test_blur_softens_edge() {
        let buf =
            PixelBuffer::from_fn(10, 1, Channels::Gray, |x, _| if x < 5 { [0; 3] } else { [255; 3] });
        let blurred = GaussianBlur.blur(&buf, 1.0);
        assert_eq!(blurred.dimensions(), (10, 1));
        assert_eq!(blurred.channels(), Channels::Gray);
        let left = blurred.pixel(4, 0)[0];
        let right = blurred.pixel(5, 0)[0];
        assert!(left > 0 && left < 128, "left of edge: {}", left);
        assert!(right > 127 && right < 255, "right of edge: {}", right);
        assert_eq!(blurred.pixel(0, 0)[0], 0);
        assert_eq!(blurred.pixel(9, 0)[0], 255);
    }
}
