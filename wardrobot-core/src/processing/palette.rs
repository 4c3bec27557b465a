use image::imageops::FilterType;
use tracing::debug;

use wardrobot_common::models::{ColorSample, Palette};

/// Clustering input is downsampled to this edge length, bounding k-means cost
/// independent of upload size. Fine detail is lost; dominant hues survive.
const SAMPLE_EDGE: u32 = 150;

/// Fixed Lloyd-iteration count. Convergence is visually settled well before
/// this on 150x150 inputs.
const KMEANS_ITERATIONS: usize = 10;

/// Extract the `k` dominant colors of an image, ranked descending by
/// frequency.
///
/// This stage is cosmetic and must never sink an upload: decode failures and
/// degenerate inputs yield a single plain-white entry instead of an error.
/// Output is deterministic for identical input.
pub fn extract_palette(bytes: &[u8], k: usize) -> Palette {
    let Ok(decoded) = image::load_from_memory(bytes) else {
        return vec![ColorSample::white()];
    };

    let small = decoded.resize_exact(SAMPLE_EDGE, SAMPLE_EDGE, FilterType::Triangle);
    let rgb = small.to_rgb8();

    let all_pixels: Vec<[u8; 3]> = rgb.pixels().map(|p| p.0).collect();
    if all_pixels.is_empty() || k == 0 {
        return vec![ColorSample::white()];
    }

    // Pure white and pure black are usually studio backdrop, not garment.
    // If the filter would remove everything, cluster the unfiltered set
    // instead; clustering must never run on an empty set.
    let filtered: Vec<[u8; 3]> = all_pixels
        .iter()
        .copied()
        .filter(|p| *p != [255, 255, 255] && *p != [0, 0, 0])
        .collect();
    let pixels = if filtered.is_empty() { &all_pixels } else { &filtered };

    let samples = kmeans_palette(pixels, k);
    debug!("palette: {} clusters from {} pixels", samples.len(), pixels.len());
    samples
}

/// K-means over RGB space with deterministic farthest-point seeding, so the
/// same image always produces the same palette.
fn kmeans_palette(pixels: &[[u8; 3]], k: usize) -> Palette {
    let k = k.min(pixels.len());
    let total = pixels.len();

    // Seed the first centroid with the first pixel, then repeatedly take the
    // pixel farthest from all chosen centroids (k-means++ without the
    // randomness). A stride keeps seeding cheap on large inputs.
    let mut centroids: Vec<[f32; 3]> = Vec::with_capacity(k);
    centroids.push(to_f32(pixels[0]));

    let stride = pixels.len() / 256 + 1;
    for _ in 1..k {
        let mut max_dist = 0.0f32;
        let mut best = pixels[0];
        for p in pixels.iter().step_by(stride) {
            let min_dist = centroids
                .iter()
                .map(|c| dist_sq(to_f32(*p), *c))
                .fold(f32::INFINITY, f32::min);
            if min_dist > max_dist {
                max_dist = min_dist;
                best = *p;
            }
        }
        centroids.push(to_f32(best));
    }

    let mut counts = vec![0usize; k];
    for _ in 0..KMEANS_ITERATIONS {
        let mut sums = vec![[0.0f64; 3]; k];
        counts.fill(0);

        for p in pixels {
            let nearest = nearest_centroid(to_f32(*p), &centroids);
            sums[nearest][0] += p[0] as f64;
            sums[nearest][1] += p[1] as f64;
            sums[nearest][2] += p[2] as f64;
            counts[nearest] += 1;
        }

        for (i, centroid) in centroids.iter_mut().enumerate() {
            if counts[i] > 0 {
                let n = counts[i] as f64;
                *centroid = [
                    (sums[i][0] / n) as f32,
                    (sums[i][1] / n) as f32,
                    (sums[i][2] / n) as f32,
                ];
            }
        }
    }

    let mut samples: Vec<ColorSample> = centroids
        .iter()
        .zip(&counts)
        .filter(|(_, count)| **count > 0)
        .map(|(c, count)| {
            let rgb = [
                c[0].round().clamp(0.0, 255.0) as u8,
                c[1].round().clamp(0.0, 255.0) as u8,
                c[2].round().clamp(0.0, 255.0) as u8,
            ];
            ColorSample::new(rgb, *count as f32 / total as f32)
        })
        .collect();

    samples.sort_by(|a, b| b.frequency.partial_cmp(&a.frequency).unwrap());
    samples
}

fn to_f32(p: [u8; 3]) -> [f32; 3] {
    [p[0] as f32, p[1] as f32, p[2] as f32]
}

fn dist_sq(a: [f32; 3], b: [f32; 3]) -> f32 {
    let (dr, dg, db) = (a[0] - b[0], a[1] - b[1], a[2] - b[2]);
    dr * dr + dg * dg + db * db
}

fn nearest_centroid(p: [f32; 3], centroids: &[[f32; 3]]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, dist_sq(p, *c)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0)
}
