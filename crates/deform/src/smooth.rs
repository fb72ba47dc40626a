//! HC-filter Laplacian smoothing.
//!
//! Plain Laplacian smoothing shrinks a mesh toward its centroid; the HC
//! variant (Vollmer, Mencl, Mueller) pushes each averaged vertex back along a
//! correction vector derived from how far the average drifted from the
//! original position, which largely preserves volume over repeated passes.
//!
//! ## Algorithm, per pass
//!
//! 1. `p[i]` = uniform average of the 1-ring neighbor positions of vertex `i`
//! 2. `b[i] = p[i] - (beta * original[i] + (1 - beta) * prev[i])` where
//!    `prev` is the position coming out of the previous pass
//! 3. the result pulls `p[i]` back by the correction, averaged between the
//!    vertex and its 1-ring, blended with the pass input by `|intensity|`
//!
//! Adjacency is accumulated strictly in triangle index order so the result is
//! deterministic for identical inputs. There is no randomness anywhere.

use glam::Vec3;

/// Blend weight between the original and previous-pass positions in the
/// correction term.
pub const DEFAULT_BETA: f32 = 0.5;

// Weight of a vertex's own correction against its 1-ring average in the
// pull-back step. Neighbor corrections alone overshoot at sharp peaks.
const CORRECTION_SELF_WEIGHT: f32 = 0.5;

/// Number of relaxation passes run by [`hc_smooth`].
pub const DEFAULT_SMOOTH_PASSES: usize = 2;

/// Relax vertex positions with the HC filter.
///
/// `intensity` is taken as `|intensity|` and caps at 1.0; zero intensity
/// returns the input unchanged. Isolated vertices (no incident triangle)
/// pass through untouched.
pub fn hc_smooth(vertices: &[Vec3], triangles: &[u32], beta: f32, intensity: f32) -> Vec<Vec3> {
    hc_smooth_passes(vertices, triangles, beta, intensity, DEFAULT_SMOOTH_PASSES)
}

/// [`hc_smooth`] with an explicit pass count.
pub fn hc_smooth_passes(
    vertices: &[Vec3],
    triangles: &[u32],
    beta: f32,
    intensity: f32,
    passes: usize,
) -> Vec<Vec3> {
    let intensity = intensity.abs().min(1.0);
    if intensity == 0.0 || vertices.is_empty() {
        return vertices.to_vec();
    }

    let counts = neighbor_counts(vertices.len(), triangles);
    let mut current = vertices.to_vec();

    for _ in 0..passes {
        // 1-ring uniform averages of the current positions. A neighbor
        // shared by two triangles counts twice on both sides, which keeps
        // the weighting symmetric.
        let averages = neighbor_averages(&current, triangles, &counts);

        // Correction vectors: how far each average drifted from the blend
        // of original and previous-pass position.
        let corrections: Vec<Vec3> = (0..current.len())
            .map(|i| averages[i] - (beta * vertices[i] + (1.0 - beta) * current[i]))
            .collect();

        // Neighbor-averaged correction pulls each vertex back toward where
        // the original surface was, instead of letting the Laplacian shrink
        // it.
        let correction_averages = neighbor_averages(&corrections, triangles, &counts);

        for i in 0..current.len() {
            if counts[i] == 0 {
                continue;
            }
            let correction = CORRECTION_SELF_WEIGHT * corrections[i]
                + (1.0 - CORRECTION_SELF_WEIGHT) * correction_averages[i];
            current[i] = current[i].lerp(averages[i] - correction, intensity);
        }
    }

    current
}

fn neighbor_counts(vertex_count: usize, triangles: &[u32]) -> Vec<u32> {
    let mut counts = vec![0u32; vertex_count];
    for tri in triangles.chunks_exact(3) {
        counts[tri[0] as usize] += 2;
        counts[tri[1] as usize] += 2;
        counts[tri[2] as usize] += 2;
    }
    counts
}

/// Uniform 1-ring average of `values` over the adjacency implied by
/// `triangles`. Vertices with no neighbors keep their own value.
/// Accumulation order is triangle index order.
fn neighbor_averages(values: &[Vec3], triangles: &[u32], counts: &[u32]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; values.len()];

    for tri in triangles.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        sums[a] += values[b] + values[c];
        sums[b] += values[c] + values[a];
        sums[c] += values[a] + values[b];
    }

    sums.iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (&sum, &count))| {
            if count == 0 {
                values[i]
            } else {
                sum / count as f32
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Pyramid: four base corners and an apex poking up.
    fn pyramid() -> (Vec<Vec3>, Vec<u32>) {
        let vertices = vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.5, 0.0),
        ];
        let triangles = vec![
            0, 1, 4, //
            1, 2, 4, //
            2, 3, 4, //
            3, 0, 4, //
            0, 2, 1, //
            0, 3, 2,
        ];
        (vertices, triangles)
    }

    #[test]
    fn test_zero_intensity_is_identity() {
        let (vertices, triangles) = pyramid();
        let result = hc_smooth(&vertices, &triangles, DEFAULT_BETA, 0.0);
        assert_eq!(result, vertices);
    }

    #[test]
    fn test_intensity_is_absolute() {
        let (vertices, triangles) = pyramid();
        let pos = hc_smooth(&vertices, &triangles, DEFAULT_BETA, 0.5);
        let neg = hc_smooth(&vertices, &triangles, DEFAULT_BETA, -0.5);
        assert_eq!(pos, neg);
    }

    #[test]
    fn test_smoothing_relaxes_the_apex() {
        let (vertices, triangles) = pyramid();
        let result = hc_smooth(&vertices, &triangles, DEFAULT_BETA, 1.0);
        // The apex must come down toward its neighbors, not stay put
        assert!(result[4].y < vertices[4].y);
        // But the HC correction must not collapse it to the base plane
        assert!(result[4].y > 0.0);
    }

    #[test]
    fn test_shrinks_less_than_plain_laplacian() {
        let (vertices, triangles) = pyramid();
        let hc = hc_smooth_passes(&vertices, &triangles, DEFAULT_BETA, 1.0, 1);

        // Plain Laplacian for comparison: every vertex straight to its
        // neighbor average.
        let counts = neighbor_counts(vertices.len(), &triangles);
        let plain = neighbor_averages(&vertices, &triangles, &counts);

        assert!(hc[4].y > plain[4].y);
    }

    #[test]
    fn test_deterministic() {
        let (vertices, triangles) = pyramid();
        let a = hc_smooth(&vertices, &triangles, DEFAULT_BETA, 0.7);
        let b = hc_smooth(&vertices, &triangles, DEFAULT_BETA, 0.7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_isolated_vertex_untouched() {
        let (mut vertices, triangles) = pyramid();
        vertices.push(Vec3::new(10.0, 10.0, 10.0));

        let result = hc_smooth(&vertices, &triangles, DEFAULT_BETA, 1.0);
        assert_eq!(result[5], Vec3::new(10.0, 10.0, 10.0));
    }
}
