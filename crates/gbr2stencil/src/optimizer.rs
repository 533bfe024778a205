use log::debug;
use rand::Rng;

use crate::types::Point;

/// Default restart cap. Each restart costs O(n^2).
pub const MAX_RESTARTS: usize = 1000;

/// Total length of an open path visiting `points` in order.
pub fn tour_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Orders the hits of one drill bit with a nearest-neighbour heuristic,
/// restarted from many start points, keeping the shortest open path found.
/// Exact TSP is not attempted.
#[derive(Debug, Clone, Copy)]
pub struct PathOptimizer {
    max_restarts: usize,
}

impl Default for PathOptimizer {
    fn default() -> Self {
        Self::new(MAX_RESTARTS)
    }
}

impl PathOptimizer {
    pub fn new(max_restarts: usize) -> Self {
        Self {
            max_restarts: max_restarts.max(1),
        }
    }

    /// Return `positions` reordered for a short drilling path.
    ///
    /// When there are no more points than restarts, every point is tried once
    /// as the start and `rng` is never consulted. Otherwise start points are
    /// drawn from `rng`. The input order is the initial best, so the result is
    /// never longer than it.
    pub fn optimize<R: Rng + ?Sized>(&self, positions: &[Point], rng: &mut R) -> Vec<Point> {
        let n = positions.len();
        if n <= 2 {
            return positions.to_vec();
        }

        let mut best = positions.to_vec();
        let mut best_len = tour_length(&best);
        let initial_len = best_len;

        let exhaustive = n <= self.max_restarts;
        let restarts = n.min(self.max_restarts);
        let mut tour = Vec::with_capacity(n);

        for iteration in 0..restarts {
            let start = if exhaustive {
                iteration
            } else {
                rng.gen_range(0..n)
            };

            tour.clear();
            tour.extend_from_slice(positions);
            tour.swap(0, start);

            let len = nearest_neighbour(&mut tour);
            if len < best_len {
                best_len = len;
                std::mem::swap(&mut best, &mut tour);
            }
        }

        debug!(
            "optimized {n} hits over {restarts} restarts: {initial_len:.2} mm -> {best_len:.2} mm"
        );
        best
    }
}

/// Greedily reorder `tour` in place from its first point. Returns the path length.
fn nearest_neighbour(tour: &mut [Point]) -> f64 {
    let mut total = 0.0;
    for i in 0..tour.len().saturating_sub(1) {
        let current = tour[i];
        let mut nearest = i + 1;
        let mut min_dist = current.distance_squared(&tour[nearest]);
        for (j, candidate) in tour.iter().enumerate().skip(i + 2) {
            let dist = current.distance_squared(candidate);
            if dist < min_dist {
                min_dist = dist;
                nearest = j;
            }
        }
        tour.swap(i + 1, nearest);
        total += min_dist.sqrt();
    }
    total
}
