//! Sample point distribution over the terrain footprint

use crate::config::Sampling;
use lowpoly_core::Point2;
use rand::Rng;
use std::f64::consts::{SQRT_2, TAU};

/// Neighbourhood radius, in grid cells, checked around a Poisson candidate.
/// With cells of `d / sqrt(2)` any point closer than `d` is at most two
/// cells away.
const NEIGHBOUR_CELLS: isize = 2;

/// Produce the point set for a `size_x` by `size_y` region.
pub fn sample_points<R: Rng + ?Sized>(
    size_x: f64,
    size_y: f64,
    sampling: &Sampling,
    rng: &mut R,
) -> Vec<Point2> {
    match *sampling {
        Sampling::Uniform { point_density } => uniform(size_x, size_y, point_density, rng),
        Sampling::Poisson {
            min_distance,
            rejection_samples,
        } => poisson_disc(size_x, size_y, min_distance, rejection_samples, rng),
    }
}

/// `count` independent uniform draws over `[0, size_x) x [0, size_y)`.
/// Duplicates are passed through untouched.
pub fn uniform<R: Rng + ?Sized>(size_x: f64, size_y: f64, count: u32, rng: &mut R) -> Vec<Point2> {
    if !(size_x > 0.0 && size_y > 0.0) {
        return Vec::new();
    }
    (0..count)
        .map(|_| Point2::new(rng.gen_range(0.0..size_x), rng.gen_range(0.0..size_y)))
        .collect()
}

/// Bridson's Poisson-disc sampling.
///
/// Every returned pair of points is at least `min_distance` apart and every
/// point lies in `[0, size_x) x [0, size_y)`. The number of points depends
/// on how densely the active list manages to pack the region.
pub fn poisson_disc<R: Rng + ?Sized>(
    size_x: f64,
    size_y: f64,
    min_distance: f64,
    rejection_samples: u32,
    rng: &mut R,
) -> Vec<Point2> {
    if !(size_x > 0.0 && size_y > 0.0 && min_distance > 0.0) {
        return Vec::new();
    }

    let first = Point2::new(rng.gen_range(0.0..size_x), rng.gen_range(0.0..size_y));
    // Nothing in the half-open region is a full diagonal away from `first`.
    if min_distance >= size_x.hypot(size_y) {
        return vec![first];
    }

    let mut grid = BackgroundGrid::new(size_x, size_y, min_distance / SQRT_2);
    let mut samples: Vec<Point2> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    grid.insert(first, 0);
    samples.push(first);
    active.push(0);

    let min_sq = min_distance * min_distance;

    while !active.is_empty() {
        let slot = rng.gen_range(0..active.len());
        let centre = samples[active[slot]];

        let mut accepted = false;
        for _ in 0..rejection_samples {
            let candidate = annulus_point(centre, min_distance, rng);
            if !candidate.is_finite()
                || candidate.x < 0.0
                || candidate.x >= size_x
                || candidate.y < 0.0
                || candidate.y >= size_y
            {
                continue;
            }
            if grid.has_neighbour_within(&samples, candidate, min_sq) {
                continue;
            }

            let index = samples.len();
            grid.insert(candidate, index);
            samples.push(candidate);
            active.push(index);
            accepted = true;
            break;
        }

        if !accepted {
            active.swap_remove(slot);
        }
    }

    samples
}

/// Uniform angle, radius in `[d, 2d)`.
fn annulus_point<R: Rng + ?Sized>(centre: Point2, min_distance: f64, rng: &mut R) -> Point2 {
    let angle = rng.gen::<f64>() * TAU;
    let radius = min_distance * (1.0 + rng.gen::<f64>());
    Point2::new(centre.x + angle.cos() * radius, centre.y + angle.sin() * radius)
}

/// Uniform grid mapping each placed point to exactly one cell.
struct BackgroundGrid {
    cell: f64,
    width: usize,
    height: usize,
    cells: Vec<Option<usize>>,
}

impl BackgroundGrid {
    fn new(size_x: f64, size_y: f64, cell: f64) -> Self {
        let width = (size_x / cell).ceil().max(1.0) as usize;
        let height = (size_y / cell).ceil().max(1.0) as usize;
        Self {
            cell,
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    fn cell_of(&self, p: Point2) -> (usize, usize) {
        let cx = ((p.x / self.cell).floor() as usize).min(self.width - 1);
        let cy = ((p.y / self.cell).floor() as usize).min(self.height - 1);
        (cx, cy)
    }

    fn insert(&mut self, p: Point2, index: usize) {
        let (cx, cy) = self.cell_of(p);
        self.cells[cy * self.width + cx] = Some(index);
    }

    fn has_neighbour_within(&self, samples: &[Point2], p: Point2, min_sq: f64) -> bool {
        let (cx, cy) = self.cell_of(p);
        let (cx, cy) = (cx as isize, cy as isize);

        for ny in (cy - NEIGHBOUR_CELLS)..=(cy + NEIGHBOUR_CELLS) {
            if ny < 0 || ny >= self.height as isize {
                continue;
            }
            for nx in (cx - NEIGHBOUR_CELLS)..=(cx + NEIGHBOUR_CELLS) {
                if nx < 0 || nx >= self.width as isize {
                    continue;
                }
                if let Some(i) = self.cells[ny as usize * self.width + nx as usize] {
                    if samples[i].distance_squared(&p) < min_sq {
                        return true;
                    }
                }
            }
        }
        false
    }
}
