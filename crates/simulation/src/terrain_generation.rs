//! Procedural terrain for a new city.
//!
//! Starts from all-grass and layers features in a fixed order: ocean border,
//! lakes, rivers, hill ranges, forests, beaches. Placement rolls come from a
//! ChaCha8 stream seeded with the terrain seed, and forest clusters are thinned
//! by an OpenSimplex moisture field, so one seed always yields one map.

use std::fmt;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Grass,
    Forest,
    Water,
    Ocean,
    Beach,
    Hill,
    Mountain,
}

impl Terrain {
    pub fn is_buildable(self) -> bool {
        matches!(self, Terrain::Grass | Terrain::Beach | Terrain::Hill)
    }

    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Ocean)
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Grass => "grass",
            Terrain::Forest => "forest",
            Terrain::Water => "water",
            Terrain::Ocean => "ocean",
            Terrain::Beach => "beach",
            Terrain::Hill => "hill",
            Terrain::Mountain => "mountain",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Moisture below this never grows forest.
const DRY_CUTOFF: f32 = -0.5;
const MOISTURE_FREQUENCY: f32 = 0.15;

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

struct TerrainMap {
    size: usize,
    cells: Vec<Terrain>,
}

impl TerrainMap {
    fn get(&self, x: usize, y: usize) -> Terrain {
        self.cells[y * self.size + x]
    }

    fn set(&mut self, x: usize, y: usize, terrain: Terrain) {
        self.cells[y * self.size + x] = terrain;
    }

    /// Cells of the square `[c - r, c + r]` that fall inside the map.
    fn square(&self, cx: i64, cy: i64, r: i64) -> impl Iterator<Item = (usize, usize, f32)> {
        let size = self.size as i64;
        (cx - r..=cx + r).flat_map(move |x| {
            (cy - r..=cy + r).filter_map(move |y| {
                if x < 0 || y < 0 || x >= size || y >= size {
                    return None;
                }
                let dist = (((x - cx) * (x - cx) + (y - cy) * (y - cy)) as f32).sqrt();
                Some((x as usize, y as usize, dist))
            })
        })
    }
}

/// Generate a `size * size` terrain grid, row-major (`y * size + x`).
pub fn generate_terrain(size: usize, seed: u64) -> Vec<Terrain> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut map = TerrainMap {
        size,
        cells: vec![Terrain::Grass; size * size],
    };
    if size == 0 {
        return map.cells;
    }

    add_ocean(&mut map, &mut rng);
    add_lakes(&mut map, &mut rng);
    add_rivers(&mut map, &mut rng);
    add_hills(&mut map, &mut rng);
    add_forests(&mut map, &mut rng, seed);
    add_beaches(&mut map, &mut rng);

    map.cells
}

/// An all-grass grid. Scenario tests build on this so placement never depends
/// on where lakes happened to land.
pub fn flat_terrain(size: usize) -> Vec<Terrain> {
    vec![Terrain::Grass; size * size]
}

fn add_ocean(map: &mut TerrainMap, rng: &mut ChaCha8Rng) {
    let size = map.size;
    let depth = size / 10;
    if depth == 0 {
        return;
    }
    for y in 0..size {
        for x in 0..size {
            let from_edge = x.min(y).min(size - 1 - x).min(size - 1 - y);
            let chance = (depth as f32 - from_edge as f32).max(0.0) / depth as f32;
            if rng.gen::<f32>() < chance {
                map.set(x, y, Terrain::Ocean);
            }
        }
    }
}

fn add_lakes(map: &mut TerrainMap, rng: &mut ChaCha8Rng) {
    let size = map.size as f32;
    for _ in 0..map.size / 16 {
        let cx = (rng.gen::<f32>() * size * 0.8 + size * 0.1) as i64;
        let cy = (rng.gen::<f32>() * size * 0.8 + size * 0.1) as i64;
        let radius = 3 + rng.gen_range(0..5);
        let cells: Vec<_> = map.square(cx, cy, radius).collect();
        for (x, y, dist) in cells {
            if dist < radius as f32 && map.get(x, y) != Terrain::Ocean && rng.gen::<f32>() < 0.8 {
                map.set(x, y, Terrain::Water);
            }
        }
    }
}

fn add_rivers(map: &mut TerrainMap, rng: &mut ChaCha8Rng) {
    let size = map.size as i64;
    for _ in 0..map.size / 20 {
        let mut x = if rng.gen::<f32>() < 0.5 { 0 } else { size - 1 };
        let mut y = rng.gen_range(0..size);
        if rng.gen::<f32>() < 0.5 {
            std::mem::swap(&mut x, &mut y);
        }
        let mut dx = if x == 0 { 1 } else { -1 };
        let mut dy = if rng.gen::<f32>() < 0.5 { 1 } else { -1 };

        let length = (map.size as f32 * 0.6).ceil() as usize;
        for _ in 0..length {
            if (0..size).contains(&x) && (0..size).contains(&y) {
                let (ux, uy) = (x as usize, y as usize);
                if map.get(ux, uy) != Terrain::Ocean {
                    map.set(ux, uy, Terrain::Water);
                    if rng.gen::<f32>() < 0.3 {
                        if ux + 1 < map.size && map.get(ux + 1, uy) != Terrain::Ocean {
                            map.set(ux + 1, uy, Terrain::Water);
                        }
                        if uy + 1 < map.size && map.get(ux, uy + 1) != Terrain::Ocean {
                            map.set(ux, uy + 1, Terrain::Water);
                        }
                    }
                }
            }
            if rng.gen::<f32>() < 0.3 {
                dy = if rng.gen::<f32>() < 0.5 { 1 } else { -1 };
            }
            if rng.gen::<f32>() < 0.2 {
                dx = if rng.gen::<f32>() < 0.5 { 1 } else { -1 };
            }
            x += dx;
            y += dy;
        }
    }
}

fn add_hills(map: &mut TerrainMap, rng: &mut ChaCha8Rng) {
    let size = map.size as f32;
    for _ in 0..map.size / 24 {
        let cx = (rng.gen::<f32>() * size * 0.6 + size * 0.2) as i64;
        let cy = (rng.gen::<f32>() * size * 0.6 + size * 0.2) as i64;
        let radius = 4 + rng.gen_range(0..6);
        let cells: Vec<_> = map.square(cx, cy, radius).collect();
        for (x, y, dist) in cells {
            if !matches!(map.get(x, y), Terrain::Grass | Terrain::Forest) {
                continue;
            }
            if dist < radius as f32 * 0.4 && rng.gen::<f32>() < 0.7 {
                map.set(x, y, Terrain::Mountain);
            } else if dist < radius as f32 * 0.7 && rng.gen::<f32>() < 0.6 {
                map.set(x, y, Terrain::Hill);
            }
        }
    }
}

fn add_forests(map: &mut TerrainMap, rng: &mut ChaCha8Rng, seed: u64) {
    let mut moisture = FastNoiseLite::with_seed(seed as i32);
    moisture.set_noise_type(Some(NoiseType::OpenSimplex2));
    moisture.set_frequency(Some(MOISTURE_FREQUENCY));

    for _ in 0..map.size / 8 {
        let cx = rng.gen_range(0..map.size) as i64;
        let cy = rng.gen_range(0..map.size) as i64;
        let radius = 2 + rng.gen_range(0..4);
        let cells: Vec<_> = map.square(cx, cy, radius).collect();
        for (x, y, _) in cells {
            if map.get(x, y) != Terrain::Grass || rng.gen::<f32>() >= 0.7 {
                continue;
            }
            if moisture.get_noise_2d(x as f32, y as f32) > DRY_CUTOFF {
                map.set(x, y, Terrain::Forest);
            }
        }
    }
}

fn add_beaches(map: &mut TerrainMap, rng: &mut ChaCha8Rng) {
    let size = map.size;
    for y in 0..size {
        for x in 0..size {
            if map.get(x, y) != Terrain::Grass {
                continue;
            }
            let wet = (x > 0 && map.get(x - 1, y).is_water())
                || (x + 1 < size && map.get(x + 1, y).is_water())
                || (y > 0 && map.get(x, y - 1).is_water())
                || (y + 1 < size && map.get(x, y + 1).is_water());
            if wet && rng.gen::<f32>() < 0.6 {
                map.set(x, y, Terrain::Beach);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_map() {
        assert_eq!(generate_terrain(48, 7), generate_terrain(48, 7));
    }

    #[test]
    fn test_different_seeds_differ() {
        assert_ne!(generate_terrain(48, 1), generate_terrain(48, 2));
    }

    #[test]
    fn test_small_map_is_all_grass() {
        // Every feature count rounds down to zero below 8 tiles.
        assert!(generate_terrain(4, 123).iter().all(|t| *t == Terrain::Grass));
    }

    #[test]
    fn test_ocean_corners() {
        // The outermost ring has ocean chance 1.0.
        let size = 40;
        let map = generate_terrain(size, 99);
        assert_eq!(map[0], Terrain::Ocean);
        assert_eq!(map[size * size - 1], Terrain::Ocean);
    }

    #[test]
    fn test_buildable_terrain() {
        assert!(Terrain::Grass.is_buildable());
        assert!(Terrain::Beach.is_buildable());
        assert!(Terrain::Hill.is_buildable());
        assert!(!Terrain::Forest.is_buildable());
        assert!(!Terrain::Water.is_buildable());
        assert!(!Terrain::Mountain.is_buildable());
    }
}
