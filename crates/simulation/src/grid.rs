use std::collections::BTreeMap;

use pathfinding::prelude::bfs_reach;

use crate::buildings::{Building, BuildingType};
use crate::citizen::{Citizen, CitizenId};
use crate::city::TickContext;
use crate::terrain_generation::Terrain;

pub type Coord = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub terrain: Terrain,
    pub building: Option<Building>,
}

impl Tile {
    pub fn new(x: usize, y: usize, terrain: Terrain) -> Self {
        Self {
            x,
            y,
            terrain,
            building: None,
        }
    }

    pub fn building_type(&self) -> Option<BuildingType> {
        self.building.as_ref().map(|b| b.building_type)
    }

    pub fn has(&self, building_type: BuildingType) -> bool {
        self.building_type() == Some(building_type)
    }

    /// Manhattan distance to another coordinate.
    pub fn distance_to(&self, (x, y): Coord) -> usize {
        self.x.abs_diff(x) + self.y.abs_diff(y)
    }
}

/// The tile store. Tiles are created once and never removed; only their
/// buildings come and go.
///
/// `citizen_homes` maps every living citizen to the residence that owns it,
/// so workplaces can resolve the ids on their rosters.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldGrid {
    pub size: usize,
    pub tiles: Vec<Tile>,
    pub citizen_homes: BTreeMap<CitizenId, Coord>,
    pub next_citizen_id: CitizenId,
}

impl WorldGrid {
    /// `terrain` is row-major; missing entries default to grass.
    pub fn new(size: usize, terrain: &[Terrain]) -> Self {
        let mut tiles = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let t = terrain.get(y * size + x).copied().unwrap_or_default();
                tiles.push(Tile::new(x, y, t));
            }
        }
        Self {
            size,
            tiles,
            citizen_homes: BTreeMap::new(),
            next_citizen_id: 1,
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// Bounds-checked lookup with signed coordinates.
    pub fn get_tile(&self, x: i64, y: i64) -> Option<&Tile> {
        if self.in_bounds(x, y) {
            Some(&self.tiles[self.index(x as usize, y as usize)])
        } else {
            None
        }
    }

    pub fn tile(&self, (x, y): Coord) -> Option<&Tile> {
        if x < self.size && y < self.size {
            Some(&self.tiles[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn tile_mut(&mut self, (x, y): Coord) -> Option<&mut Tile> {
        if x < self.size && y < self.size {
            let idx = self.index(x, y);
            Some(&mut self.tiles[idx])
        } else {
            None
        }
    }

    pub fn building(&self, at: Coord) -> Option<&Building> {
        self.tile(at).and_then(|t| t.building.as_ref())
    }

    pub fn building_mut(&mut self, at: Coord) -> Option<&mut Building> {
        self.tile_mut(at).and_then(|t| t.building.as_mut())
    }

    /// Lift a building off its tile so it can be simulated against `&mut self`.
    pub fn take_building(&mut self, at: Coord) -> Option<Building> {
        self.tile_mut(at).and_then(|t| t.building.take())
    }

    pub fn put_building(&mut self, at: Coord, building: Building) {
        if let Some(tile) = self.tile_mut(at) {
            tile.building = Some(building);
        }
    }

    /// Returns up to 4 cardinal neighbors and the count of valid entries,
    /// in the order -x, +x, -y, +y.
    pub fn neighbors4(&self, x: usize, y: usize) -> ([Coord; 4], usize) {
        let mut result = [(0, 0); 4];
        let mut count = 0;
        if x > 0 {
            result[count] = (x - 1, y);
            count += 1;
        }
        if x + 1 < self.size {
            result[count] = (x + 1, y);
            count += 1;
        }
        if y > 0 {
            result[count] = (x, y - 1);
            count += 1;
        }
        if y + 1 < self.size {
            result[count] = (x, y + 1);
            count += 1;
        }
        (result, count)
    }

    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = &Tile> + '_ {
        let (coords, count) = self.neighbors4(x, y);
        coords
            .into_iter()
            .take(count)
            .filter_map(move |c| self.tile(c))
    }

    /// Breadth-first search from `start` for the first tile matching
    /// `predicate`, never expanding past Manhattan distance `max_distance`.
    ///
    /// Neighbour order is fixed, so equally distant matches always resolve
    /// the same way.
    pub fn find_tile<F>(&self, start: Coord, max_distance: usize, mut predicate: F) -> Option<Coord>
    where
        F: FnMut(&Tile) -> bool,
    {
        let origin = self.tile(start)?;
        bfs_reach(start, |&(x, y)| {
            let (coords, count) = self.neighbors4(x, y);
            coords
                .into_iter()
                .take(count)
                .filter(move |c| origin.distance_to(*c) <= max_distance)
        })
        .find(|c| self.tile(*c).is_some_and(&mut predicate))
    }

    /// In-bounds coordinates of the square `[c - radius, c + radius]`,
    /// x-major.
    pub fn square(&self, (cx, cy): Coord, radius: usize) -> impl Iterator<Item = Coord> {
        let size = self.size;
        let x_range = cx.saturating_sub(radius)..=(cx + radius).min(size.saturating_sub(1));
        let y_min = cy.saturating_sub(radius);
        let y_max = (cy + radius).min(size.saturating_sub(1));
        x_range.flat_map(move |x| (y_min..=y_max).map(move |y| (x, y)))
    }

    /// In-bounds coordinates within Euclidean `radius` of the centre, x-major.
    pub fn disc(&self, (cx, cy): Coord, radius: usize) -> impl Iterator<Item = Coord> {
        let r2 = (radius * radius) as f32;
        self.square((cx, cy), radius).filter(move |&(x, y)| {
            let dx = x as f32 - cx as f32;
            let dy = y as f32 - cy as f32;
            dx * dx + dy * dy <= r2
        })
    }

    /// Occupied tiles, row-major.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.tiles.iter().filter_map(|t| t.building.as_ref())
    }

    pub fn building_coords(&self) -> Vec<Coord> {
        self.tiles
            .iter()
            .filter(|t| t.building.is_some())
            .map(|t| (t.x, t.y))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Citizens
    // -------------------------------------------------------------------------

    pub fn allocate_citizen_id(&mut self) -> CitizenId {
        let id = self.next_citizen_id;
        self.next_citizen_id += 1;
        id
    }

    pub fn citizen(&self, id: CitizenId) -> Option<&Citizen> {
        let home = *self.citizen_homes.get(&id)?;
        self.building(home)?.residents()?.get(id)
    }

    /// Resolve a citizen through its residence. Returns `None` while the
    /// residence is lifted off the grid for its own update.
    pub fn citizen_mut(&mut self, id: CitizenId) -> Option<&mut Citizen> {
        let home = *self.citizen_homes.get(&id)?;
        self.building_mut(home)?.residents_mut()?.get_mut(id)
    }

    pub fn citizens(&self) -> impl Iterator<Item = &Citizen> {
        self.buildings()
            .filter_map(|b| b.residents())
            .flat_map(|r| r.citizens.iter())
    }

    pub fn for_each_citizen_mut(&mut self, mut f: impl FnMut(&mut Citizen)) {
        for tile in &mut self.tiles {
            if let Some(residents) = tile.building.as_mut().and_then(Building::residents_mut) {
                for citizen in &mut residents.citizens {
                    f(citizen);
                }
            }
        }
    }

    pub fn remove_worker(&mut self, workplace: Coord, id: CitizenId) -> bool {
        self.building_mut(workplace)
            .and_then(Building::jobs_mut)
            .is_some_and(|jobs| jobs.remove(id))
    }

    pub fn population(&self) -> usize {
        self.buildings().map(Building::resident_count).sum()
    }

    /// Remove the building at `at`, evicting its residents and laying off its
    /// workers, then refresh road access around the hole it leaves.
    pub fn demolish(&mut self, at: Coord, ctx: &mut TickContext) -> Option<BuildingType> {
        let mut building = self.take_building(at)?;
        building.release_occupants(self, ctx);
        self.refresh_road_access(at, ctx.config.road_access.search_distance);
        Some(building.building_type)
    }

    // -------------------------------------------------------------------------
    // Road access
    // -------------------------------------------------------------------------

    pub fn has_road_within(&self, at: Coord, search_distance: usize) -> bool {
        self.find_tile(at, search_distance, |t| t.has(BuildingType::Road))
            .is_some()
    }

    /// Recompute road access for every building that could see a change at
    /// `at`, including `at` itself.
    pub fn refresh_road_access(&mut self, at: Coord, search_distance: usize) {
        let affected: Vec<Coord> = self
            .square(at, search_distance)
            .filter(|&c| c.0.abs_diff(at.0) + c.1.abs_diff(at.1) <= search_distance)
            .collect();
        for c in affected {
            self.refresh_road_access_at(c, search_distance);
        }
    }

    pub fn refresh_road_access_at(&mut self, at: Coord, search_distance: usize) {
        let enabled = self
            .building(at)
            .is_some_and(|b| b.road_access.enabled);
        if !enabled {
            return;
        }
        let value = self.has_road_within(at, search_distance);
        if let Some(building) = self.building_mut(at) {
            building.road_access.value = value;
        }
    }

    pub fn refresh_all_road_access(&mut self, search_distance: usize) {
        for c in self.building_coords() {
            self.refresh_road_access_at(c, search_distance);
        }
    }
}
