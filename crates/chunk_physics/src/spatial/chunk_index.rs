//! Sparse chunk grid
//!
//! Space is cut into fixed-size chunks addressed by integer coordinates.
//! Each entity is registered in every chunk its bounds touch, and the
//! inclusive chunk range it covers is cached so moves only touch the cells
//! that actually changed. A chunk with no occupants is never stored.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use crate::ecs::Entity;
use crate::foundation::math::Vec3;
use crate::physics::collision::Aabb;
use crate::spatial::SpatialQuery;

/// Integer address of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk index along X
    pub x: i32,
    /// Chunk index along Y
    pub y: i32,
    /// Chunk index along Z
    pub z: i32,
}

impl ChunkCoord {
    /// Create a chunk coordinate
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Inclusive block of chunk coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRange {
    /// Lowest corner (inclusive)
    pub min: ChunkCoord,
    /// Highest corner (inclusive)
    pub max: ChunkCoord,
}

impl ChunkRange {
    /// Whether `coord` lies inside the range
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        (self.min.x..=self.max.x).contains(&coord.x)
            && (self.min.y..=self.max.y).contains(&coord.y)
            && (self.min.z..=self.max.z).contains(&coord.z)
    }

    /// Number of cells in the range
    pub fn cell_count(&self) -> usize {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0) as usize;
        span(self.min.x, self.max.x) * span(self.min.y, self.max.y) * span(self.min.z, self.max.z)
    }

    /// Every coordinate in the range, x fastest
    pub fn cells(&self) -> impl Iterator<Item = ChunkCoord> {
        let (min, max) = (self.min, self.max);
        (min.z..=max.z).flat_map(move |z| {
            (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| ChunkCoord::new(x, y, z)))
        })
    }
}

/// Sparse map from chunk coordinate to the entities touching that chunk
#[derive(Debug, Clone)]
pub struct ChunkIndex {
    chunk_size: Vec3,
    cells: HashMap<ChunkCoord, HashSet<Entity>>,
    ranges: HashMap<Entity, ChunkRange>,
}

impl ChunkIndex {
    /// Create an empty index
    ///
    /// `chunk_size` must be strictly positive on every axis;
    /// `PhysicsConfig::validate` enforces this for configured indices.
    pub fn new(chunk_size: Vec3) -> Self {
        Self {
            chunk_size,
            cells: HashMap::new(),
            ranges: HashMap::new(),
        }
    }

    /// Chunk edge length per axis
    pub fn chunk_size(&self) -> Vec3 {
        self.chunk_size
    }

    /// Chunk containing `point`
    ///
    /// Each axis is `point / chunk_size` truncated toward zero, so the chunk
    /// at 0 spans `(-size, size)` and every other chunk spans one size.
    pub fn chunk_coordinate(&self, point: Vec3) -> ChunkCoord {
        let axis = |p: f32, size: f32| (p / size) as i32;
        ChunkCoord::new(
            axis(point.x, self.chunk_size.x),
            axis(point.y, self.chunk_size.y),
            axis(point.z, self.chunk_size.z),
        )
    }

    /// Inclusive chunk range covered by `bounds`
    pub fn range_for(&self, bounds: &Aabb) -> ChunkRange {
        ChunkRange {
            min: self.chunk_coordinate(bounds.min),
            max: self.chunk_coordinate(bounds.max),
        }
    }

    /// World-space extent of one chunk
    pub fn cell_bounds(&self, coord: ChunkCoord) -> Aabb {
        let axis = |c: i32, size: f32| {
            let c = c as f32;
            match c {
                c if c > 0.0 => (c * size, (c + 1.0) * size),
                c if c < 0.0 => ((c - 1.0) * size, c * size),
                _ => (-size, size),
            }
        };
        let (min_x, max_x) = axis(coord.x, self.chunk_size.x);
        let (min_y, max_y) = axis(coord.y, self.chunk_size.y);
        let (min_z, max_z) = axis(coord.z, self.chunk_size.z);
        Aabb::new(Vec3::new(min_x, min_y, min_z), Vec3::new(max_x, max_y, max_z))
    }

    /// Entities registered in one chunk
    pub fn occupants(&self, coord: ChunkCoord) -> Option<&HashSet<Entity>> {
        self.cells.get(&coord)
    }

    /// Cached range of an indexed entity
    pub fn cached_range(&self, entity: Entity) -> Option<ChunkRange> {
        self.ranges.get(&entity).copied()
    }

    /// Number of occupied chunks
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Entities currently indexed, in no particular order
    pub fn indexed_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.ranges.keys().copied()
    }

    /// Occupied chunk coordinates
    pub fn occupied_cells(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.cells.keys().copied()
    }

    fn add_to_cells(&mut self, entity: Entity, range: ChunkRange, skip: Option<ChunkRange>) {
        for coord in range.cells() {
            if skip.is_some_and(|skip| skip.contains(coord)) {
                continue;
            }
            self.cells.entry(coord).or_default().insert(entity);
        }
    }

    fn remove_from_cells(&mut self, entity: Entity, range: ChunkRange, keep: Option<ChunkRange>) {
        for coord in range.cells() {
            if keep.is_some_and(|keep| keep.contains(coord)) {
                continue;
            }
            if let Some(occupants) = self.cells.get_mut(&coord) {
                occupants.remove(&entity);
                if occupants.is_empty() {
                    self.cells.remove(&coord);
                }
            }
        }
    }
}

impl Default for ChunkIndex {
    fn default() -> Self {
        Self::new(Vec3::new(1.0, 1.0, 1.0))
    }
}

impl SpatialQuery for ChunkIndex {
    fn insert(&mut self, entity: Entity, bounds: &Aabb) {
        if self.ranges.contains_key(&entity) {
            self.update(entity, bounds);
            return;
        }

        let range = self.range_for(bounds);
        self.add_to_cells(entity, range, None);
        self.ranges.insert(entity, range);
        log::debug!("Indexed entity {:?} over {} chunk(s)", entity, range.cell_count());
    }

    fn update(&mut self, entity: Entity, bounds: &Aabb) -> bool {
        let range = self.range_for(bounds);
        let Some(previous) = self.ranges.get(&entity).copied() else {
            self.add_to_cells(entity, range, None);
            self.ranges.insert(entity, range);
            return true;
        };

        if previous == range {
            return false;
        }

        self.remove_from_cells(entity, previous, Some(range));
        self.add_to_cells(entity, range, Some(previous));
        self.ranges.insert(entity, range);
        log::trace!("Entity {:?} moved from {:?} to {:?}", entity, previous, range);
        true
    }

    fn remove(&mut self, entity: Entity) -> Vec<Entity> {
        let Some(range) = self.ranges.remove(&entity) else {
            return Vec::new();
        };

        self.remove_from_cells(entity, range, None);

        let neighbours: HashSet<Entity> = range
            .cells()
            .filter_map(|coord| self.cells.get(&coord))
            .flatten()
            .copied()
            .collect();
        let mut neighbours: Vec<Entity> = neighbours.into_iter().collect();
        neighbours.sort_unstable();

        log::debug!("Removed entity {:?} from index, {} neighbour(s) left behind", entity, neighbours.len());
        neighbours
    }

    fn query_aabb(&self, bounds: &Aabb) -> HashSet<Entity> {
        self.range_for(bounds)
            .cells()
            .filter_map(|coord| self.cells.get(&coord))
            .flatten()
            .copied()
            .collect()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.ranges.contains_key(&entity)
    }

    fn entity_count(&self) -> usize {
        self.ranges.len()
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.ranges.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::from_center_half_extents(center, Vec3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_unit_box_at_origin_covers_single_chunk() {
        let index = ChunkIndex::default();
        let range = index.range_for(&unit_box_at(Vec3::zeros()));

        assert_eq!(range.cells().collect::<Vec<_>>(), vec![ChunkCoord::new(0, 0, 0)]);
    }

    #[test]
    fn test_chunk_coordinate_truncates_toward_zero() {
        let index = ChunkIndex::new(Vec3::new(2.0, 1.0, 0.5));

        assert_eq!(index.chunk_coordinate(Vec3::new(3.9, -0.5, 1.2)), ChunkCoord::new(1, 0, 2));
        assert_eq!(index.chunk_coordinate(Vec3::new(-2.5, -1.5, -0.6)), ChunkCoord::new(-1, -1, -1));
    }

    #[test]
    fn test_cell_bounds_match_truncation() {
        let index = ChunkIndex::default();
        let origin = index.cell_bounds(ChunkCoord::new(0, 0, 0));
        assert_eq!(origin.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(origin.max, Vec3::new(1.0, 1.0, 1.0));

        let other = index.cell_bounds(ChunkCoord::new(2, -2, 0));
        assert_eq!(other.min, Vec3::new(2.0, -3.0, -1.0));
        assert_eq!(other.max, Vec3::new(3.0, -2.0, 1.0));
    }

    #[test]
    fn test_indexed_entities_follow_insert_and_remove() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        let mut index = ChunkIndex::default();

        index.insert(a, &unit_box_at(Vec3::zeros()));
        index.insert(b, &unit_box_at(Vec3::new(5.0, 0.0, 0.0)));
        index.remove(a);

        assert_eq!(index.indexed_entities().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_insert_spanning_multiple_chunks() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut index = ChunkIndex::default();

        index.insert(entity, &Aabb::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(2.5, 1.5, 0.0)));

        assert_eq!(index.cell_count(), 6);
        assert!(index.occupants(ChunkCoord::new(2, 1, 0)).unwrap().contains(&entity));
        assert_eq!(index.cached_range(entity).unwrap().cell_count(), 6);
    }

    #[test]
    fn test_update_is_differential_and_prunes() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut index = ChunkIndex::default();
        index.insert(entity, &unit_box_at(Vec3::new(1.5, 0.0, 0.0)));
        assert!(index.occupants(ChunkCoord::new(1, 0, 0)).is_some());

        assert!(!index.update(entity, &unit_box_at(Vec3::new(1.6, 0.0, 0.0))));

        assert!(index.update(entity, &unit_box_at(Vec3::new(5.5, 0.0, 0.0))));
        assert!(index.occupants(ChunkCoord::new(1, 0, 0)).is_none());
        assert!(index.occupants(ChunkCoord::new(2, 0, 0)).is_none());
        assert!(index.occupants(ChunkCoord::new(5, 0, 0)).unwrap().contains(&entity));
        assert!(index.occupied_cells().all(|coord| index.occupants(coord).is_some_and(|set| !set.is_empty())));
    }

    #[test]
    fn test_removing_last_occupant_drops_cell() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        let mut index = ChunkIndex::default();
        index.insert(a, &unit_box_at(Vec3::zeros()));
        index.insert(b, &unit_box_at(Vec3::new(0.2, 0.0, 0.0)));

        assert_eq!(index.remove(a), vec![b]);
        assert!(index.occupants(ChunkCoord::new(0, 0, 0)).is_some());

        assert!(index.remove(b).is_empty());
        assert!(index.occupants(ChunkCoord::new(0, 0, 0)).is_none());
        assert!(index.is_empty());
        assert_eq!(index.cell_count(), 0);
    }

    #[test]
    fn test_remove_unknown_entity_is_noop() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut index = ChunkIndex::default();

        assert!(index.remove(entity).is_empty());
        assert!(!index.contains(entity));
    }

    #[test]
    fn test_query_aabb_collects_occupants() {
        let mut world = World::new();
        let near = world.create_entity();
        let far = world.create_entity();
        let mut index = ChunkIndex::default();
        index.insert(near, &unit_box_at(Vec3::new(1.5, 0.0, 0.0)));
        index.insert(far, &unit_box_at(Vec3::new(10.5, 0.0, 0.0)));

        let found = index.query_aabb(&unit_box_at(Vec3::new(1.2, 0.0, 0.0)));
        assert!(found.contains(&near));
        assert!(!found.contains(&far));
        assert_eq!(index.entity_count(), 2);
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut spatial: Box<dyn SpatialQuery> = Box::new(ChunkIndex::new(Vec3::new(4.0, 4.0, 4.0)));
        spatial.insert(entity, &unit_box_at(Vec3::zeros()));

        let index = spatial.as_any().downcast_ref::<ChunkIndex>().unwrap();
        assert_eq!(index.chunk_size(), Vec3::new(4.0, 4.0, 4.0));

        spatial.as_any_mut().downcast_mut::<ChunkIndex>().unwrap().clear();
        assert_eq!(spatial.entity_count(), 0);
    }
}
