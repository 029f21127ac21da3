//! Rejection sampler for free-standing objects on the continuous floor plane.

use serde::{Deserialize, Serialize};

use crate::config::RetryLimit;
use crate::types::{Rect, WorldPoint};

use super::seed::GenRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Obstacle,
    Debris,
    Human,
    Base,
    Start,
}

/// Footprint already claimed on the floor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub center: WorldPoint,
    pub radius: f64,
    pub kind: ObjectKind,
}

impl PlacedObject {
    pub fn overlaps(&self, other: &Self) -> bool {
        self.center.distance(other.center) < self.radius + other.radius
    }
}

/// Circle no candidate centre may fall into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExclusionZone {
    pub center: WorldPoint,
    pub clearance: f64,
}

/// Where candidate positions come from.
pub trait CandidateSource {
    /// A point inside `area`.
    fn candidate(&mut self, area: &Rect) -> WorldPoint;

    /// An index in `0..count`; `count` is positive.
    fn choose(&mut self, count: usize) -> usize;
}

impl CandidateSource for GenRng {
    fn candidate(&mut self, area: &Rect) -> WorldPoint {
        let x = self.range_f64(area.min.x, area.max.x);
        let z = self.range_f64(area.min.z, area.max.z);
        WorldPoint::new(x, z)
    }

    fn choose(&mut self, count: usize) -> usize {
        self.below(count)
    }
}

#[derive(Clone, Debug)]
pub struct PositionSampler {
    area: Rect,
    rooms: Vec<Rect>,
    walls: Vec<Rect>,
    placed: Vec<PlacedObject>,
    exclusions: Vec<ExclusionZone>,
    limit: RetryLimit,
}

impl PositionSampler {
    pub fn new(area: Rect, limit: RetryLimit) -> Self {
        Self {
            area,
            rooms: Vec::new(),
            walls: Vec::new(),
            placed: Vec::new(),
            exclusions: Vec::new(),
            limit,
        }
    }

    /// Restricts candidates to these rooms instead of the whole area.
    pub fn with_rooms(mut self, rooms: Vec<Rect>) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_walls(mut self, walls: Vec<Rect>) -> Self {
        self.walls = walls;
        self
    }

    pub fn with_limit(mut self, limit: RetryLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn exclude(&mut self, zone: ExclusionZone) {
        self.exclusions.push(zone);
    }

    /// Claims space without sampling, e.g. for objects whose position is fixed.
    pub fn register(&mut self, object: PlacedObject) {
        self.placed.push(object);
    }

    pub fn placed(&self) -> &[PlacedObject] {
        &self.placed
    }

    pub fn accepts(&self, candidate: WorldPoint, radius: f64) -> bool {
        let footprint = Rect::centered(candidate, radius, radius);
        if self.walls.iter().any(|wall| footprint.overlaps(wall)) {
            return false;
        }
        let probe = PlacedObject { center: candidate, radius, kind: ObjectKind::Obstacle };
        if self.placed.iter().any(|other| probe.overlaps(other)) {
            return false;
        }
        !self.exclusions.iter().any(|zone| candidate.distance(zone.center) < zone.clearance)
    }

    fn draw_area(&self, radius: f64, source: &mut impl CandidateSource) -> Option<Rect> {
        if self.rooms.is_empty() {
            return self.area.inset(radius);
        }
        let room = self.rooms[source.choose(self.rooms.len())];
        room.inset(radius)
    }

    fn can_ever_fit(&self, radius: f64) -> bool {
        if self.rooms.is_empty() {
            self.area.inset(radius).is_some()
        } else {
            self.rooms.iter().any(|room| room.inset(radius).is_some())
        }
    }

    /// Draws candidates until one clears walls, placed objects and exclusion
    /// zones, then claims it. `None` once the attempt limit runs out, or right
    /// away when the object cannot fit anywhere.
    pub fn sample(
        &mut self,
        radius: f64,
        kind: ObjectKind,
        source: &mut impl CandidateSource,
    ) -> Option<WorldPoint> {
        if !self.can_ever_fit(radius) {
            return None;
        }
        let mut attempts = 0_u32;
        while self.limit.allows(attempts) {
            attempts = attempts.saturating_add(1);
            let Some(area) = self.draw_area(radius, source) else { continue };
            let candidate = source.candidate(&area);
            if self.accepts(candidate, radius) {
                self.placed.push(PlacedObject { center: candidate, radius, kind });
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays fixed candidates in order.
    struct Scripted {
        points: VecDeque<WorldPoint>,
        drawn: usize,
    }

    impl Scripted {
        fn new(points: &[(f64, f64)]) -> Self {
            Self {
                points: points.iter().map(|&(x, z)| WorldPoint::new(x, z)).collect(),
                drawn: 0,
            }
        }
    }

    impl CandidateSource for Scripted {
        fn candidate(&mut self, _area: &Rect) -> WorldPoint {
            self.drawn += 1;
            self.points.pop_front().unwrap_or(WorldPoint::new(0.0, 0.0))
        }

        fn choose(&mut self, _count: usize) -> usize {
            0
        }
    }

    fn square(half: f64) -> Rect {
        Rect::centered(WorldPoint::new(0.0, 0.0), half, half)
    }

    #[test]
    fn overlapping_candidates_are_resampled() {
        let mut sampler = PositionSampler::new(square(10.0), RetryLimit::Attempts(10));
        let mut source = Scripted::new(&[(0.0, 0.0), (1.5, 0.0), (2.5, 0.0)]);

        assert_eq!(
            sampler.sample(1.0, ObjectKind::Obstacle, &mut source),
            Some(WorldPoint::new(0.0, 0.0))
        );
        let second = sampler.sample(1.0, ObjectKind::Obstacle, &mut source);
        assert_eq!(second, Some(WorldPoint::new(2.5, 0.0)));
        assert_eq!(source.drawn, 3);
        let [first, second] = sampler.placed() else { panic!("two objects expected") };
        assert!(first.center.distance(second.center) >= 2.0);
    }

    #[test]
    fn walls_reject_candidates_whose_footprint_touches_them() {
        let wall = Rect::centered(WorldPoint::new(0.0, 0.0), 0.01, 5.0);
        let sampler =
            PositionSampler::new(square(5.0), RetryLimit::Unbounded).with_walls(vec![wall]);
        assert!(!sampler.accepts(WorldPoint::new(0.3, 0.0), 0.5));
        assert!(sampler.accepts(WorldPoint::new(0.6, 0.0), 0.5));
    }

    #[test]
    fn exclusion_zones_keep_candidates_away() {
        let mut sampler = PositionSampler::new(square(5.0), RetryLimit::Attempts(1));
        sampler.exclude(ExclusionZone { center: WorldPoint::new(1.0, 1.0), clearance: 0.5 });
        assert!(!sampler.accepts(WorldPoint::new(1.2, 1.0), 0.01));
        let mut source = Scripted::new(&[(1.1, 1.1)]);
        assert!(sampler.sample(0.01, ObjectKind::Debris, &mut source).is_none());
    }

    #[test]
    fn exhausted_budget_returns_none() {
        let mut sampler = PositionSampler::new(square(1.0), RetryLimit::Attempts(5));
        sampler.register(PlacedObject {
            center: WorldPoint::new(0.0, 0.0),
            radius: 5.0,
            kind: ObjectKind::Base,
        });
        let mut rng = GenRng::seed_from_u64(4);
        assert!(sampler.sample(0.1, ObjectKind::Obstacle, &mut rng).is_none());
        assert_eq!(sampler.placed().len(), 1);
    }

    #[test]
    fn objects_too_large_for_the_area_fail_immediately_even_unbounded() {
        let mut sampler = PositionSampler::new(square(0.5), RetryLimit::Unbounded);
        let mut rng = GenRng::seed_from_u64(1);
        assert!(sampler.sample(0.6, ObjectKind::Obstacle, &mut rng).is_none());
    }

    #[test]
    fn room_restricted_sampling_stays_inside_allowed_rooms() {
        let room = Rect::new(WorldPoint::new(2.0, 2.0), WorldPoint::new(4.0, 4.0));
        let mut sampler =
            PositionSampler::new(square(10.0), RetryLimit::Attempts(50)).with_rooms(vec![room]);
        let mut rng = GenRng::seed_from_u64(17);
        for _ in 0..5 {
            let point = sampler.sample(0.1, ObjectKind::Obstacle, &mut rng).unwrap();
            assert!(room.inset(0.1).unwrap().contains(point));
        }
    }
}
