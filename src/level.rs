use bevy::prelude::*;

use crate::components::{Collectible, CollectibleKind, Hazard, HazardKind, Patrol, Platform};
use crate::config::HazardTuning;

const PLATFORMS: [[f32; 3]; 13] = [
    [0.0, 0.0, 0.0],
    [4.0, 1.0, 0.0],
    [8.0, 2.0, -2.0],
    [10.0, 2.0, -2.0],
    [12.0, 2.0, -2.0],
    [16.0, 4.0, 2.0],
    [18.0, 4.0, 2.0],
    [20.0, 4.0, 2.0],
    [24.0, 6.0, -1.0],
    [26.0, 6.0, -1.0],
    [28.0, 6.0, -1.0],
    [32.0, 8.0, 0.0],
    [36.0, 9.0, 0.0],
];

const SPIKES: [[f32; 3]; 9] = [
    [10.0, 2.8, -2.0],
    [9.5, 2.8, -1.5],
    [10.5, 2.8, -2.5],
    [18.0, 4.8, 2.0],
    [17.5, 4.8, 1.5],
    [18.5, 4.8, 2.5],
    [26.0, 6.8, -1.0],
    [25.5, 6.8, -0.5],
    [26.5, 6.8, -1.5],
];

const TURTLES: [[f32; 3]; 2] = [[10.0, 2.5, 0.0], [26.0, 6.5, -1.0]];

const STARS: [[f32; 3]; 8] = [
    [2.0, 2.0, 0.0],
    [6.0, 3.0, -1.0],
    [10.0, 4.0, 1.0],
    [14.0, 5.0, -1.0],
    [18.0, 6.0, 1.0],
    [22.0, 7.0, 0.0],
    [26.0, 8.0, -1.0],
    [30.0, 9.0, 1.0],
];

const POWER_UP: [f32; 3] = [18.0, 7.0, 0.0];

/// Static course layout plus the mutable per-run pieces (enemy positions,
/// collected flags). A fresh clone is the reset state.
#[derive(Clone, Debug)]
pub struct Level {
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub collectibles: Vec<Collectible>,
}

impl Level {
    pub fn default_course(hazards: &HazardTuning) -> Self {
        let platforms = PLATFORMS
            .iter()
            .map(|p| Platform::square(Vec3::from(*p)))
            .collect();

        let mut hazard_list: Vec<Hazard> = SPIKES
            .iter()
            .map(|p| Hazard {
                kind: HazardKind::Spike,
                position: Vec3::from(*p),
            })
            .collect();
        hazard_list.extend(TURTLES.iter().map(|p| {
            let origin = Vec3::from(*p);
            Hazard {
                kind: HazardKind::Enemy(Patrol {
                    origin,
                    speed: hazards.enemy_speed,
                    range: hazards.enemy_range,
                    direction: 1.0,
                }),
                position: origin,
            }
        }));

        let mut collectibles: Vec<Collectible> = STARS
            .iter()
            .map(|p| Collectible {
                kind: CollectibleKind::Star,
                position: Vec3::from(*p),
                collected: false,
            })
            .collect();
        collectibles.push(Collectible {
            kind: CollectibleKind::PowerUp,
            position: Vec3::from(POWER_UP),
            collected: false,
        });

        Self {
            platforms,
            hazards: hazard_list,
            collectibles,
        }
    }

    pub fn star_total(&self) -> usize {
        self.collectibles
            .iter()
            .filter(|c| c.kind == CollectibleKind::Star)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_course_layout() {
        let level = Level::default_course(&HazardTuning::default());
        assert_eq!(level.platforms.len(), 13);
        assert_eq!(level.hazards.len(), 11);
        assert_eq!(level.star_total(), 8);
        assert_eq!(
            level
                .collectibles
                .iter()
                .filter(|c| c.kind == CollectibleKind::PowerUp)
                .count(),
            1
        );
        // last platform sits just past the boss trigger line
        assert!(level.platforms[12].center.x > 35.0);
    }
}
