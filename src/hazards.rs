use bevy::prelude::*;

use crate::components::{Collectible, CollectibleKind, Hazard, HazardKind, Patrol};
use crate::config::HazardTuning;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HazardContact {
    pub index: usize,
    pub label: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pickup {
    pub index: usize,
    pub kind: CollectibleKind,
}

fn hazard_radius(hazard: &Hazard, tuning: &HazardTuning) -> f32 {
    match hazard.kind {
        HazardKind::Spike => tuning.spike_radius,
        HazardKind::Enemy(_) => tuning.enemy_radius,
    }
}

fn pickup_radius(kind: CollectibleKind, tuning: &HazardTuning) -> f32 {
    match kind {
        CollectibleKind::Star => tuning.star_radius,
        CollectibleKind::PowerUp => tuning.power_up_radius,
    }
}

/// First hazard within reach, in level order. One contact per frame at most.
pub fn first_hazard_contact(
    player: Vec3,
    hazards: &[Hazard],
    tuning: &HazardTuning,
) -> Option<HazardContact> {
    hazards
        .iter()
        .enumerate()
        .find(|(_, h)| player.distance(h.position) < hazard_radius(h, tuning))
        .map(|(index, h)| HazardContact {
            index,
            label: h.label(),
        })
}

/// Flips every uncollected pickup within reach to collected and reports it.
pub fn collect_in_reach(
    player: Vec3,
    collectibles: &mut [Collectible],
    tuning: &HazardTuning,
) -> Vec<Pickup> {
    let mut picked = Vec::new();
    for (index, item) in collectibles.iter_mut().enumerate() {
        if item.collected {
            continue;
        }
        if player.distance(item.position) < pickup_radius(item.kind, tuning) {
            item.collected = true;
            picked.push(Pickup {
                index,
                kind: item.kind,
            });
        }
    }
    picked
}

/// Moves along x and turns around at `range` from the origin, clamped so the
/// walker never leaves the band.
pub fn step_patrol(position: &mut Vec3, patrol: &mut Patrol, dt: f32) {
    position.x += patrol.direction * patrol.speed * dt;
    let offset = position.x - patrol.origin.x;
    if offset.abs() >= patrol.range {
        position.x = patrol.origin.x + offset.clamp(-patrol.range, patrol.range);
        patrol.direction = -offset.signum();
    }
}

pub fn step_patrols(hazards: &mut [Hazard], dt: f32) {
    for hazard in hazards.iter_mut() {
        if let HazardKind::Enemy(patrol) = &mut hazard.kind {
            step_patrol(&mut hazard.position, patrol, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(x: f32) -> Hazard {
        Hazard {
            kind: HazardKind::Spike,
            position: Vec3::new(x, 0.0, 0.0),
        }
    }

    #[test]
    fn contact_is_first_in_order() {
        let hazards = vec![spike(0.3), spike(-0.3)];
        let contact = first_hazard_contact(Vec3::ZERO, &hazards, &HazardTuning::default());
        assert_eq!(contact.map(|c| c.index), Some(0));
        assert!(first_hazard_contact(Vec3::new(5.0, 0.0, 0.0), &hazards, &HazardTuning::default())
            .is_none());
    }

    #[test]
    fn star_collects_once() {
        let tuning = HazardTuning::default();
        let mut items = vec![Collectible {
            kind: CollectibleKind::Star,
            position: Vec3::new(0.5, 0.0, 0.0),
            collected: false,
        }];
        assert_eq!(collect_in_reach(Vec3::ZERO, &mut items, &tuning).len(), 1);
        assert!(items[0].collected);
        assert!(collect_in_reach(Vec3::ZERO, &mut items, &tuning).is_empty());
    }

    #[test]
    fn patrol_stays_within_band() {
        let origin = Vec3::new(10.0, 2.5, 0.0);
        let mut patrol = Patrol {
            origin,
            speed: 0.5,
            range: 1.0,
            direction: 1.0,
        };
        let mut pos = origin;
        let mut turned = 0;
        let mut last_dir = patrol.direction;
        for _ in 0..2000 {
            step_patrol(&mut pos, &mut patrol, 1.0 / 60.0);
            assert!((pos.x - origin.x).abs() <= 1.0 + 1e-5);
            if patrol.direction != last_dir {
                turned += 1;
                last_dir = patrol.direction;
            }
        }
        assert!(turned >= 2);
        assert_eq!(pos.y, origin.y);
    }
}
