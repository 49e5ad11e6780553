use crate::components::PlayerState;

/// The single timed buff: invincibility plus flight.
#[derive(Clone, Debug)]
pub struct PowerUpTimer {
    pub active: bool,
    pub remaining: f32,
    pub duration: f32,
}

impl PowerUpTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            active: false,
            remaining: 0.0,
            duration,
        }
    }

    /// Returns true when this refreshed an already running buff.
    pub fn activate(&mut self, player: &mut PlayerState) -> bool {
        let refreshed = self.active;
        self.active = true;
        self.remaining = self.duration;
        player.flying = true;
        refreshed
    }

    /// Returns true on the tick the buff runs out.
    pub fn tick(&mut self, dt: f32, player: &mut PlayerState) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.clear(player);
            return true;
        }
        false
    }

    pub fn clear(&mut self, player: &mut PlayerState) {
        self.active = false;
        self.remaining = 0.0;
        player.flying = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    #[test]
    fn reactivation_resets_without_stacking() {
        let mut player = PlayerState::spawn_at(Vec3::ZERO, 3);
        let mut timer = PowerUpTimer::new(5.0);
        assert!(!timer.activate(&mut player));
        timer.tick(3.0, &mut player);
        assert!(timer.activate(&mut player));
        assert_eq!(timer.remaining, 5.0);
        assert!(player.flying);

        assert!(!timer.tick(4.9, &mut player));
        assert!(player.flying);
        assert!(timer.tick(0.2, &mut player));
        assert!(!timer.active);
        assert!(!player.flying);
    }

    #[test]
    fn expires_after_full_duration_from_single_activation() {
        let mut player = PlayerState::spawn_at(Vec3::ZERO, 3);
        let mut timer = PowerUpTimer::new(5.0);
        timer.activate(&mut player);
        let mut frames = 0;
        while timer.active {
            timer.tick(1.0 / 60.0, &mut player);
            frames += 1;
        }
        assert!((299..=301).contains(&frames));
    }
}
