use bevy::prelude::*;
use serde::Serialize;

/// Set from `--headless`; render and HUD systems skip entity creation when true.
#[derive(Resource, Clone, Copy, Default)]
pub struct HeadlessMode(pub bool);

/// Simulation-side player data. Rendered transforms are derived from this.
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub jump_count: u32,
    pub flying: bool,
    pub lives: u32,
    pub deaths: u32,
    /// Cosmetic only; collisions ignore it.
    pub scale: f32,
    pub battle_form: bool,
}

impl PlayerState {
    pub fn spawn_at(position: Vec3, lives: u32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: true,
            jump_count: 0,
            flying: false,
            lives,
            deaths: 0,
            scale: 1.0,
            battle_form: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Platform {
    pub center: Vec3,
    /// Footprint along x and z.
    pub size: Vec2,
    pub thickness: f32,
}

impl Platform {
    pub fn square(center: Vec3) -> Self {
        Self {
            center,
            size: Vec2::splat(2.0),
            thickness: 0.3,
        }
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.thickness * 0.5
    }

    pub fn covers(&self, x: f32, z: f32, tolerance: f32) -> bool {
        (x - self.center.x).abs() <= self.size.x * 0.5 + tolerance
            && (z - self.center.z).abs() <= self.size.y * 0.5 + tolerance
    }
}

/// Back-and-forth walk along x around `origin`.
#[derive(Clone, Debug)]
pub struct Patrol {
    pub origin: Vec3,
    pub speed: f32,
    pub range: f32,
    pub direction: f32,
}

#[derive(Clone, Debug)]
pub enum HazardKind {
    Spike,
    Enemy(Patrol),
}

#[derive(Clone, Debug)]
pub struct Hazard {
    pub kind: HazardKind,
    pub position: Vec3,
}

impl Hazard {
    pub fn label(&self) -> &'static str {
        match self.kind {
            HazardKind::Spike => "spike",
            HazardKind::Enemy(_) => "turtle",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    Star,
    PowerUp,
}

#[derive(Clone, Debug)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub position: Vec3,
    pub collected: bool,
}

/// Marks the entity drawn for the player.
#[derive(Component)]
pub struct PlayerVisual;

#[derive(Component)]
pub struct PlatformVisual;

/// Index into the level's hazard list.
#[derive(Component, Clone, Copy)]
pub struct HazardVisual(pub usize);

/// Index into the level's collectible list.
#[derive(Component, Clone, Copy)]
pub struct CollectibleVisual(pub usize);

#[derive(Component)]
pub struct BossVisual;

/// Arena floor and anything else that only exists during the encounter.
#[derive(Component)]
pub struct ArenaVisual;

#[derive(Component, Clone, Copy)]
pub struct EndingCubeVisual(pub usize);

/// Short-lived effect mesh, despawned when `remaining` runs out.
#[derive(Component)]
pub struct EffectVisual {
    pub remaining: f32,
    pub velocity: Vec3,
}
