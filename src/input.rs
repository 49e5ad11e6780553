use bevy::prelude::*;
use std::collections::HashSet;

/// Abstraction layer between raw input and the session.
/// The keyboard writes to this in windowed mode; in headless mode it stays
/// empty unless something else (tests, the admin API) fills it.
#[derive(Resource, Default, Clone)]
pub struct VirtualInput {
    pub active: HashSet<String>,
    /// False until a device has written at least once.
    pub connected: bool,
}

impl VirtualInput {
    pub fn pressed(&self, action: &str) -> bool {
        self.active.contains(action)
    }

    pub fn press(&mut self, action: &str) {
        self.connected = true;
        self.active.insert(action.to_string());
    }

    /// One normalized snapshot for the next tick, `None` while no device is attached.
    pub fn snapshot(&self) -> Option<FrameInput> {
        if !self.connected {
            return None;
        }
        let axis = |neg: &str, pos: &str| {
            let mut v = 0.0;
            if self.pressed(neg) {
                v -= 1.0;
            }
            if self.pressed(pos) {
                v += 1.0;
            }
            v
        };
        Some(FrameInput {
            move_x: axis("left", "right"),
            move_z: axis("forward", "back"),
            jump: self.pressed("jump"),
            fly_up: self.pressed("fly_up"),
            fly_down: self.pressed("fly_down"),
            abilities: AbilityKeys {
                dagger: self.pressed("dagger"),
                heal: self.pressed("heal"),
                sonic: self.pressed("sonic"),
            },
            cheat_power_up: self.pressed("cheat_power_up"),
            cheat_teleport: self.pressed("cheat_teleport"),
            restart: self.pressed("restart"),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbilityKeys {
    pub dagger: bool,
    pub heal: bool,
    pub sonic: bool,
}

/// Held-state snapshot read once per tick. Edges are derived by the session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub move_x: f32,
    pub move_z: f32,
    pub jump: bool,
    pub fly_up: bool,
    pub fly_down: bool,
    pub abilities: AbilityKeys,
    pub cheat_power_up: bool,
    pub cheat_teleport: bool,
    /// New game once the match has ended.
    pub restart: bool,
}

/// Previous-frame flags for everything that acts on key-down only.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputEdges {
    prev: FrameInput,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PressedEdges {
    pub jump: bool,
    pub abilities: AbilityKeys,
    pub cheat_power_up: bool,
    pub cheat_teleport: bool,
    pub restart: bool,
}

impl InputEdges {
    pub fn update(&mut self, input: &FrameInput) -> PressedEdges {
        let prev = self.prev;
        self.prev = *input;
        PressedEdges {
            jump: input.jump && !prev.jump,
            abilities: AbilityKeys {
                dagger: input.abilities.dagger && !prev.abilities.dagger,
                heal: input.abilities.heal && !prev.abilities.heal,
                sonic: input.abilities.sonic && !prev.abilities.sonic,
            },
            cheat_power_up: input.cheat_power_up && !prev.cheat_power_up,
            cheat_teleport: input.cheat_teleport && !prev.cheat_teleport,
            restart: input.restart && !prev.restart,
        }
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(VirtualInput::default()).add_systems(
            PreUpdate,
            keyboard_to_virtual.run_if(resource_exists::<ButtonInput<KeyCode>>),
        );
    }
}

/// Translate keyboard input to VirtualInput action names
fn keyboard_to_virtual(keyboard: Res<ButtonInput<KeyCode>>, mut vinput: ResMut<VirtualInput>) {
    vinput.active.clear();
    vinput.connected = true;

    let bindings: [(&str, &[KeyCode]); 13] = [
        ("left", &[KeyCode::KeyA, KeyCode::ArrowLeft]),
        ("right", &[KeyCode::KeyD, KeyCode::ArrowRight]),
        ("forward", &[KeyCode::KeyW, KeyCode::ArrowUp]),
        ("back", &[KeyCode::KeyS, KeyCode::ArrowDown]),
        // Space doubles as jump and fly-up; the session picks by mode
        ("jump", &[KeyCode::Space]),
        ("fly_up", &[KeyCode::Space]),
        ("fly_down", &[KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        ("dagger", &[KeyCode::Digit1]),
        ("heal", &[KeyCode::Digit2]),
        ("sonic", &[KeyCode::Digit3]),
        ("cheat_power_up", &[KeyCode::KeyP]),
        ("cheat_teleport", &[KeyCode::KeyE]),
        ("restart", &[KeyCode::KeyR, KeyCode::Enter]),
    ];
    for (action, keys) in bindings {
        if keys.iter().any(|k| keyboard.pressed(*k)) {
            vinput.press(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_none_until_a_device_writes() {
        let mut input = VirtualInput::default();
        assert!(input.snapshot().is_none());
        input.press("right");
        input.press("forward");
        let snap = input.snapshot().expect("connected");
        assert_eq!(snap.move_x, 1.0);
        assert_eq!(snap.move_z, -1.0);
    }

    #[test]
    fn edges_fire_once_per_press() {
        let mut edges = InputEdges::default();
        let held = FrameInput {
            jump: true,
            abilities: AbilityKeys {
                dagger: true,
                ..default()
            },
            ..default()
        };
        let first = edges.update(&held);
        assert!(first.jump);
        assert!(first.abilities.dagger);
        let second = edges.update(&held);
        assert!(!second.jump);
        assert!(!second.abilities.dagger);
        edges.update(&FrameInput::default());
        assert!(edges.update(&held).jump);
    }

    #[test]
    fn keyboard_maps_to_actions() {
        let mut app = App::new();
        app.insert_resource(ButtonInput::<KeyCode>::default())
            .add_plugins(InputPlugin);
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::KeyD);
            keys.press(KeyCode::Space);
            keys.press(KeyCode::Digit3);
            keys.press(KeyCode::Enter);
        }
        app.update();
        let vinput = app.world().resource::<VirtualInput>();
        let snap = vinput.snapshot().expect("keyboard attached");
        assert_eq!(snap.move_x, 1.0);
        assert!(snap.jump);
        assert!(snap.fly_up);
        assert!(snap.abilities.sonic);
        assert!(!snap.abilities.dagger);
        assert!(snap.restart);
    }
}
