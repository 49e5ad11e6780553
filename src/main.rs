#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

mod admin;
#[cfg(not(target_arch = "wasm32"))]
mod api;
mod boss;
mod camera;
mod components;
mod config;
mod events;
mod game_runtime;
mod hazards;
mod input;
mod level;
mod lives;
mod physics_core;
mod power_up;
mod render;
mod session;
mod snapshot;
mod telemetry;
mod ui;

use bevy::prelude::*;
use components::HeadlessMode;
use config::GameTuning;

#[derive(serde::Deserialize, Default)]
struct StartupConfig {
    window_title: Option<String>,
    window_width: Option<f32>,
    window_height: Option<f32>,
    background_color: Option<[f32; 3]>,
    #[serde(default)]
    tuning: GameTuning,
}

fn load_startup_config() -> StartupConfig {
    let path = std::env::var("CLAIRE_GAME_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "claire.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<StartupConfig>(&contents) {
            Ok(cfg) => {
                println!("[Claire] Loaded startup config from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("[Claire] Failed to parse {}: {}", path, e);
                StartupConfig::default()
            }
        },
        Err(_) => StartupConfig::default(),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");

    let startup_config = load_startup_config();
    let mut app = App::new();

    app.insert_resource(HeadlessMode(headless));

    if headless {
        // No window or renderer; the session still ticks and the API still answers
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(bevy::log::LogPlugin::default());
        println!("[Claire] Starting in HEADLESS mode");
    } else {
        let window_title = startup_config
            .window_title
            .unwrap_or_else(|| "Claire's Adventure".to_string());
        let window_width = startup_config.window_width.unwrap_or(1280.0);
        let window_height = startup_config.window_height.unwrap_or(720.0);

        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: window_title,
                resolution: (window_width, window_height).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }));
        let bg = startup_config.background_color.unwrap_or([0.53, 0.81, 0.92]);
        app.insert_resource(ClearColor(Color::srgb(bg[0], bg[1], bg[2])));
        app.add_plugins(render::RenderPlugin);
        println!("[Claire] Starting in WINDOWED mode");
    }

    app.insert_resource(startup_config.tuning)
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .add_plugins(input::InputPlugin)
        .add_plugins(game_runtime::SessionPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(ui::HudPlugin)
        .add_plugins(telemetry::TelemetryPlugin);

    #[cfg(not(target_arch = "wasm32"))]
    app.add_plugins(api::ApiPlugin);

    app.run();
}
