mod command_runtime;
mod commands;
mod router;
mod routes_admin;
mod routes_core;
mod security;
mod state;
pub mod types;

use axum::{
    extract::Request,
    extract::State,
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::admin::{AdminAction, AdminOverrides, AdminSettings, PendingOverrides};
use crate::events::{GameEvent, GameEventBus};
use crate::game_runtime::Session;
use crate::snapshot::{HudState, SessionSnapshot};
use crate::telemetry::GameplayTelemetry;
use command_runtime::*;
use commands::*;
use router::build_router;
use routes_admin::*;
use routes_core::*;
use security::*;
use state::*;
use types::*;

const DEFAULT_API_ADDR: &str = "127.0.0.1:3000";

pub struct ApiPlugin;

impl Plugin for ApiPlugin {
    fn build(&self, app: &mut App) {
        let (tx, rx) = crossbeam_channel::unbounded::<ApiCommand>();

        app.insert_resource(ApiChannels { receiver: rx })
            .add_systems(Update, process_api_commands);

        let state = AppState { sender: tx };
        let guard = AdminGuard::from_env();
        let addr = std::env::var("CLAIRE_API_ADDR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_ADDR.to_string());
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let app = build_router(state, guard);

                let listener = match tokio::net::TcpListener::bind(&addr).await {
                    Ok(listener) => listener,
                    Err(e) => {
                        error!("[Claire API] Failed to bind {}: {}", addr, e);
                        return;
                    }
                };

                info!("[Claire API] Listening on http://{}", addr);

                if let Err(e) = axum::serve(listener, app).await {
                    error!("[Claire API] Server stopped: {}", e);
                }
            });
        });
    }
}
