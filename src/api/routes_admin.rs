use super::*;

async fn queue_overrides(state: &AppState, overrides: AdminOverrides) -> Json<ApiResponse<String>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let _ = state.sender.send(ApiCommand::Override(overrides, tx));
    match rx.await {
        Ok(Ok(())) => Json(ApiResponse::ok()),
        Ok(Err(e)) => Json(ApiResponse::err(e)),
        Err(_) => Json(ApiResponse::err("Channel closed")),
    }
}

pub(super) async fn set_settings(
    State(state): State<AppState>,
    Json(req): Json<SettingsRequest>,
) -> Json<ApiResponse<String>> {
    queue_overrides(&state, req.into()).await
}

pub(super) async fn teleport_player(
    State(state): State<AppState>,
    Json(req): Json<TeleportRequest>,
) -> Json<ApiResponse<String>> {
    queue_overrides(&state, req.into()).await
}

pub(super) async fn set_stars(
    State(state): State<AppState>,
    Json(req): Json<StarsRequest>,
) -> Json<ApiResponse<String>> {
    let overrides = AdminOverrides {
        star_count: Some(req.count),
        ..Default::default()
    };
    queue_overrides(&state, overrides).await
}

pub(super) async fn set_health(
    State(state): State<AppState>,
    Json(req): Json<HealthRequest>,
) -> Json<ApiResponse<String>> {
    if req.boss.is_none() && req.player.is_none() {
        return Json(ApiResponse::err("Provide 'boss' and/or 'player'"));
    }
    let overrides = AdminOverrides {
        boss_health: req.boss,
        player_health: req.player,
        ..Default::default()
    };
    queue_overrides(&state, overrides).await
}

pub(super) async fn activate_power_up(State(state): State<AppState>) -> Json<ApiResponse<String>> {
    queue_overrides(&state, AdminAction::ActivatePowerUp.into()).await
}

pub(super) async fn skip_boss_prep(State(state): State<AppState>) -> Json<ApiResponse<String>> {
    queue_overrides(&state, AdminAction::SkipBossPrep.into()).await
}

pub(super) async fn reset_boss_fight(State(state): State<AppState>) -> Json<ApiResponse<String>> {
    queue_overrides(&state, AdminAction::ResetBossFight.into()).await
}

pub(super) async fn trigger_boss_ability(
    State(state): State<AppState>,
    Json(req): Json<BossAbilityRequest>,
) -> Json<ApiResponse<String>> {
    match req.into_overrides() {
        Ok(overrides) => queue_overrides(&state, overrides).await,
        Err(e) => Json(ApiResponse::err(e)),
    }
}

pub(super) async fn force_victory(State(state): State<AppState>) -> Json<ApiResponse<String>> {
    queue_overrides(&state, AdminAction::ForceVictory.into()).await
}

pub(super) async fn reset_game(State(state): State<AppState>) -> Json<ApiResponse<String>> {
    queue_overrides(&state, AdminAction::ResetLevel.into()).await
}
