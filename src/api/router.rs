use super::*;

pub(super) fn build_router(state: AppState, guard: AdminGuard) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/hud", get(get_hud))
        .route("/events", get(get_events))
        .route("/telemetry", get(get_telemetry))
        .route("/admin/settings", get(get_settings).post(set_settings))
        .route("/admin/teleport", post(teleport_player))
        .route("/admin/stars", post(set_stars))
        .route("/admin/health", post(set_health))
        .route("/admin/power_up", post(activate_power_up))
        .route("/admin/boss/skip_prep", post(skip_boss_prep))
        .route("/admin/boss/reset", post(reset_boss_fight))
        .route("/admin/boss/ability", post(trigger_boss_ability))
        .route("/admin/victory", post(force_victory))
        .route("/game/reset", post(reset_game))
        .with_state(state)
        .layer(middleware::from_fn_with_state(guard, admin_guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameTuning;
    use crate::session::GameSession;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tower::util::ServiceExt;

    /// Serves commands the way `process_api_commands` does, against a bare session.
    fn spawn_world(receiver: Receiver<ApiCommand>) -> std::thread::JoinHandle<PendingOverrides> {
        std::thread::spawn(move || {
            let session = Session(GameSession::new(GameTuning::default()));
            let bus = GameEventBus::default();
            let mut pending = PendingOverrides::default();
            let mut world = ApiWorld {
                session: &session,
                pending: &mut pending,
                bus: &bus,
                telemetry: None,
            };
            while let Ok(cmd) = receiver.recv() {
                handle_command(cmd, &mut world);
            }
            pending
        })
    }

    fn open_router() -> (Router, std::thread::JoinHandle<PendingOverrides>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let guard = AdminGuard::new(None, 1000);
        (build_router(AppState { sender: tx }, guard), spawn_world(rx))
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), 1 << 20)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn post(uri: &str, body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn state_reports_the_fresh_session() {
        let (app, world) = open_router();
        let req = HttpRequest::builder()
            .uri("/state")
            .body(Body::empty())
            .expect("request");
        let res = app.oneshot(req).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"]["player"]["lives"], 3);
        assert_eq!(json["data"]["state"]["state"], "playing");
        drop(world);
    }

    #[tokio::test]
    async fn admin_posts_queue_overrides_in_order() {
        let (app, world) = open_router();
        for (uri, body) in [
            ("/admin/settings", r#"{"god_mode": true, "size": "tiny"}"#),
            ("/admin/teleport", r#"{"x": 36.0, "y": 10.0, "z": 0.0}"#),
            ("/admin/boss/ability", r#"{"ability": "laser"}"#),
            ("/game/reset", ""),
        ] {
            let res = app.clone().oneshot(post(uri, body)).await.expect("response");
            let json = body_json(res).await;
            assert_eq!(json["ok"], true, "{uri}: {json}");
        }
        drop(app);
        let mut pending = world.join().expect("world thread");

        let source: &mut dyn crate::admin::OverrideSource = &mut pending;
        let queued = source.poll_overrides().expect("queued overrides");
        assert_eq!(queued.god_mode, Some(true));
        assert_eq!(queued.player_scale, Some(crate::admin::TINY_SCALE));
        assert_eq!(queued.teleport_to, Some(Vec3::new(36.0, 10.0, 0.0)));
        assert_eq!(
            queued.actions,
            vec![
                AdminAction::TriggerBossAbility(crate::boss::BossAbility::Laser),
                AdminAction::ResetLevel,
            ]
        );
        assert!(source.poll_overrides().is_none());
    }

    #[tokio::test]
    async fn invalid_overrides_are_rejected() {
        let (app, world) = open_router();
        let res = app
            .clone()
            .oneshot(post("/admin/settings", r#"{"time_scale": 0.0}"#))
            .await
            .expect("response");
        let json = body_json(res).await;
        assert_eq!(json["ok"], false);

        let res = app
            .clone()
            .oneshot(post("/admin/boss/ability", r#"{"ability": "tickle"}"#))
            .await
            .expect("response");
        assert_eq!(body_json(res).await["ok"], false);

        let res = app
            .oneshot(post("/admin/health", "{}"))
            .await
            .expect("response");
        assert_eq!(body_json(res).await["ok"], false);
        drop(world);
    }
}
