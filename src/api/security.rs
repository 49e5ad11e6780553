use axum::http::{HeaderMap, Method};
use std::time::Instant;

use super::*;

/// Admin writes per second per client. Each write becomes one override batch
/// on the next tick, so anything past a couple of ticks' worth is noise.
pub(super) const DEFAULT_ADMIN_WRITES_PER_SEC: u32 = 30;

/// Guards the mutating half of the API. Reads (`GET /state`, `/hud`, ...)
/// stay open so a spectator page can poll without the admin token.
#[derive(Clone)]
pub(super) struct AdminGuard {
    admin_token: Option<String>,
    writes_per_sec: u32,
    windows: Arc<Mutex<HashMap<String, WriteWindow>>>,
}

struct WriteWindow {
    opened: Instant,
    writes: u32,
}

enum Rejection {
    Unauthorized,
    TooManyWrites,
    LimiterPoisoned,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Rejection::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Admin writes need Authorization: Bearer <CLAIRE_API_TOKEN> or x-api-key",
            ),
            Rejection::TooManyWrites => (StatusCode::TOO_MANY_REQUESTS, "Too many admin writes"),
            Rejection::LimiterPoisoned => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Write limiter unavailable")
            }
        };
        (status, Json(ApiResponse::err(message))).into_response()
    }
}

impl AdminGuard {
    pub(super) fn new(admin_token: Option<String>, writes_per_sec: u32) -> Self {
        Self {
            admin_token,
            writes_per_sec: writes_per_sec.max(1),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(super) fn from_env() -> Self {
        let token = std::env::var("CLAIRE_API_TOKEN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let writes_per_sec = std::env::var("CLAIRE_API_RATE_LIMIT_PER_SEC")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_ADMIN_WRITES_PER_SEC);
        if token.is_none() {
            warn!("[Claire API] CLAIRE_API_TOKEN unset; admin writes are open");
        }
        Self::new(token, writes_per_sec)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Rejection> {
        let Some(expected) = self.admin_token.as_deref() else {
            return Ok(());
        };
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };
        let bearer = header("authorization").and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        });
        if bearer == Some(expected) || header("x-api-key") == Some(expected) {
            Ok(())
        } else {
            Err(Rejection::Unauthorized)
        }
    }

    fn admit_write(&self, client: String) -> Result<(), Rejection> {
        let mut windows = self.windows.lock().map_err(|_| Rejection::LimiterPoisoned)?;
        let now = Instant::now();
        let window = windows.entry(client).or_insert(WriteWindow {
            opened: now,
            writes: 0,
        });
        if now.duration_since(window.opened).as_secs_f32() >= 1.0 {
            window.opened = now;
            window.writes = 0;
        }
        window.writes = window.writes.saturating_add(1);
        let over = window.writes > self.writes_per_sec;
        // forget clients idle for a while
        if windows.len() > 256 {
            windows.retain(|_, w| now.duration_since(w.opened).as_secs_f32() < 10.0);
        }
        if over {
            Err(Rejection::TooManyWrites)
        } else {
            Ok(())
        }
    }
}

fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "local".to_string())
}

pub(super) async fn admin_guard(
    State(guard): State<AdminGuard>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    if req.method() == Method::GET {
        return next.run(req).await;
    }
    let checked = guard
        .authorize(req.headers())
        .and_then(|()| guard.admit_write(client_key(req.headers())));
    match checked {
        Ok(()) => next.run(req).await,
        Err(rejection) => rejection.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tower::util::ServiceExt;

    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn guarded(token: Option<&str>, writes_per_sec: u32) -> Router {
        Router::new()
            .route("/state", get(ok_handler))
            .route("/admin/stars", post(ok_handler))
            .layer(middleware::from_fn_with_state(
                AdminGuard::new(token.map(str::to_string), writes_per_sec),
                admin_guard,
            ))
    }

    fn write(headers: &[(&str, &str)]) -> HttpRequest<Body> {
        let mut req = HttpRequest::builder().method("POST").uri("/admin/stars");
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn reads_stay_open_when_a_token_is_set() {
        let app = guarded(Some("secret"), 1);
        for _ in 0..3 {
            let req = HttpRequest::builder()
                .uri("/state")
                .body(Body::empty())
                .expect("request");
            let res = app.clone().oneshot(req).await.expect("response");
            assert_eq!(res.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn writes_need_the_admin_token() {
        let app = guarded(Some("secret"), 100);
        let res = app.clone().oneshot(write(&[])).await.expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .clone()
            .oneshot(write(&[("authorization", "Bearer nope")]))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .clone()
            .oneshot(write(&[("authorization", "Bearer secret")]))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .oneshot(write(&[("x-api-key", "secret")]))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn writes_are_limited_per_client() {
        let app = guarded(None, 1);
        let res = app
            .clone()
            .oneshot(write(&[("x-real-ip", "10.0.0.1")]))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .clone()
            .oneshot(write(&[("x-real-ip", "10.0.0.1")]))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        let res = app
            .oneshot(write(&[("x-forwarded-for", "10.0.0.2, 172.16.0.1")]))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
    }
}
