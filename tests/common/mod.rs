//! In-process stand-in for the trading backend. Serves the REST endpoints the
//! panel calls and counts what it receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const GOOD_TOKEN: &str = "tok-1";
pub const USERNAME: &str = "trader";
pub const PASSWORD: &str = "Secret123";

#[derive(Default)]
pub struct Backend {
    pub alerts: Vec<Value>,
    pub trades: Vec<Value>,
    pub pnl: Vec<Value>,
    next_id: i64,
    /// POST /alerts attempts, authorized or not.
    pub alert_posts: usize,
    pub alert_lists: usize,
    pub requests: usize,
}

type Shared = Arc<Mutex<Backend>>;

pub struct MockBackend {
    pub url: String,
    state: Shared,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(seeded()));

        let app = Router::new()
            .route("/alerts", get(list_alerts).post(create_alert).put(update_alert).delete(delete_alert))
            .route("/alerts/toggle", patch(toggle_alert))
            .route("/stocks", get(list_trades).post(create_trade))
            .route("/pnl", get(list_pnl))
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/verify", get(verify))
            .route("/auth/logout", post(logout))
            .route("/auth/forgot-password", post(forgot_password))
            .route("/auth/reset-password", post(reset_password))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut Backend) -> T) -> T {
        f(&mut *self.state.lock().unwrap())
    }

    pub fn alert_posts(&self) -> usize {
        self.with(|b| b.alert_posts)
    }

    pub fn alert_lists(&self) -> usize {
        self.with(|b| b.alert_lists)
    }

    pub fn requests(&self) -> usize {
        self.with(|b| b.requests)
    }

    pub fn alert_active(&self, id: i64) -> Option<bool> {
        self.with(|b| {
            b.alerts
                .iter()
                .find(|a| a["id"] == id)
                .and_then(|a| a["is_active"].as_bool())
        })
    }
}

fn seeded() -> Backend {
    Backend {
        alerts: vec![json!({
            "id": 1,
            "symbol": "INFY",
            "alert_type": "PRICE_BELOW",
            "target_value": 1400.0,
            "condition": "<",
            "message": "buy the dip",
            "is_active": true,
            "created_at": "2024-01-10T09:15:00Z",
            "updated_at": "2024-01-10T09:15:00Z",
            "user_id": 1
        })],
        trades: vec![
            trade("NIFTY24JAN21500CE", "CALL", 21500.0, 120.5, "BUY", "2024-01-15T09:20:00Z"),
            trade("NIFTY24JAN21500CE", "CALL", 21500.0, 140.0, "SELL", "2024-01-15T14:05:00Z"),
            trade("NIFTY24JAN21400PE", "PUT", 21400.0, 80.0, "BUY", "2024-01-16T10:00:00Z"),
            trade("NIFTY24FEB22000CE", "CALL", 22000.0, 95.0, "BUY", "2024-02-01T11:30:00Z"),
        ],
        pnl: vec![
            json!({"date": "2024-01-15", "pnl": 1500.0}),
            json!({"date": "2024-01-16", "pnl": -500.0}),
            json!({"date": "2024-02-01", "pnl": 250.0}),
        ],
        next_id: 2,
        ..Backend::default()
    }
}

fn trade(symbol: &str, kind: &str, strike: f64, price: f64, side: &str, ts: &str) -> Value {
    json!({
        "symbol": symbol,
        "underlying_symbol": "NIFTY",
        "option_type": kind,
        "strike_price": strike,
        "expiry": "2024-01-25",
        "price": price,
        "side": side,
        "timestamp": ts
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {GOOD_TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"success": false, "message": "Unauthorized"}))).into_response()
}

#[derive(Deserialize)]
struct IdQuery {
    id: i64,
}

async fn list_alerts(State(s): State<Shared>, headers: HeaderMap) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }
    b.alert_lists += 1;
    Json(json!({"success": true, "alerts": b.alerts})).into_response()
}

async fn create_alert(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    b.alert_posts += 1;
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut alert = body;
    alert["id"] = json!(b.next_id);
    alert["is_active"] = json!(true);
    alert["user_id"] = json!(1);
    alert["created_at"] = json!("2024-01-12T10:00:00Z");
    alert["updated_at"] = json!("2024-01-12T10:00:00Z");
    b.next_id += 1;
    b.alerts.push(alert.clone());

    (
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Alert created successfully", "alert": alert})),
    )
        .into_response()
}

async fn update_alert(
    State(s): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<IdQuery>,
    Json(body): Json<Value>,
) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }

    let Some(alert) = b.alerts.iter_mut().find(|a| a["id"] == q.id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"success": false, "message": "Alert not found"}))).into_response();
    };
    if let (Some(dst), Some(src)) = (alert.as_object_mut(), body.as_object()) {
        for (k, v) in src {
            dst.insert(k.clone(), v.clone());
        }
    }
    let alert = alert.clone();
    Json(json!({"success": true, "message": "Alert updated successfully", "alert": alert})).into_response()
}

async fn delete_alert(State(s): State<Shared>, headers: HeaderMap, Query(q): Query<IdQuery>) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }
    b.alerts.retain(|a| a["id"] != q.id);
    Json(json!({"success": true, "message": "Alert deleted successfully"})).into_response()
}

async fn toggle_alert(State(s): State<Shared>, headers: HeaderMap, Query(q): Query<IdQuery>) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }
    let Some(alert) = b.alerts.iter_mut().find(|a| a["id"] == q.id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"success": false, "message": "Alert not found"}))).into_response();
    };
    let active = alert["is_active"].as_bool().unwrap_or(false);
    alert["is_active"] = json!(!active);
    Json(json!({"success": true, "message": "Alert status updated successfully"})).into_response()
}

async fn list_trades(State(s): State<Shared>, headers: HeaderMap) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(Value::Array(b.trades.clone())).into_response()
}

async fn create_trade(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut trade = body;
    trade["timestamp"] = json!("2024-02-02T09:30:00Z");
    b.trades.push(trade);
    (StatusCode::CREATED, Json(json!({"success": true}))).into_response()
}

async fn list_pnl(State(s): State<Shared>, headers: HeaderMap) -> Response {
    let mut b = s.lock().unwrap();
    b.requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(Value::Array(b.pnl.clone())).into_response()
}

async fn login(State(s): State<Shared>, Json(body): Json<Value>) -> Response {
    s.lock().unwrap().requests += 1;
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        return Json(json!({"token": GOOD_TOKEN, "message": "Login successful"})).into_response();
    }
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid username or password"}))).into_response()
}

async fn register(State(s): State<Shared>, Json(body): Json<Value>) -> Response {
    s.lock().unwrap().requests += 1;
    if body["username"] == "taken" {
        return (StatusCode::CONFLICT, Json(json!({"message": "Username already exists"}))).into_response();
    }
    (StatusCode::CREATED, Json(json!({"success": true, "message": "User registered"}))).into_response()
}

async fn verify(State(s): State<Shared>, headers: HeaderMap) -> Response {
    s.lock().unwrap().requests += 1;
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"valid": true})).into_response()
}

async fn logout(State(s): State<Shared>) -> Response {
    s.lock().unwrap().requests += 1;
    Json(json!({"success": true})).into_response()
}

async fn forgot_password(State(s): State<Shared>) -> Response {
    s.lock().unwrap().requests += 1;
    Json(json!({"success": true, "message": "If that email exists, a reset link is on its way."})).into_response()
}

async fn reset_password(State(s): State<Shared>, Json(body): Json<Value>) -> Response {
    s.lock().unwrap().requests += 1;
    if body["token"] != "reset-ok" {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Reset link is invalid or expired"}))).into_response();
    }
    Json(json!({"success": true, "message": "Password updated"})).into_response()
}
