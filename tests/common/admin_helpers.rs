use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde_json::{json, Value};
use uuid::Uuid;

use matchday_backend::models::user::UserRole;
use matchday_backend::store::paths;

use crate::common::utils::{get_data, make_authenticated_request, register_user, TestApp, TestUser};

/// Registers a user and promotes them the way an operator would, by
/// writing the role straight into the store.
pub async fn create_admin_user(app: &TestApp) -> TestUser {
    let admin = register_user(&app.address, "Admin").await;
    app.store
        .write(&paths::user_role(admin.user_id), &UserRole::Privileged)
        .expect("Failed to promote user to admin");
    admin
}

pub async fn register_players(app: &TestApp, names: &[&str]) -> Vec<TestUser> {
    let mut players = Vec::new();
    for name in names {
        players.push(register_user(&app.address, name).await);
    }
    players
}

pub async fn admin_request(app: &TestApp, admin: &TestUser, method: Method, path: &str, body: Option<Value>) -> Response {
    let client = Client::new();
    make_authenticated_request(&client, method, &format!("{}/admin{}", app.address, path), &admin.token, body).await
}

pub async fn draw_teams(app: &TestApp, admin: &TestUser, players: &[TestUser], force: bool) -> Value {
    let player_ids: Vec<Uuid> = players.iter().map(|p| p.user_id).collect();
    let response = admin_request(
        app,
        admin,
        Method::POST,
        "/teams/draw",
        Some(json!({ "player_ids": player_ids, "force": force })),
    )
    .await;
    assert_eq!(200, response.status().as_u16(), "Draw should succeed");
    let body: Value = response.json().await.expect("Failed to parse draw response");
    body["data"].clone()
}

pub async fn create_match(app: &TestApp, admin: &TestUser, duration_minutes: u32, halves: u8) -> Value {
    let response = admin_request(
        app,
        admin,
        Method::POST,
        "/match",
        Some(json!({ "duration_minutes": duration_minutes, "halves": halves })),
    )
    .await;
    assert_eq!(201, response.status().as_u16(), "Match creation should succeed");
    let body: Value = response.json().await.expect("Failed to parse match response");
    body["data"].clone()
}

/// Polls `GET /match` until the scheduler has flipped the countdown.
pub async fn wait_for_status(app: &TestApp, token: &str, status: &str) -> Value {
    for _ in 0..100 {
        let data = get_data(&app.address, "/match", token).await;
        if data["match"]["status"] == status {
            return data;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Match never reached status {}", status);
}

pub async fn start_match(app: &TestApp, admin: &TestUser, players: &[TestUser]) -> Value {
    draw_teams(app, admin, players, true).await;
    create_match(app, admin, 10, 2).await;
    wait_for_status(app, &admin.token, "active").await["match"].clone()
}

/// Team number (1 or 2) of `player_id` in a match or draw payload.
pub fn team_of(match_state: &Value, player_id: Uuid) -> u8 {
    let id = Value::String(player_id.to_string());
    let on = |key: &str| {
        match_state[key]
            .as_array()
            .map(|ids| ids.contains(&id))
            .unwrap_or(false)
    };
    if on("team1_ids") {
        1
    } else if on("team2_ids") {
        2
    } else {
        panic!("Player {} is not in the match", player_id);
    }
}
