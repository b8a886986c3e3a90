mod common;
use std::collections::HashSet;

use common::admin_helpers::{admin_request, create_admin_user, draw_teams, register_players};
use common::utils::{get_data, spawn_app};
use reqwest::Method;
use serde_json::{json, Value};
use uuid::Uuid;

fn ids(value: &Value) -> HashSet<String> {
    value
        .as_array()
        .expect("Expected a list of ids")
        .iter()
        .map(|id| id.as_str().expect("Expected an id").to_string())
        .collect()
}

#[tokio::test]
async fn even_draw_splits_players_into_equal_teams() {
    // Arrange
    let app = spawn_app().await;
    let admin = create_admin_user(&app).await;
    let players = register_players(&app, &["Ana", "Bruno", "Carla", "Dario", "Eva", "Filipe"]).await;

    // Act
    let outcome = draw_teams(&app, &admin, &players, false).await;

    // Assert
    assert_eq!(outcome["outcome"], "drawn");
    let teams = get_data(&app.address, "/teams", &admin.token).await;
    let team1 = ids(&teams["team1"]);
    let team2 = ids(&teams["team2"]);
    assert_eq!(team1.len(), 3);
    assert_eq!(team2.len(), 3);
    assert!(team1.is_disjoint(&team2));
    let expected: HashSet<String> = players.iter().map(|p| p.user_id.to_string()).collect();
    assert_eq!(&team1 | &team2, expected);
}

#[tokio::test]
async fn odd_draw_needs_confirmation_and_writes_nothing() {
    // Arrange
    let app = spawn_app().await;
    let admin = create_admin_user(&app).await;
    let players = register_players(&app, &["Ana", "Bruno", "Carla", "Dario", "Eva"]).await;

    // Act
    let outcome = draw_teams(&app, &admin, &players, false).await;

    // Assert
    assert_eq!(outcome["outcome"], "needs_confirmation");
    assert_eq!(outcome["player_count"], 5);
    let teams = get_data(&app.address, "/teams", &admin.token).await;
    assert!(ids(&teams["team1"]).is_empty());
    assert!(ids(&teams["team2"]).is_empty());

    // Confirming writes a 3/2 split
    let confirmed = draw_teams(&app, &admin, &players, true).await;
    assert_eq!(confirmed["outcome"], "drawn");
    let teams = get_data(&app.address, "/teams", &admin.token).await;
    let mut sizes = [ids(&teams["team1"]).len(), ids(&teams["team2"]).len()];
    sizes.sort_unstable();
    assert_eq!(sizes, [2, 3]);
}

#[tokio::test]
async fn draw_with_fewer_than_two_players_is_rejected() {
    // Arrange
    let app = spawn_app().await;
    let admin = create_admin_user(&app).await;
    let players = register_players(&app, &["Ana"]).await;

    for player_ids in [vec![], vec![players[0].user_id], vec![players[0].user_id, players[0].user_id]] {
        // Act
        let response = admin_request(
            &app,
            &admin,
            Method::POST,
            "/teams/draw",
            Some(json!({ "player_ids": player_ids, "force": true })),
        )
        .await;

        // Assert
        assert_eq!(422, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], "insufficient_players");
    }
}

#[tokio::test]
async fn draw_with_unknown_player_is_rejected() {
    // Arrange
    let app = spawn_app().await;
    let admin = create_admin_user(&app).await;
    let players = register_players(&app, &["Ana"]).await;

    // Act
    let response = admin_request(
        &app,
        &admin,
        Method::POST,
        "/teams/draw",
        Some(json!({ "player_ids": [players[0].user_id, Uuid::new_v4()] })),
    )
    .await;

    // Assert
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "unknown_player");
}

#[tokio::test]
async fn clearing_teams_empties_the_assignment() {
    // Arrange
    let app = spawn_app().await;
    let admin = create_admin_user(&app).await;
    let players = register_players(&app, &["Ana", "Bruno"]).await;
    draw_teams(&app, &admin, &players, false).await;

    // Act
    let response = admin_request(&app, &admin, Method::DELETE, "/teams", None).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let teams = get_data(&app.address, "/teams", &admin.token).await;
    assert!(ids(&teams["team1"]).is_empty());
    assert!(teams["assignment"].as_object().map(|a| a.is_empty()).unwrap_or(true));
}
