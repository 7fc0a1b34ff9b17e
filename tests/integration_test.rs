use std::net::SocketAddr;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_test::assert_ok;

use bloomscope::{routes, Config};

#[derive(Debug, Deserialize)]
struct Playback {
    state: String,
    index: usize,
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct Status {
    playback: Playback,
    total_records: usize,
}

/// Serve a freshly generated app on an ephemeral port.
async fn spawn_server() -> Result<String> {
    // ---
    let cfg = Config {
        records_per_region: 10,
        ..Config::default()
    };
    let app = routes::router(bloomscope::bootstrap(&cfg));

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(format!("http://{}", addr))
}

async fn post_action(client: &Client, base: &str, body: Value) -> Result<reqwest::Response> {
    Ok(client.post(format!("{}/actions", base)).json(&body).send().await?)
}

async fn bloom_count(client: &Client, base: &str) -> Result<usize> {
    let map: Value = client.get(format!("{}/map/map", base)).send().await?.json().await?;
    Ok(map["layers"]["blooms"]["markers"].as_array().map_or(0, Vec::len))
}

#[tokio::test]
async fn health_and_initial_scene() -> Result<()> {
    // ---
    let base = spawn_server().await?;
    let client = Client::new();

    let health: Value = client.get(format!("{}/health", base)).send().await?.json().await?;
    assert_eq!(health["status"], "ok");

    let status: Status = client.get(format!("{}/state", base)).send().await?.json().await?;
    assert_eq!(status.playback.state, "stopped");
    assert_eq!(status.playback.index, 0);
    assert_eq!(status.playback.speed, 1.0);
    assert!(status.total_records > 0);

    let map: Value = client.get(format!("{}/map/map", base)).send().await?.json().await?;
    let blooms = map["layers"]["blooms"]["markers"].as_array().unwrap();
    assert!(!blooms.is_empty());
    for marker in blooms {
        let radius = marker["style"]["radius"].as_u64().unwrap();
        assert!([8, 12, 16, 20].contains(&radius));
        assert!(marker["popup"].as_str().unwrap().contains("bloom-popup"));
    }

    let globe: Value = client.get(format!("{}/map/globe", base)).send().await?.json().await?;
    assert!(globe["layers"].get("climate").is_none());

    let missing = client.get(format!("{}/map/mars", base)).send().await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn filters_subset_rendered_markers() -> Result<()> {
    // ---
    let base = spawn_server().await?;
    let client = Client::new();

    let body = json!({"action": "set_intensity", "value": "high"});
    let resp = post_action(&client, &base, body).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let map: Value = client.get(format!("{}/map/map", base)).send().await?.json().await?;
    for marker in map["layers"]["blooms"]["markers"].as_array().unwrap() {
        assert_eq!(marker["style"]["fill_color"], "#FF8C00");
    }

    let stats: Value = client.get(format!("{}/stats", base)).send().await?.json().await?;
    let count = stats["count"].as_u64().unwrap();
    assert_eq!(stats["by_intensity"]["high"].as_u64().unwrap(), count);
    assert_eq!(stats["by_intensity"]["low"].as_u64().unwrap(), 0);

    let body = json!({"action": "set_region", "value": "europe"});
    let resp = post_action(&client, &base, body).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let map: Value = client.get(format!("{}/map/map", base)).send().await?.json().await?;
    assert_eq!(map["viewport"]["zoom"], 4);

    Ok(())
}

#[tokio::test]
async fn invalid_controls_are_rejected() -> Result<()> {
    // ---
    let base = spawn_server().await?;
    let client = Client::new();

    let body = json!({"action": "set_confidence", "value": 150});
    let resp = post_action(&client, &base, body).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json!({"action": "set_time_slider", "value": 12});
    let resp = post_action(&client, &base, body).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json!({"action": "set_region", "value": "atlantis"});
    let resp = post_action(&client, &base, body).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = post_action(&client, &base, json!({"action": "set_opacity", "value": 40})).await?;
    assert_ok!(resp.error_for_status_ref());

    Ok(())
}

#[tokio::test]
async fn playback_controls_round_trip() -> Result<()> {
    // ---
    let base = spawn_server().await?;
    let client = Client::new();
    let full_year = bloom_count(&client, &base).await?;

    let status: Status = post_action(&client, &base, json!({"action": "play"}))
        .await?
        .json()
        .await?;
    assert_eq!(status.playback.state, "playing");

    let status: Status = post_action(&client, &base, json!({"action": "pause"}))
        .await?
        .json()
        .await?;
    assert_eq!(status.playback.state, "stopped");

    let mut speed = 0.0;
    for _ in 0..4 {
        let status: Status = post_action(&client, &base, json!({"action": "change_speed"}))
            .await?
            .json()
            .await?;
        speed = status.playback.speed;
    }
    assert_eq!(speed, 1.0);

    let body = json!({"action": "set_time_slider", "value": 5});
    post_action(&client, &base, body).await?;
    let status: Status = post_action(&client, &base, json!({"action": "reset"}))
        .await?
        .json()
        .await?;
    assert_eq!(status.playback.state, "stopped");
    assert_eq!(status.playback.index, 0);
    // Reset drops the month selection, so the whole year is on the map again
    assert_eq!(bloom_count(&client, &base).await?, full_year);

    Ok(())
}

#[tokio::test]
async fn nearest_click_lookup() -> Result<()> {
    // ---
    let base = spawn_server().await?;
    let client = Client::new();

    // Middle of the South Pacific
    let far: Value = client
        .get(format!("{}/observations/nearest?lat=-40.0&lng=-130.0", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(far["found"], false);
    assert!(far["observation"].is_null());

    let map: Value = client.get(format!("{}/map/map", base)).send().await?.json().await?;
    let first = &map["layers"]["blooms"]["markers"][0]["position"];
    let url = format!(
        "{}/observations/nearest?lat={}&lng={}",
        base, first["lat"], first["lng"]
    );
    let hit: Value = client.get(url).send().await?.json().await?;
    assert_eq!(hit["found"], true);
    assert!(hit["distance_km"].as_f64().unwrap() < 1e-6);

    Ok(())
}
