//! HTTP API tests driven through the router without a socket

use axum::body::Body;
use axum::http::{Request, StatusCode};
use farecast_core::features::NUMERIC_FIELDS;
use farecast_core::{Airline, ForestModel, ModelMetadata, Node, Tree};
use farecast_server::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Target fare per airline, in `Airline::ALL` order
const FARES: [f64; 6] = [4512.0, 6120.0, 5300.0, 4200.0, 3999.0, 12345.0];

const BASE: f64 = 3000.0;

fn feature_names() -> Vec<String> {
    NUMERIC_FIELDS
        .iter()
        .map(|s| s.to_string())
        .chain(Airline::ALL.iter().map(|a| a.column().to_string()))
        .collect()
}

/// One stump per airline column. Averaging six stumps yields exactly the
/// airline's entry in `FARES`.
fn airline_model() -> ForestModel {
    let names = feature_names();
    let n = FARES.len() as f64;

    let trees = Airline::ALL
        .iter()
        .zip(FARES)
        .map(|(airline, fare)| {
            let column = names.iter().position(|c| c == airline.column()).unwrap() as i32;
            let hit = fare * n - BASE * (n - 1.0);
            Tree::new(vec![
                Node::internal(column, 0.5, 1, 2),
                Node::leaf(BASE),
                Node::leaf(hit),
            ])
        })
        .collect();

    ForestModel::new(names, trees, ModelMetadata::default())
}

fn app(model: ForestModel) -> axum::Router {
    build_router(Arc::new(AppState::new(model)))
}

async fn post_json(model: ForestModel, body: impl Into<String>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict-api")
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap();

    let response = app(model).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn valid_body() -> Value {
    json!({
        "source_code": "DEL",
        "dest_code": "BOM",
        "day": 15,
        "month": 8,
        "year": 2024,
        "dep_hour": 9,
        "arr_hour": 11
    })
}

#[tokio::test]
async fn test_predict_ranks_all_airlines() {
    let (status, payload) = post_json(airline_model(), valid_body().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["route"], "DEL → BOM");
    assert_eq!(payload["journey_date"], "15 Aug 2024");

    let results = payload["results"].as_array().unwrap();
    assert_eq!(results.len(), 6);

    let names: Vec<&str> = results
        .iter()
        .map(|r| r["airline_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["GoAir", "SpiceJet", "IndiGo", "Vistara", "Air India", "Trujet"]
    );

    let prices: Vec<&str> = results.iter().map(|r| r["price"].as_str().unwrap()).collect();
    assert_eq!(prices, vec!["3,999", "4,200", "4,512", "5,300", "6,120", "12,345"]);

    let numeric: Vec<i64> = prices
        .iter()
        .map(|p| p.replace(',', "").parse().unwrap())
        .collect();
    assert!(numeric.windows(2).all(|w| w[0] <= w[1]));

    for result in results {
        assert_eq!(result["duration"], 120);
        assert_eq!(result["stops"], 0);
    }
}

#[tokio::test]
async fn test_overnight_duration() {
    let mut body = valid_body();
    body["dep_hour"] = json!(22);
    body["arr_hour"] = json!(2);

    let (_, payload) = post_json(airline_model(), body.to_string()).await;
    let results = payload["results"].as_array().unwrap();
    assert!(results.iter().all(|r| r["duration"] == 240));
}

#[tokio::test]
async fn test_string_numbers_are_accepted() {
    let body = r#"{"source_code":"BOM","dest_code":"DEL","day":"1","month":" 12 ","year":"2024","dep_hour":"6","arr_hour":"14"}"#;
    let (_, payload) = post_json(airline_model(), body).await;

    assert_eq!(payload["status"], "success");
    assert_eq!(payload["journey_date"], "01 Dec 2024");
    assert_eq!(payload["results"][0]["duration"], 480);
}

#[tokio::test]
async fn test_unknown_city_envelope() {
    let mut body = valid_body();
    body["source_code"] = json!("XXX");

    let (status, payload) = post_json(airline_model(), body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["code"], "VALIDATION_ERROR");
    let error = payload["error"].as_str().unwrap();
    assert!(error.starts_with("Model prediction failed: "));
    assert!(error.contains("XXX"));
    assert!(payload.get("results").is_none());
}

#[tokio::test]
async fn test_missing_field_envelope() {
    let mut body = valid_body();
    body.as_object_mut().unwrap().remove("year");

    let (status, payload) = post_json(airline_model(), body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["code"], "VALIDATION_ERROR");
    assert!(payload["error"].as_str().unwrap().contains("year"));
}

#[tokio::test]
async fn test_malformed_json_envelope() {
    let (status, payload) = post_json(airline_model(), "{not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_date_envelope() {
    let mut body = valid_body();
    body["day"] = json!(31);
    body["month"] = json!(2);

    let (_, payload) = post_json(airline_model(), body.to_string()).await;
    assert_eq!(payload["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_hour_out_of_range_envelope() {
    let mut body = valid_body();
    body["arr_hour"] = json!(25);

    let (_, payload) = post_json(airline_model(), body.to_string()).await;
    assert_eq!(payload["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_empty_forest_is_unavailable() {
    let model = ForestModel::new(feature_names(), Vec::new(), ModelMetadata::default());
    let (_, payload) = post_json(model, valid_body().to_string()).await;
    assert_eq!(payload["code"], "MODEL_UNAVAILABLE");
}

#[tokio::test]
async fn test_non_finite_prediction_is_internal() {
    let tree = Tree::new(vec![Node::leaf(f64::INFINITY)]);
    let model = ForestModel::new(feature_names(), vec![tree], ModelMetadata::default());

    let (_, payload) = post_json(model, valid_body().to_string()).await;
    assert_eq!(payload["code"], "INTERNAL_PREDICTION_ERROR");
}

#[tokio::test]
async fn test_schema_without_some_airlines() {
    // Only IndiGo was seen in training; other airlines fall through to BASE
    let mut names: Vec<String> = NUMERIC_FIELDS.iter().map(|s| s.to_string()).collect();
    names.push(Airline::IndiGo.column().to_string());
    let column = (names.len() - 1) as i32;
    let tree = Tree::new(vec![
        Node::internal(column, 0.5, 1, 2),
        Node::leaf(BASE),
        Node::leaf(1000.0),
    ]);
    let model = ForestModel::new(names, vec![tree], ModelMetadata::default());

    let (_, payload) = post_json(model, valid_body().to_string()).await;
    let results = payload["results"].as_array().unwrap();

    assert_eq!(results.len(), 6);
    assert_eq!(results[0]["airline_name"], "IndiGo");
    assert_eq!(results[0]["price"], "1,000");
    // Ties keep airline-list order
    let rest: Vec<&str> = results[1..]
        .iter()
        .map(|r| r["airline_name"].as_str().unwrap())
        .collect();
    assert_eq!(rest, vec!["Air India", "Vistara", "SpiceJet", "GoAir", "Trujet"]);
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app(airline_model()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload["status"], "healthy");
    assert_eq!(payload["service"], "farecast-server");
    assert_eq!(payload["model"]["trees"], 6);
    assert_eq!(payload["model"]["features"], 17);
}

#[tokio::test]
async fn test_static_pages() {
    for uri in ["/", "/predict"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app(airline_model()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("<html"));
    }
}
