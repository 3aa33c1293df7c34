use car_rental_api::auth::IdentityGate;
use car_rental_api::handlers;
use car_rental_api::repository::InMemoryCarStore;
use car_rental_api::state::AppState;
use reqwest::Client;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const TEST_SECRET: &str = "integration-test-secret";

const OWNER: &str = "a@x.com";
const RENTER: &str = "b@x.com";

/// Spawns the API on an ephemeral port backed by the in-memory store.
async fn create_test_server() -> (SocketAddr, IdentityGate) {
    let gate = IdentityGate::new(TEST_SECRET);
    let state = AppState::new(Arc::new(InMemoryCarStore::new()), gate.clone());
    let app = handlers::router().with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Create a shutdown signal that will never trigger (test will complete first)
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown = async {
        rx.await.ok();
    };

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .unwrap();
    });

    // Verify server is actually listening before handing it to the test
    let mut retries = 0;
    while retries < 10 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        retries += 1;
    }

    // Prevent tx from being dropped (which would trigger shutdown)
    std::mem::forget(tx);

    (addr, gate)
}

fn car_body(name: &str, price: f64) -> serde_json::Value {
    json!({
        "car_name": name,
        "category": "Sedan",
        "year": 2022,
        "price_per_day": price,
        "description": "Well maintained",
        "image_url": "https://example.com/car.jpg",
        "location": "Dhaka",
        "transmission": "Automatic",
        "fuel_type": "Petrol",
        "seats": 5,
        "doors": 4
    })
}

async fn add_car(
    client: &Client,
    addr: SocketAddr,
    token: &str,
    name: &str,
    price: f64,
) -> serde_json::Value {
    let response = client
        .post(format!("http://{}/add-car", addr))
        .bearer_auth(token)
        .json(&car_body(name, price))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201, "add-car should return 201 Created");
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_health_endpoint_should_report_healthy() {
    let (addr, _) = create_test_server().await;
    let client = Client::new();

    let response = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_mutating_request_without_token_should_be_unauthenticated() {
    let (addr, _) = create_test_server().await;
    let client = Client::new();

    let response = client
        .post(format!("http://{}/add-car", addr))
        .json(&car_body("Civic", 60.0))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(format!("http://{}/add-car", addr))
        .bearer_auth("garbage-token")
        .json(&car_body("Civic", 60.0))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_add_car_with_invalid_price_should_be_rejected() {
    let (addr, gate) = create_test_server().await;
    let client = Client::new();
    let token = gate.issue(OWNER).unwrap();

    let response = client
        .post(format!("http://{}/add-car", addr))
        .bearer_auth(&token)
        .json(&car_body("Civic", 0.0))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_full_listing_and_booking_lifecycle() {
    let (addr, gate) = create_test_server().await;
    let client = Client::new();
    let owner_token = gate.issue(OWNER).unwrap();
    let renter_token = gate.issue(RENTER).unwrap();

    // Owner creates the listing
    let car = add_car(&client, addr, &owner_token, "Civic", 60.0).await;
    let id = car["id"].as_str().unwrap().to_string();
    assert_eq!(car["status"], "Available");

    // Owner sees it under /mylisting/
    let response = client
        .get(format!("http://{}/mylisting/?email={}", addr, OWNER))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let mine: serde_json::Value = response.json().await.unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["id"].as_str().unwrap(), id);

    // Renter books the car
    let response = client
        .patch(format!("http://{}/car-book/{}", addr, id))
        .bearer_auth(&renter_token)
        .json(&json!({ "booked_by": RENTER }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let booked: serde_json::Value = response.json().await.unwrap();
    assert_eq!(booked["status"], "Booked");
    assert_eq!(booked["booked_by"], RENTER);

    // The booking shows under /my-bookings/ with the { result: [...] } shape
    let response = client
        .get(format!("http://{}/my-bookings/?email={}", addr, RENTER))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let bookings: serde_json::Value = response.json().await.unwrap();
    assert_eq!(bookings["result"].as_array().unwrap().len(), 1);
    assert_eq!(bookings["result"][0]["id"].as_str().unwrap(), id);

    // Deleting a booked listing conflicts
    let response = client
        .delete(format!("http://{}/mylisting/{}", addr, id))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Renter cancels
    let response = client
        .patch(format!("http://{}/my-bookings/{}", addr, id))
        .bearer_auth(&renter_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let cancelled: serde_json::Value = response.json().await.unwrap();
    assert_eq!(cancelled["status"], "Available");
    assert!(cancelled["booked_by"].is_null());

    // Now the delete goes through
    let response = client
        .delete(format!("http://{}/mylisting/{}", addr, id))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    // And the car is gone
    let response = client
        .get(format!("http://{}/car-details/{}", addr, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_double_booking_should_conflict_with_structured_error() {
    let (addr, gate) = create_test_server().await;
    let client = Client::new();
    let owner_token = gate.issue(OWNER).unwrap();
    let renter_token = gate.issue(RENTER).unwrap();
    let other_token = gate.issue("c@x.com").unwrap();

    let car = add_car(&client, addr, &owner_token, "Civic", 60.0).await;
    let id = car["id"].as_str().unwrap();

    let response = client
        .patch(format!("http://{}/car-book/{}", addr, id))
        .bearer_auth(&renter_token)
        .json(&json!({ "booked_by": RENTER }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .patch(format!("http://{}/car-book/{}", addr, id))
        .bearer_auth(&other_token)
        .json(&json!({ "booked_by": "c@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], 409);
    assert!(body["error"].as_str().unwrap().contains("no longer available"));

    // The winner still holds the car
    let response = client
        .get(format!("http://{}/car-details/{}", addr, id))
        .send()
        .await
        .unwrap();
    let car: serde_json::Value = response.json().await.unwrap();
    assert_eq!(car["booked_by"], RENTER);
}

#[tokio::test]
async fn test_booking_for_someone_else_should_be_forbidden() {
    let (addr, gate) = create_test_server().await;
    let client = Client::new();
    let owner_token = gate.issue(OWNER).unwrap();
    let renter_token = gate.issue(RENTER).unwrap();

    let car = add_car(&client, addr, &owner_token, "Civic", 60.0).await;
    let id = car["id"].as_str().unwrap();

    let response = client
        .patch(format!("http://{}/car-book/{}", addr, id))
        .bearer_auth(&renter_token)
        .json(&json!({ "booked_by": "someone-else@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_update_by_non_owner_should_be_forbidden() {
    let (addr, gate) = create_test_server().await;
    let client = Client::new();
    let owner_token = gate.issue(OWNER).unwrap();
    let renter_token = gate.issue(RENTER).unwrap();

    let car = add_car(&client, addr, &owner_token, "Civic", 60.0).await;
    let id = car["id"].as_str().unwrap();

    let response = client
        .put(format!("http://{}/car-details/{}", addr, id))
        .bearer_auth(&renter_token)
        .json(&json!({ "price_per_day": 999.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Owner update succeeds and merges only the provided field
    let response = client
        .put(format!("http://{}/car-details/{}", addr, id))
        .bearer_auth(&owner_token)
        .json(&json!({ "price_per_day": 75.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["price_per_day"], 75.0);
    assert_eq!(updated["car_name"], "Civic");
}

#[tokio::test]
async fn test_list_all_should_sort_by_price_ascending() {
    let (addr, gate) = create_test_server().await;
    let client = Client::new();
    let owner_token = gate.issue(OWNER).unwrap();

    add_car(&client, addr, &owner_token, "Expensive", 150.0).await;
    add_car(&client, addr, &owner_token, "Cheap", 60.0).await;
    add_car(&client, addr, &owner_token, "Middle", 120.0).await;

    let response = client
        .get(format!("http://{}/?sort=price-low", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let cars: serde_json::Value = response.json().await.unwrap();
    let prices: Vec<f64> = cars
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["price_per_day"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![60.0, 120.0, 150.0]);

    // Unknown sort keys are rejected, not ignored
    let response = client
        .get(format!("http://{}/?sort=mileage", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_maintenance_status_toggle_should_accept_legacy_casing() {
    let (addr, gate) = create_test_server().await;
    let client = Client::new();
    let owner_token = gate.issue(OWNER).unwrap();

    let car = add_car(&client, addr, &owner_token, "Civic", 60.0).await;
    let id = car["id"].as_str().unwrap();

    // The legacy client sends lowercase status strings
    let response = client
        .patch(format!("http://{}/mylisting/{}", addr, id))
        .bearer_auth(&owner_token)
        .json(&json!({ "newStatus": "booked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let held: serde_json::Value = response.json().await.unwrap();
    assert_eq!(held["status"], "Booked");
    assert!(held["booked_by"].is_null());

    let response = client
        .patch(format!("http://{}/mylisting/{}", addr, id))
        .bearer_auth(&owner_token)
        .json(&json!({ "newStatus": "available" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let released: serde_json::Value = response.json().await.unwrap();
    assert_eq!(released["status"], "Available");
}

#[tokio::test]
async fn test_malformed_car_id_should_be_bad_request() {
    let (addr, _) = create_test_server().await;
    let client = Client::new();

    let response = client
        .get(format!("http://{}/car-details/not-a-uuid", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
