use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, NaiveDateTime};
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};
use assert_matches::assert_matches;

use appointment_cell::handlers::register_attention;
use appointment_cell::models::*;
use appointment_cell::services::{AttentionRecorder, FixedClock};
use appointment_cell::AppointmentState;
use pharmacy_cell::models::CartLine;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{TestConfig, TestUser, MockSupabaseResponses};

// 2025-10-20 is a Monday
fn monday_ten() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 20).unwrap().and_hms_opt(10, 0, 0).unwrap()
}

fn state_for(config: AppConfig, now: NaiveDateTime) -> Arc<AppointmentState> {
    Arc::new(AppointmentState::with_clock(Arc::new(config), Arc::new(FixedClock(now))))
}

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

async fn posted_bodies(server: &MockServer, table: &str) -> Vec<Value> {
    server.received_requests().await.unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == table)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

async fn mount_empty_calendar(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

fn registration(owner: &str, pet: Option<&str>, cart: Vec<CartLine>) -> RegistrationRequest {
    RegistrationRequest {
        owner: OwnerDetails { name: owner.to_string(), ..Default::default() },
        pet: pet.map(|name| PetDetails {
            name: name.to_string(),
            species: "Dog".to_string(),
            age_years: 3,
            weight_kg: 12.5,
        }),
        service_type: Some(ServiceType::Surgery),
        cart,
    }
}

#[tokio::test]
async fn test_full_registration_books_first_slot_and_order() {
    let mock_server = MockServer::start().await;
    let state = state_for(TestConfig::with_backend(&mock_server.uri()).to_app_config(), monday_ten());

    mount_empty_calendar(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "id": "AGENDA-4321",
                "pet_name": "Bobby",
                "owner_name": "Juan Perez",
                "description": "Attention for Surgery",
                "date_time": "20/10/2025 11:00",
                "veterinarian": "Dr. Pérez",
                "cost": 90000.0,
                "status": "pending"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/pets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::pet_row(1, "Bobby", "Dog", "Juan Perez")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::order_row(3, "Juan Perez", 15000.0)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = registration(
        "Juan Perez",
        Some("Bobby"),
        vec![CartLine { medication: "Generic Antibiotic".to_string(), quantity: 1 }],
    );

    let outcome = register_attention(
        State(state.clone()),
        create_auth_header("token"),
        Extension(TestUser::staff("ana").to_user()),
        Json(request),
    ).await.unwrap().0;

    assert_eq!(outcome["consultation"]["date_time"], "20/10/2025 11:00");
    assert_eq!(outcome["order"]["id"], 3);
    assert_eq!(outcome["grand_total"], 105000.0);

    let consultation = &posted_bodies(&mock_server, "/rest/v1/consultations").await[0];
    assert_eq!(consultation["veterinarian"], "Dr. Pérez");
    assert_eq!(consultation["date_time"], "20/10/2025 11:00");
    assert_eq!(consultation["cost"], 90000.0);
    assert_eq!(consultation["status"], "pending");
    assert!(consultation["id"].as_str().unwrap().starts_with("AGENDA-"));

    let order = &posted_bodies(&mock_server, "/rest/v1/orders").await[0];
    assert_eq!(order["is_direct_purchase"], false);

    let stats = state.counters.snapshot();
    assert_eq!(stats.total_pets, 1);
    assert_eq!(stats.total_consultations, 1);
    assert_eq!(stats.last_owner, "Juan Perez");
    assert_eq!(stats.last_service_type.as_deref(), Some("Surgery"));
    assert_eq!(stats.pet_summaries, vec!["Pet: Bobby (Dog) - Owner: Juan Perez".to_string()]);
}

#[tokio::test]
async fn test_pharmacy_only_walk_in() {
    let mock_server = MockServer::start().await;
    let state = state_for(TestConfig::with_backend(&mock_server.uri()).to_app_config(), monday_ten());

    Mock::given(method("POST"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::order_row(8, "Walk-in Customer", 16000.0)
        ])))
        .mount(&mock_server)
        .await;

    let request = registration(
        "  ",
        Some(""),
        vec![CartLine { medication: "Basic Analgesic".to_string(), quantity: 2 }],
    );

    let outcome = register_attention(
        State(state.clone()),
        create_auth_header("token"),
        Extension(TestUser::staff("ana").to_user()),
        Json(request),
    ).await.unwrap().0;

    assert!(outcome["consultation"].is_null());
    assert_eq!(outcome["grand_total"], 16000.0);

    let order = &posted_bodies(&mock_server, "/rest/v1/orders").await[0];
    assert_eq!(order["customer_name"], "Walk-in Customer");
    assert_eq!(order["items"], "Basic Analgesic x2");
    assert_eq!(order["is_direct_purchase"], true);

    assert!(posted_bodies(&mock_server, "/rest/v1/consultations").await.is_empty());
    assert_eq!(state.counters.snapshot().total_consultations, 0);
}

#[tokio::test]
async fn test_empty_registration_is_rejected() {
    let state = state_for(TestConfig::default().to_app_config(), monday_ten());

    let result = register_attention(
        State(state),
        create_auth_header("token"),
        Extension(TestUser::staff("ana").to_user()),
        Json(registration("Ana", None, vec![])),
    ).await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_storage_conflict_is_retried() {
    let mock_server = MockServer::start().await;
    let state = state_for(TestConfig::with_backend(&mock_server.uri()).to_app_config(), monday_ten());

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSupabaseResponses::error_response("duplicate key value", "23505")
        ))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::consultation_row("AGENDA-2000", "20/10/2025 11:00", "Dr. Pérez")
        ])))
        .mount(&mock_server)
        .await;

    let recorder = AttentionRecorder::new(&state);
    let booked = recorder
        .book_next_slot("Juan Perez", "Bobby", ServiceType::Checkup, 30000.0, "token")
        .await
        .unwrap();

    assert_eq!(booked.id, "AGENDA-2000");
    assert_eq!(posted_bodies(&mock_server, "/rest/v1/consultations").await.len(), 2);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::with_backend(&mock_server.uri()).to_app_config();
    config.booking_max_retries = 1;
    let state = state_for(config, monday_ten());

    mount_empty_calendar(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSupabaseResponses::error_response("duplicate key value", "23505")
        ))
        .expect(2)
        .mount(&mock_server)
        .await;

    let result = AttentionRecorder::new(&state)
        .book_next_slot("Juan Perez", "Bobby", ServiceType::Checkup, 30000.0, "token")
        .await;

    assert_matches!(result, Err(AppointmentError::SlotTaken { .. }));
    assert_eq!(state.counters.snapshot().total_consultations, 0);
}

#[tokio::test]
async fn test_exhausted_horizon_fails_without_writing() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::with_backend(&mock_server.uri()).to_app_config();
    config.slot_search_horizon_days = 0;
    // Saturday: the only candidate inside a zero-day horizon is closed
    let saturday = NaiveDate::from_ymd_opt(2025, 10, 25).unwrap().and_hms_opt(11, 0, 0).unwrap();
    let state = state_for(config, saturday);

    mount_empty_calendar(&mock_server).await;

    let result = AttentionRecorder::new(&state)
        .book_next_slot("Juan Perez", "Bobby", ServiceType::Checkup, 30000.0, "token")
        .await;

    assert_matches!(result, Err(AppointmentError::NoSlotAvailable { days: 0 }));
    assert!(posted_bodies(&mock_server, "/rest/v1/consultations").await.is_empty());
}

#[tokio::test]
async fn test_concurrent_bookings_take_distinct_slots() {
    let mock_server = MockServer::start().await;
    let state = state_for(TestConfig::with_backend(&mock_server.uri()).to_app_config(), monday_ten());

    // Second read sees the first booking
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::consultation_row("AGENDA-1111", "20/10/2025 11:00", "Dr. Pérez")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let first = AttentionRecorder::new(&state);
    let second = AttentionRecorder::new(&state);
    let (a, b) = tokio::join!(
        first.book_next_slot("Ana", "Luna", ServiceType::Checkup, 30000.0, "token"),
        second.book_next_slot("Juan", "Bobby", ServiceType::Checkup, 30000.0, "token"),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.date_time, "20/10/2025 11:00");
    assert_eq!(b.date_time, "20/10/2025 11:00");
    assert_ne!(a.veterinarian, b.veterinarian);
}

#[tokio::test]
async fn test_failed_pet_insert_releases_booking() {
    let mock_server = MockServer::start().await;
    let state = state_for(TestConfig::with_backend(&mock_server.uri()).to_app_config(), monday_ten());

    mount_empty_calendar(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::consultation_row("AGENDA-4321", "20/10/2025 11:00", "Dr. Pérez")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/pets"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("internal error", "XX000")
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/consultations"))
        .and(query_param("id", "eq.AGENDA-4321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::consultation_row("AGENDA-4321", "20/10/2025 11:00", "Dr. Pérez")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = register_attention(
        State(state.clone()),
        create_auth_header("token"),
        Extension(TestUser::staff("ana").to_user()),
        Json(registration("Juan Perez", Some("Bobby"), vec![])),
    ).await;

    assert!(result.is_err());
    let stats = state.counters.snapshot();
    assert_eq!(stats.total_consultations, 0);
    assert_eq!(stats.total_pets, 0);
    assert!(stats.pet_summaries.is_empty());
}

#[tokio::test]
async fn test_consultation_cost_is_stored_unrounded() {
    let mock_server = MockServer::start().await;
    let mut config = TestConfig::with_backend(&mock_server.uri()).to_app_config();
    config.base_rate_per_minute = 10.25;
    let state = state_for(config, monday_ten());

    mount_empty_calendar(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/pets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::pet_row(1, "Bobby", "Dog", "Juan Perez")
        ])))
        .mount(&mock_server)
        .await;

    // 30 minutes x 10.25 x 3.0 for surgery
    let outcome = register_attention(
        State(state),
        create_auth_header("token"),
        Extension(TestUser::staff("ana").to_user()),
        Json(registration("Juan Perez", Some("Bobby"), vec![])),
    ).await.unwrap().0;

    assert_eq!(outcome["grand_total"], 922.5);
    let consultation = &posted_bodies(&mock_server, "/rest/v1/consultations").await[0];
    assert_eq!(consultation["cost"], 922.5);
}
