// SPDX-License-Identifier: Apache-2.0

mod support;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use civreg_core::{DAY_MILLIS, hash_identity, mask_identity, now_millis};
use civreg_model::{NewRegistration, RegistrationStatus, Role};
use civreg_store::RegistrationStore;
use serde_json::json;
use support::{get_json, login, post_json, seed_admin, spawn_server};

fn register_body(nin: &str) -> serde_json::Value {
    json!({
        "firstName": "Ngozi",
        "surname": "Okafor",
        "phone": "08030000000",
        "nin": nin,
        "gender": "Female",
        "isWhatsApp": "true",
        "residenceState": "Anambra",
        "pvcStatus": "yes",
        "imageData": format!("data:image/jpeg;base64,{}", STANDARD.encode(b"fake-photo")),
    })
}

fn stored_registration(nin: &str, created_at: i64) -> NewRegistration {
    NewRegistration {
        first_name: "Seeded".to_string(),
        middle_name: None,
        surname: "Citizen".to_string(),
        nationality: "Nigerian".to_string(),
        hometown: None,
        lga_of_origin: None,
        state_of_origin: None,
        dob: None,
        religion: None,
        gender: None,
        phone: "08030000001".to_string(),
        is_whatsapp: false,
        email: None,
        house_number: None,
        street_name: None,
        city: None,
        residence_lga: None,
        residence_state: None,
        pvc_status: Some("NO".to_string()),
        identity_hash: hash_identity(nin),
        identity_masked: mask_identity(nin),
        image_url: "media/citizens/seed.jpg".to_string(),
        emergency_name: None,
        emergency_rel: None,
        emergency_phone: None,
        status: RegistrationStatus::Pending,
        created_at,
    }
}

#[tokio::test]
async fn integration_register_then_duplicate_conflicts() {
    let server = spawn_server(false).await;

    let (status, body) =
        post_json(server.addr, "/register", None, &register_body("12345678901")).await;
    assert_eq!(status, 201, "first registration: {body}");
    assert_eq!(body["success"], json!(true));
    assert!(body["registrationId"].as_i64().expect("registration id") > 0);

    let (status, body) =
        post_json(server.addr, "/register", None, &register_body("12345678901")).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("This NIN has already been registered."));
}

#[tokio::test]
async fn integration_register_validates_required_fields() {
    let server = spawn_server(false).await;

    let (status, body) = post_json(
        server.addr,
        "/register",
        None,
        &json!({"firstName": "Ngozi", "surname": "Okafor"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], json!("Missing required fields"));

    let mut short_nin = register_body("123456");
    short_nin["nin"] = json!("123456");
    let (status, body) = post_json(server.addr, "/register", None, &short_nin).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], json!("NIN must be 11 digits"));

    let mut no_image = register_body("12345678901");
    no_image
        .as_object_mut()
        .expect("object body")
        .remove("imageData");
    let (status, body) = post_json(server.addr, "/register", None, &no_image).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], json!("Image is required"));
}

#[tokio::test]
async fn integration_login_and_role_matrix() {
    let server = spawn_server(false).await;
    seed_admin(&server, "admin@example.test", "password123", Role::Admin).await;
    seed_admin(&server, "board@example.test", "password123", Role::Board).await;

    // Bad credentials: same response for unknown email and wrong password.
    let (status, body) = post_json(
        server.addr,
        "/auth/login",
        None,
        &json!({"email": "admin@example.test", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], json!("Invalid credentials"));
    let (status, _) = post_json(
        server.addr,
        "/auth/login",
        None,
        &json!({"email": "nobody@example.test", "password": "password123"}),
    )
    .await;
    assert_eq!(status, 401);

    let (status, body) = post_json(server.addr, "/auth/login", None, &json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], json!("Please provide email and password"));

    let admin_token = login(&server, "admin@example.test", "password123").await;
    let board_token = login(&server, "board@example.test", "password123").await;

    // No token at all.
    let (status, _) = get_json(server.addr, "/citizens", None).await;
    assert_eq!(status, 401);
    let (status, _) = get_json(server.addr, "/citizens", Some("not-a-token")).await;
    assert_eq!(status, 401);

    // Board may read registrations and stats, but not the citizen registry.
    let (status, _) = get_json(server.addr, "/citizens", Some(&board_token)).await;
    assert_eq!(status, 403);
    let (status, body) = get_json(server.addr, "/registrations", Some(&board_token)).await;
    assert_eq!(status, 200, "{body}");
    let (status, _) = get_json(server.addr, "/stats", Some(&board_token)).await;
    assert_eq!(status, 200);

    // Admin passes everywhere.
    for path in ["/citizens", "/registrations", "/stats"] {
        let (status, body) = get_json(server.addr, path, Some(&admin_token)).await;
        assert_eq!(status, 200, "admin on {path}: {body}");
    }
}

#[tokio::test]
async fn integration_seed_route_is_gated() {
    let closed = spawn_server(false).await;
    let (status, _) = post_json(
        closed.addr,
        "/auth/seed",
        None,
        &json!({"name": "Root", "email": "root@example.test", "password": "password123", "role": "admin"}),
    )
    .await;
    assert_eq!(status, 403);

    let open = spawn_server(true).await;
    let (status, body) = post_json(
        open.addr,
        "/auth/seed",
        None,
        &json!({"name": "Root", "email": "root@example.test", "password": "password123", "role": "admin"}),
    )
    .await;
    assert_eq!(status, 201, "{body}");
    let token = body["token"].as_str().expect("seed token").to_string();
    let (status, _) = get_json(open.addr, "/citizens", Some(&token)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn integration_registrations_listing_hides_hash_and_image() {
    let server = spawn_server(false).await;
    seed_admin(&server, "admin@example.test", "password123", Role::Admin).await;
    let token = login(&server, "admin@example.test", "password123").await;

    let (status, body) =
        post_json(server.addr, "/register", None, &register_body("12345678901")).await;
    assert_eq!(status, 201, "{body}");

    let (status, body) = get_json(server.addr, "/registrations", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], json!(1));
    let entry = &body["data"][0];
    assert_eq!(entry["identityMasked"], json!("1234****8901"));
    assert_eq!(entry["status"], json!("PENDING"));
    assert_eq!(entry["pvcStatus"], json!("YES"));
    assert!(entry.get("identityHash").is_none(), "hash must not leak");
    assert!(entry.get("imageUrl").is_none(), "image url must not leak");
}

#[tokio::test]
async fn integration_out_of_range_page_is_empty_with_total() {
    let server = spawn_server(false).await;
    seed_admin(&server, "admin@example.test", "password123", Role::Admin).await;
    let token = login(&server, "admin@example.test", "password123").await;

    let registrations: &dyn RegistrationStore = server.store.as_ref();
    for nin in [
        "11111111111",
        "22222222222",
        "33333333333",
        "44444444444",
        "55555555555",
    ] {
        registrations
            .insert(&stored_registration(nin, now_millis()))
            .await
            .expect("seed registration");
    }

    let (status, body) =
        get_json(server.addr, "/registrations?page=2&limit=10", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], json!(5));
    assert_eq!(body["count"], json!(0));
    assert_eq!(body["data"], json!([]));

    let (status, _) = get_json(server.addr, "/registrations?limit=0", Some(&token)).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn integration_stats_use_a_sliding_window() {
    let server = spawn_server(false).await;
    seed_admin(&server, "admin@example.test", "password123", Role::Admin).await;
    let token = login(&server, "admin@example.test", "password123").await;

    let registrations: &dyn RegistrationStore = server.store.as_ref();
    let mut with_pvc = stored_registration("11111111111", now_millis() - 2 * DAY_MILLIS);
    with_pvc.pvc_status = Some("YES".to_string());
    registrations.insert(&with_pvc).await.expect("seed old");
    registrations
        .insert(&stored_registration("22222222222", now_millis() - 1_000))
        .await
        .expect("seed recent");

    let (status, body) = get_json(server.addr, "/stats", Some(&token)).await;
    assert_eq!(status, 200, "{body}");
    let stats = &body["stats"];
    assert_eq!(stats["totalRegistrations"], json!(2));
    assert_eq!(stats["totalPVC"], json!(1));
    assert_eq!(stats["totalNonPVC"], json!(1));
    assert_eq!(stats["newToday"], json!(1), "only the recent one counts");
    assert_eq!(stats["totalNINs"], json!(0));
}

#[tokio::test]
async fn integration_health_endpoints_respond() {
    let server = spawn_server(false).await;
    let (status, body) = get_json(server.addr, "/healthz", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], json!("ok"));
    let (status, _) = get_json(server.addr, "/readyz", None).await;
    assert_eq!(status, 200);
}
