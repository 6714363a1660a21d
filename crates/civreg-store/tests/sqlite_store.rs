// SPDX-License-Identifier: Apache-2.0

use civreg_core::{hash_identity, mask_identity};
use civreg_model::{CitizenRecord, NewRegistration, RegistrationStatus};
use civreg_store::{
    CitizenFilter, CitizenRecordStore, Page, RegistrationStore, SqliteStore, StoreError,
};
use tempfile::tempdir;

fn citizen(nin: &str, state: &str, pvc: &str, imported_at: i64) -> CitizenRecord {
    CitizenRecord {
        identity_hash: hash_identity(nin),
        identity_masked: mask_identity(nin),
        first_name: Some("Amaka".to_string()),
        last_name: Some("Bello".to_string()),
        gender: None,
        date_of_birth: None,
        state: Some(state.to_string()),
        lga: None,
        ward: None,
        phone: None,
        email: None,
        address: None,
        pvc_status: pvc.to_string(),
        imported_at,
    }
}

fn registration(nin: &str, created_at: i64) -> NewRegistration {
    NewRegistration {
        first_name: "Ngozi".to_string(),
        middle_name: None,
        surname: "Okafor".to_string(),
        nationality: "Nigerian".to_string(),
        hometown: None,
        lga_of_origin: None,
        state_of_origin: None,
        dob: None,
        religion: None,
        gender: Some("Female".to_string()),
        phone: "08030000000".to_string(),
        is_whatsapp: true,
        email: None,
        house_number: None,
        street_name: None,
        city: None,
        residence_lga: None,
        residence_state: Some("Anambra".to_string()),
        pvc_status: Some("YES".to_string()),
        identity_hash: hash_identity(nin),
        identity_masked: mask_identity(nin),
        image_url: "media/citizens/x.jpg".to_string(),
        emergency_name: None,
        emergency_rel: None,
        emergency_phone: None,
        status: RegistrationStatus::Pending,
        created_at,
    }
}

#[tokio::test]
async fn upsert_inserts_then_overwrites_fields() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("reg.db")).expect("open store");
    let citizens: &dyn CitizenRecordStore = &store;

    citizens
        .upsert_by_hash(&citizen("12345678901", "Lagos", "NO", 100))
        .await
        .expect("first upsert");
    let mut updated = citizen("12345678901", "Kano", "YES", 200);
    updated.first_name = Some("Chidi".to_string());
    citizens.upsert_by_hash(&updated).await.expect("second upsert");

    let found = citizens
        .find_by_hash(&hash_identity("12345678901"))
        .await
        .expect("find")
        .expect("record exists");
    assert_eq!(found.state.as_deref(), Some("Kano"));
    assert_eq!(found.pvc_status, "YES");
    assert_eq!(found.first_name.as_deref(), Some("Chidi"));
    assert_eq!(
        citizens
            .count(&CitizenFilter::default())
            .await
            .expect("count"),
        1
    );
}

#[tokio::test]
async fn upsert_preserves_first_import_timestamp() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("reg.db")).expect("open store");
    let citizens: &dyn CitizenRecordStore = &store;

    citizens
        .upsert_by_hash(&citizen("12345678901", "Lagos", "NO", 100))
        .await
        .expect("first upsert");
    citizens
        .upsert_by_hash(&citizen("12345678901", "Lagos", "NO", 900))
        .await
        .expect("re-import");

    let found = citizens
        .find_by_hash(&hash_identity("12345678901"))
        .await
        .expect("find")
        .expect("record exists");
    assert_eq!(found.imported_at, 100);
}

#[tokio::test]
async fn find_filters_and_orders_by_recency() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("reg.db")).expect("open store");
    let citizens: &dyn CitizenRecordStore = &store;

    citizens
        .upsert_by_hash(&citizen("11111111111", "Lagos", "NO", 10))
        .await
        .expect("upsert");
    citizens
        .upsert_by_hash(&citizen("22222222222", "Kano", "YES", 20))
        .await
        .expect("upsert");
    citizens
        .upsert_by_hash(&citizen("33333333333", "Lagos", "YES", 30))
        .await
        .expect("upsert");

    let all = citizens
        .find(&CitizenFilter::default(), Page::default())
        .await
        .expect("find all");
    let masked: Vec<&str> = all.iter().map(|r| r.identity_masked.as_str()).collect();
    assert_eq!(masked, vec!["3333****3333", "2222****2222", "1111****1111"]);

    let lagos_pvc = citizens
        .find(
            &CitizenFilter {
                pvc_status: Some("YES".to_string()),
                state: Some("Lagos".to_string()),
            },
            Page::default(),
        )
        .await
        .expect("find filtered");
    assert_eq!(lagos_pvc.len(), 1);
    assert_eq!(lagos_pvc[0].identity_masked, "3333****3333");
}

#[tokio::test]
async fn out_of_range_page_is_empty_with_correct_total() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("reg.db")).expect("open store");
    let citizens: &dyn CitizenRecordStore = &store;
    for (i, nin) in ["11111111111", "22222222222", "33333333333", "44444444444", "55555555555"]
        .iter()
        .enumerate()
    {
        citizens
            .upsert_by_hash(&citizen(nin, "Lagos", "NO", i as i64))
            .await
            .expect("upsert");
    }

    let page = citizens
        .find(&CitizenFilter::default(), Page::new(2, 10))
        .await
        .expect("find page 2");
    assert!(page.is_empty());
    assert_eq!(
        citizens
            .count(&CitizenFilter::default())
            .await
            .expect("count"),
        5
    );
}

#[tokio::test]
async fn duplicate_registration_hash_is_a_conflict() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("reg.db")).expect("open store");
    let registrations: &dyn RegistrationStore = &store;

    let id = registrations
        .insert(&registration("12345678901", 1_000))
        .await
        .expect("first insert");
    assert!(id > 0);

    let err = registrations
        .insert(&registration("12345678901", 2_000))
        .await
        .expect_err("duplicate must fail");
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
    assert_eq!(registrations.count().await.expect("count"), 1);
}

#[tokio::test]
async fn registration_counts_cover_pvc_and_sliding_window() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("reg.db")).expect("open store");
    let registrations: &dyn RegistrationStore = &store;

    let mut old = registration("11111111111", 1_000);
    old.pvc_status = Some("NO".to_string());
    registrations.insert(&old).await.expect("insert old");
    registrations
        .insert(&registration("22222222222", 5_000))
        .await
        .expect("insert recent");

    assert_eq!(registrations.count_with_pvc("YES").await.expect("yes"), 1);
    assert_eq!(registrations.count_with_pvc("NO").await.expect("no"), 1);
    assert_eq!(
        registrations.count_created_since(2_000).await.expect("since"),
        1
    );
    assert_eq!(
        registrations.count_created_since(0).await.expect("since zero"),
        2
    );
}

#[tokio::test]
async fn registrations_list_most_recent_first() {
    let dir = tempdir().expect("tempdir");
    let store = SqliteStore::open(&dir.path().join("reg.db")).expect("open store");
    let registrations: &dyn RegistrationStore = &store;

    registrations
        .insert(&registration("11111111111", 1_000))
        .await
        .expect("insert");
    registrations
        .insert(&registration("22222222222", 3_000))
        .await
        .expect("insert");
    registrations
        .insert(&registration("33333333333", 2_000))
        .await
        .expect("insert");

    let page = registrations.find(Page::new(1, 2)).await.expect("find");
    let created: Vec<i64> = page.iter().map(|r| r.created_at).collect();
    assert_eq!(created, vec![3_000, 2_000]);
}
