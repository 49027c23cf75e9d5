//! Company API integration tests
//!
//! CRUD through the HTTP surface, owner isolation, ordering, and the audit
//! rows written by the interceptor.

use axum::http::StatusCode;
use serde_json::{json, Value};

use jobtrack_server::audit::list_all_audit_logs;

mod common;
use common::TestApp;

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .expect("list response")
        .iter()
        .map(|company| company["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_and_retrieve_company() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;

    let response = taro
        .post_json(
            "/api/companies",
            json!({
                "name": "Acme",
                "job_role": "Backend engineer",
                "apply_route": "Referral",
                "deadline": "2026-03-01",
                "status_text": "ES submitted",
                "memo": "Ask about remote work",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json();
    assert_eq!(created["name"], "Acme");
    assert_eq!(created["deadline"], "2026-03-01");
    assert!(created.get("owner_id").is_none());

    let id = created["id"].as_i64().unwrap();
    let fetched = taro.get(&format!("/api/companies/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json(), created);
}

#[tokio::test]
async fn test_create_company_requires_name() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;

    let missing = taro.post_json("/api/companies", json!({ "memo": "x" })).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["errors"]["name"][0], "This field is required.");

    let blank = taro.post_json("/api/companies", json!({ "name": "   " })).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.json()["errors"]["name"][0], "This field may not be blank.");

    let long = taro
        .post_json("/api/companies", json!({ "name": "a".repeat(201) }))
        .await;
    assert_eq!(long.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        long.json()["errors"]["name"][0],
        "Ensure this field has no more than 200 characters."
    );

    assert!(list_all_audit_logs(&app.pool)
        .await
        .unwrap()
        .iter()
        .all(|log| log.action != "COMPANY_CREATE"));
}

#[tokio::test]
async fn test_companies_are_isolated_per_owner() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;
    let mut hanako = app.register("hanako@example.com").await;

    let id = taro.create_company(json!({ "name": "Acme" })).await;
    hanako.create_company(json!({ "name": "Globex" })).await;

    let list = hanako.get("/api/companies").await.json();
    assert_eq!(names(&list), vec!["Globex"]);

    let uri = format!("/api/companies/{id}");
    assert_eq!(hanako.get(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        hanako.patch_json(&uri, json!({ "name": "Stolen" })).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(hanako.delete(&uri).await.status, StatusCode::NOT_FOUND);

    // Untouched
    assert_eq!(taro.get(&uri).await.json()["name"], "Acme");
}

#[tokio::test]
async fn test_owner_in_body_is_ignored() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;
    let mut hanako = app.register("hanako@example.com").await;
    let hanako_id = hanako.get("/api/me").await.json()["id"].as_i64().unwrap();

    let id = taro
        .create_company(json!({ "name": "Acme", "owner": hanako_id, "owner_id": hanako_id }))
        .await;

    assert_eq!(
        taro.get(&format!("/api/companies/{id}")).await.status,
        StatusCode::OK
    );
    assert!(hanako.get("/api/companies").await.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_update_and_clearing_deadline() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;
    let id = taro
        .create_company(json!({ "name": "Acme", "deadline": "2026-03-01", "memo": "first" }))
        .await;
    let uri = format!("/api/companies/{id}");

    let response = taro.patch_json(&uri, json!({ "memo": "second" })).await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = response.json();
    assert_eq!(updated["memo"], "second");
    assert_eq!(updated["name"], "Acme");
    assert_eq!(updated["deadline"], "2026-03-01");

    let response = taro.patch_json(&uri, json!({ "deadline": null })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["deadline"], Value::Null);

    let response = taro.patch_json(&uri, json!({ "name": "" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(taro.get(&uri).await.json()["name"], "Acme");
}

#[tokio::test]
async fn test_default_ordering_puts_missing_deadlines_last() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;

    taro.create_company(json!({ "name": "No deadline" })).await;
    taro.create_company(json!({ "name": "Later", "deadline": "2026-06-01" })).await;
    taro.create_company(json!({ "name": "Sooner", "deadline": "2026-02-01" })).await;

    let list = taro.get("/api/companies").await.json();
    assert_eq!(names(&list), vec!["Sooner", "Later", "No deadline"]);

    // Descending puts missing deadlines first
    let list = taro.get("/api/companies?ordering=-deadline").await.json();
    assert_eq!(names(&list), vec!["No deadline", "Later", "Sooner"]);

    // Unknown values fall back to the default order
    let list = taro.get("/api/companies?ordering=name").await.json();
    assert_eq!(names(&list), vec!["Sooner", "Later", "No deadline"]);
}

#[tokio::test]
async fn test_delete_company_cascades_to_es_versions() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;
    let id = taro.create_company(json!({ "name": "Acme" })).await;
    let es = taro.create_es(json!({ "company": id, "body": "draft" })).await;

    let response = taro.delete(&format!("/api/companies/{id}")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());

    assert_eq!(
        taro.get(&format!("/api/companies/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        taro.get(&format!("/api/es/{}", es["id"])).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_company_mutations_are_audited() {
    let app = TestApp::spawn().await;
    let mut taro = app.register("taro@example.com").await;
    let taro_id = taro.get("/api/me").await.json()["id"].as_i64().unwrap();

    let id = taro.create_company(json!({ "name": "Acme" })).await;
    taro.patch_json(&format!("/api/companies/{id}"), json!({ "memo": "x" }))
        .await;
    taro.delete(&format!("/api/companies/{id}")).await;
    // Not found: no audit row
    taro.delete(&format!("/api/companies/{id}")).await;

    let logs = list_all_audit_logs(&app.pool).await.unwrap();
    let company_logs: Vec<_> = logs
        .iter()
        .filter(|log| log.target_type == "Company")
        .collect();

    let mut actions: Vec<&str> = company_logs.iter().map(|log| log.action.as_str()).collect();
    actions.sort_unstable();
    assert_eq!(actions, vec!["COMPANY_CREATE", "COMPANY_DELETE", "COMPANY_UPDATE"]);
    for log in company_logs {
        assert_eq!(log.target_id, Some(id));
        assert_eq!(log.user_id, Some(taro_id));
    }
}

#[tokio::test]
async fn test_companies_require_authentication() {
    let app = TestApp::spawn().await;
    let mut anonymous = app.client();

    assert_eq!(anonymous.get("/api/companies").await.status, StatusCode::FORBIDDEN);
    assert_eq!(
        anonymous
            .post_json("/api/companies", json!({ "name": "Acme" }))
            .await
            .status,
        StatusCode::FORBIDDEN
    );
}
