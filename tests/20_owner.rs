mod common;

use axum::http::StatusCode;
use common::{Part, TestApp};
use portfolio_api::app::AuthSettings;
use portfolio_api::auth::owner::{NOT_OWNER, NO_SESSION, SERVER_MISCONFIGURED};
use serde_json::json;

/// Every mutating call, in the shape a real client would send it.
async fn attempt_every_mutation(app: &TestApp, token: Option<&str>) -> Vec<(&'static str, StatusCode, String)> {
    let mut results = Vec::new();

    let calls = [
        ("/api/projects/create", json!({ "title": "Sneaky" })),
        ("/api/projects/update", json!({ "id": uuid::Uuid::new_v4(), "title": "Sneaky" })),
        ("/api/projects/delete", json!({ "id": uuid::Uuid::new_v4() })),
        ("/api/settings/update", json!({ "key": "hero_headline", "value": "pwned" })),
        ("/api/settings/update", json!({ "updates": { "hero_headline": "pwned" } })),
        ("/api/settings/ensure", json!({})),
    ];
    for (uri, body) in calls {
        let res = app.post_json(uri, token, &body).await;
        results.push((uri, res.status, res.json()["error"].as_str().unwrap_or_default().to_string()));
    }

    let res = app
        .post_multipart(
            "/api/storage/upload",
            token,
            &[Part::file("file", "x.png", "image/png", b"png")],
        )
        .await;
    results.push(("/api/storage/upload", res.status, res.json()["error"].as_str().unwrap_or_default().to_string()));

    results
}

async fn assert_nothing_changed(app: &TestApp) {
    assert_eq!(app.settings.write_count(), 0, "settings were written");
    assert!(app.projects.is_empty().await, "projects were written");
    assert!(app.storage.bucket_options(common::BUCKET).await.is_none(), "bucket was touched");
}

#[tokio::test]
async fn anonymous_callers_are_refused_everywhere() {
    let app = TestApp::new();
    for (uri, status, error) in attempt_every_mutation(&app, None).await {
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(error, NO_SESSION, "{}", uri);
    }
    assert_nothing_changed(&app).await;
}

#[tokio::test]
async fn signed_in_non_owner_is_refused_everywhere() {
    let app = TestApp::new();
    let visitor = app.visitor_token.clone();
    for (uri, status, error) in attempt_every_mutation(&app, Some(&visitor)).await {
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(error, NOT_OWNER, "{}", uri);
    }
    assert_nothing_changed(&app).await;
}

#[tokio::test]
async fn forged_token_is_treated_as_anonymous() {
    let app = TestApp::new();
    let claims = portfolio_api::auth::Claims::new(
        common::OWNER_ID,
        None,
        common::AUDIENCE,
        chrono::Duration::hours(1),
    );
    let forged = portfolio_api::auth::issue_session_token(&claims, "some-other-secret").unwrap();

    let res = app
        .post_json("/api/projects/create", Some(&forged), &json!({ "title": "x" }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(app.projects.is_empty().await);

    let res = app.get("/api/auth/is-owner", Some(&forged)).await;
    assert_eq!(res.json(), json!({ "isOwner": false }));
}

#[tokio::test]
async fn is_owner_reflects_the_session() {
    let app = TestApp::new();
    assert_eq!(app.get("/api/auth/is-owner", None).await.json(), json!({ "isOwner": false }));
    assert_eq!(
        app.get("/api/auth/is-owner", Some(&app.visitor_token)).await.json(),
        json!({ "isOwner": false })
    );
    assert_eq!(
        app.get("/api/auth/is-owner", Some(&app.owner_token)).await.json(),
        json!({ "isOwner": true })
    );
}

#[tokio::test]
async fn session_cookie_is_honoured_like_a_bearer_token() {
    let app = TestApp::new();
    let request = axum::http::Request::get("/api/auth/is-owner")
        .header("cookie", format!("theme=dark; portfolio_session={}", app.owner_token))
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.json(), json!({ "isOwner": true }));
}

#[tokio::test]
async fn unset_owner_id_refuses_the_owner_everywhere() {
    let app = TestApp::with_auth(AuthSettings {
        owner_id: None,
        ..common::auth_settings()
    });
    let owner = app.owner_token.clone();
    for (uri, status, error) in attempt_every_mutation(&app, Some(&owner)).await {
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(error, SERVER_MISCONFIGURED, "{}", uri);
    }
    assert_nothing_changed(&app).await;

    let res = app.get("/api/auth/is-owner", Some(&owner)).await;
    assert_eq!(res.json(), json!({ "isOwner": false }));
}

#[tokio::test]
async fn without_a_signing_secret_no_token_is_accepted() {
    let app = TestApp::with_auth(AuthSettings {
        session_secret: String::new(),
        ..common::auth_settings()
    });
    let claims = portfolio_api::auth::Claims::new(
        common::OWNER_ID,
        None,
        common::AUDIENCE,
        chrono::Duration::hours(1),
    );
    let guessed = portfolio_api::auth::issue_session_token(&claims, "development-session-secret").unwrap();

    for token in [guessed, app.owner_token.clone()] {
        for (uri, status, error) in attempt_every_mutation(&app, Some(&token)).await {
            assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
            assert_eq!(error, NO_SESSION, "{}", uri);
        }
    }
    assert_nothing_changed(&app).await;
}
