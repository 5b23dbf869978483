use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    Json, Router,
};
use shared::error::{ApiError, ErrorCode};
use tokio::net::TcpListener;

const PROJECT: &str = "shikshan-test";

#[derive(Default)]
struct FakeFirebase {
    accounts: HashMap<String, (String, String)>,
    documents: HashMap<String, Map<String, Value>>,
    display_names: HashMap<String, String>,
    calls: Vec<String>,
}

type Shared = Arc<std::sync::Mutex<FakeFirebase>>;

fn error_body(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": { "code": 400, "message": message } })),
    )
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let mut fake = state.lock().unwrap();
    let path = uri.path().to_string();
    fake.calls.push(format!("{method} {path}"));

    let documents_prefix = format!("/v1/projects/{PROJECT}/databases/(default)/documents/users/");
    match (method, path.as_str()) {
        (Method::POST, "/v1/accounts:signInWithPassword") => {
            let email = body["email"].as_str().unwrap_or_default().to_string();
            let password = body["password"].as_str().unwrap_or_default();
            match fake.accounts.get(&email) {
                Some((stored, uid)) if stored == password => (
                    StatusCode::OK,
                    Json(json!({ "localId": uid, "idToken": format!("token-{uid}"), "email": email })),
                ),
                _ => error_body("INVALID_LOGIN_CREDENTIALS"),
            }
        }
        (Method::POST, "/v1/accounts:signUp") => {
            let email = body["email"].as_str().unwrap_or_default().to_string();
            if fake.accounts.contains_key(&email) {
                return error_body("EMAIL_EXISTS");
            }
            let uid = format!("uid-{}", fake.accounts.len() + 1);
            let password = body["password"].as_str().unwrap_or_default().to_string();
            fake.accounts.insert(email.clone(), (password, uid.clone()));
            (
                StatusCode::OK,
                Json(json!({ "localId": uid, "idToken": format!("token-{uid}"), "email": email })),
            )
        }
        (Method::POST, "/v1/accounts:update") => {
            let token = body["idToken"].as_str().unwrap_or_default();
            let uid = token.trim_start_matches("token-").to_string();
            if let Some(name) = body["displayName"].as_str() {
                fake.display_names.insert(uid.clone(), name.to_string());
            }
            (StatusCode::OK, Json(json!({ "localId": uid })))
        }
        (method, path) if path.starts_with(&documents_prefix) => {
            let uid = path.trim_start_matches(&documents_prefix).to_string();
            match method {
                Method::GET => match fake.documents.get(&uid) {
                    Some(fields) => (StatusCode::OK, Json(json!({ "fields": fields }))),
                    None => (StatusCode::NOT_FOUND, Json(json!({}))),
                },
                Method::PATCH => {
                    let incoming = body["fields"].as_object().cloned().unwrap_or_default();
                    let masked = uri.query().is_some_and(|q| q.contains("updateMask"));
                    let doc = fake.documents.entry(uid).or_default();
                    if !masked {
                        doc.clear();
                    }
                    doc.extend(incoming);
                    (StatusCode::OK, Json(json!({})))
                }
                _ => (StatusCode::METHOD_NOT_ALLOWED, Json(json!({}))),
            }
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

async fn spawn_fake_firebase() -> (String, Shared) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state: Shared = Arc::default();
    let app = Router::new().fallback(handle).with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn backend(base_url: &str) -> FirebaseAuthBackend {
    FirebaseAuthBackend::new(FirebaseConfig::new("test-key", PROJECT).with_base_url(base_url))
}

fn account(email: &str) -> NewAccount {
    NewAccount {
        name: "Ravi Kulkarni".into(),
        username: String::new(),
        phone: "9123456780".into(),
        email: email.into(),
        address: "Gangapur Road, Nashik".into(),
        district: "Nashik".into(),
        center: CenterRef {
            id: "15".into(),
            name: "K. K. Wagh".into(),
        },
        password: "secret12".into(),
    }
}

#[tokio::test]
async fn signup_writes_profile_document_that_login_reads_back() {
    let (base_url, state) = spawn_fake_firebase().await;
    let firebase = backend(&base_url);

    let created = firebase
        .signup(&account("ravi@example.com"))
        .await
        .expect("signup");
    assert_eq!(created.id.as_str(), "uid-1");
    assert_eq!(created.username, "ravi.kulkarni");
    assert_eq!(
        state.lock().unwrap().display_names.get("uid-1").map(String::as_str),
        Some("Ravi Kulkarni")
    );

    let fresh = backend(&base_url);
    let user = fresh
        .login(&Credentials {
            email: "ravi@example.com".into(),
            password: "secret12".into(),
        })
        .await
        .expect("login");
    assert_eq!(user.name, "Ravi Kulkarni");
    assert_eq!(user.district, "Nashik");
    assert_eq!(user.center.id, "15");
    assert_eq!(user.email, "ravi@example.com");
    assert_eq!(user.profile_image, None);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (base_url, _state) = spawn_fake_firebase().await;
    let firebase = backend(&base_url);
    firebase
        .signup(&account("ravi@example.com"))
        .await
        .expect("signup");

    let err = firebase
        .login(&Credentials {
            email: "ravi@example.com".into(),
            password: "nope123".into(),
        })
        .await
        .expect_err("bad password");
    assert!(matches!(err, AuthError::InvalidCredentials));
    let api: ApiError = err.into();
    assert_eq!(api.code, ErrorCode::Unauthorized);
    assert!(api.requires_reauth());
}

#[tokio::test]
async fn duplicate_signup_reports_email_taken() {
    let (base_url, _state) = spawn_fake_firebase().await;
    let firebase = backend(&base_url);
    firebase
        .signup(&account("dup@example.com"))
        .await
        .expect("first signup");
    let err = firebase
        .signup(&account("dup@example.com"))
        .await
        .expect_err("second signup");
    assert!(matches!(err, AuthError::EmailTaken));
}

#[tokio::test]
async fn login_without_profile_document_fails() {
    let (base_url, state) = spawn_fake_firebase().await;
    state
        .lock()
        .unwrap()
        .accounts
        .insert("ghost@example.com".into(), ("secret12".into(), "uid-9".into()));

    let err = backend(&base_url)
        .login(&Credentials {
            email: "ghost@example.com".into(),
            password: "secret12".into(),
        })
        .await
        .expect_err("missing document");
    assert!(matches!(err, AuthError::ProfileMissing(id) if id.as_str() == "uid-9"));
}

#[tokio::test]
async fn profile_update_patches_masked_fields_and_display_name() {
    let (base_url, state) = spawn_fake_firebase().await;
    let firebase = backend(&base_url);
    let user = firebase
        .signup(&account("ravi@example.com"))
        .await
        .expect("signup");

    let update = ProfileUpdate {
        name: Some("Ravi K".into()),
        phone: Some("9000000000".into()),
        ..ProfileUpdate::default()
    };
    let updated = firebase
        .update_profile(&user, &update)
        .await
        .expect("update");
    assert_eq!(updated.name, "Ravi K");
    assert_eq!(updated.address, user.address);

    let fake = state.lock().unwrap();
    let doc = fake.documents.get("uid-1").expect("document");
    assert_eq!(doc["phone"]["stringValue"], "9000000000");
    assert_eq!(doc["district"]["stringValue"], "Nashik");
    assert_eq!(
        fake.display_names.get("uid-1").map(String::as_str),
        Some("Ravi K")
    );
}

#[tokio::test]
async fn restore_without_token_serves_cached_user() {
    let firebase = backend("http://127.0.0.1:9");
    let cached = crate::auth::mock::demo_user("cached@example.com");
    let restored = firebase
        .restore(Some(cached.clone()))
        .await
        .expect("restore");
    assert_eq!(restored, Some(cached));

    let err = firebase
        .update_profile(&crate::auth::mock::demo_user("x@y.z"), &ProfileUpdate::default())
        .await
        .expect_err("no token");
    assert!(matches!(err, AuthError::NotSignedIn));
}

#[test]
fn failure_codes_ignore_trailing_detail() {
    let body = r#"{"error":{"code":400,"message":"INVALID_PASSWORD : bad"}}"#;
    assert!(matches!(
        classify_failure(StatusCode::BAD_REQUEST, body),
        AuthError::InvalidCredentials
    ));
    assert!(matches!(
        classify_failure(StatusCode::SERVICE_UNAVAILABLE, "oops"),
        AuthError::Unavailable(_)
    ));
}
