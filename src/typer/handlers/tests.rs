//! Router-level tests against the in-memory store.

use crate::typer::{
    password,
    questions::QuestionSet,
    router,
    store::{MemoryStore, Stats, UserStore},
    token::{Algorithm, TokenCodec},
};
use anyhow::{anyhow, Result};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use secrecy::SecretString;
use std::sync::Arc;
use tower::ServiceExt;

use super::{extract_session_token, now_unix_millis, now_unix_seconds};

const QUESTION: &str = "Hello World";
const ANSWER: &str = "hello world";

struct TestApp {
    store: Arc<MemoryStore>,
    codec: Arc<TokenCodec>,
    app: Router,
}

impl TestApp {
    fn new() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let codec = Arc::new(TokenCodec::new(
            SecretString::from("test-secret".to_string()),
            Algorithm::HS256,
        ));
        let questions = Arc::new(QuestionSet::from_pairs([(QUESTION, ANSWER)])?);
        let app = router(store.clone(), codec.clone(), questions);
        Ok(Self { store, codec, app })
    }

    async fn with_user(username: &str, plain: &str) -> Result<Self> {
        let test_app = Self::new()?;
        let hash = password::hash(plain).map_err(|e| anyhow!("{e}"))?;
        test_app.store.create(username, &hash).await?;
        Ok(test_app)
    }

    fn token(&self, username: &str, question_start: Option<i64>) -> Result<String> {
        Ok(self
            .codec
            .encode(username, question_start, now_unix_seconds())?)
    }

    async fn stats(&self, username: &str) -> Result<Option<Stats>> {
        Ok(self.store.get_stats(username).await?)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> Result<Response> {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            request = request.header(COOKIE, format!("token={token}"));
        }
        Ok(self.app.clone().oneshot(request.body(Body::empty())?).await?)
    }

    async fn post_form(&self, uri: &str, form: &str, token: Option<&str>) -> Result<Response> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            request = request.header(COOKIE, format!("other=1; token={token}"));
        }
        Ok(self
            .app
            .clone()
            .oneshot(request.body(Body::from(form.to_string()))?)
            .await?)
    }
}

async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION)?.to_str().ok()
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)?
        .to_str()
        .ok()
        .map(str::to_string)
}

/// Token value from a `Set-Cookie` header, via the same parser used for requests.
fn issued_token(response: &Response) -> Option<String> {
    let cookie = set_cookie(response)?;
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(COOKIE, cookie.parse().ok()?);
    extract_session_token(&headers)
}

#[tokio::test]
async fn register_creates_user_with_zero_stats() -> Result<()> {
    let test_app = TestApp::new()?;
    let response = test_app
        .post_form("/user-register", "username=alice&password=Passw0rd%21", None)
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_text(response)
        .await?
        .contains("You are successfully registered!"));
    assert_eq!(test_app.stats("alice").await?, Some(Stats::new(0, 0, 0)));
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicate_and_invalid_input() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;

    let duplicate = test_app
        .post_form("/user-register", "username=alice&password=Passw0rd%21", None)
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert!(body_text(duplicate)
        .await?
        .contains("User is already registered!"));

    let invalid = test_app
        .post_form("/user-register", "username=bob&password=short", None)
        .await?;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body = body_text(invalid).await?;
    assert!(body.contains("Username should be longer than 5 symbols!"));
    assert!(body.contains("Password should be longer then 8 symbols!"));
    assert_eq!(test_app.stats("bob").await?, None);
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_sets_no_cookie() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;
    let response = test_app
        .post_form("/user-login", "username=alice&password=wrongpass", None)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response).is_none());
    assert!(body_text(response)
        .await?
        .contains("Incorrect password or username!"));
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_user_offers_registration() -> Result<()> {
    let test_app = TestApp::new()?;
    let response = test_app
        .post_form("/user-login", "username=ghost&password=Passw0rd%21", None)
        .await?;

    assert!(set_cookie(&response).is_none());
    let body = body_text(response).await?;
    assert!(body.contains("User does not exist!"));
    assert!(body.contains("action=\"/user-register\""));
    Ok(())
}

#[tokio::test]
async fn login_sets_cookie_and_opens_profile() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;
    let response = test_app
        .post_form("/user-login", "username=alice&password=Passw0rd%21", None)
        .await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/user"));
    let cookie = set_cookie(&response).unwrap_or_default();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=3600"));

    let token = issued_token(&response).ok_or_else(|| anyhow!("no token issued"))?;
    let claims = test_app.codec.decode(&token, now_unix_seconds());
    assert_eq!(claims.map(|c| c.sub), Some("alice".to_string()));

    let profile = test_app.get("/user", Some(&token)).await?;
    assert_eq!(profile.status(), StatusCode::OK);
    assert!(body_text(profile).await?.contains("<h1>alice</h1>"));

    let login_page = test_app.get("/login", Some(&token)).await?;
    assert_eq!(login_page.status(), StatusCode::FOUND);
    assert_eq!(location(&login_page), Some("/user"));
    Ok(())
}

#[tokio::test]
async fn profile_requires_a_live_token() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;

    let anonymous = test_app.get("/user", None).await?;
    assert_eq!(anonymous.status(), StatusCode::FOUND);
    assert_eq!(location(&anonymous), Some("/login"));

    let expired = test_app
        .codec
        .encode("alice", None, now_unix_seconds() - 7200)?;
    let response = test_app.get("/user", Some(&expired)).await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(test_app.stats("alice").await?, Some(Stats::default()));
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let test_app = TestApp::new()?;
    let response = test_app.post_form("/logout", "", None).await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
    let cookie = set_cookie(&response).unwrap_or_default();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn logout_by_get_clears_cookie() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;
    let token = test_app.token("alice", None)?;
    let response = test_app.get("/logout", Some(&token)).await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
    let cookie = set_cookie(&response).unwrap_or_default();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn start_page_links_login_and_register() -> Result<()> {
    let test_app = TestApp::new()?;
    let response = test_app.get("/", None).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await?;
    assert!(body.contains("href=\"/login\""));
    assert!(body.contains("href=\"/register\""));
    Ok(())
}

#[tokio::test]
async fn register_page_posts_to_user_register() -> Result<()> {
    let test_app = TestApp::new()?;
    let response = test_app.get("/register", None).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_none());
    let body = body_text(response).await?;
    assert!(body.contains("<h1>Register</h1>"));
    assert!(body.contains("action=\"/user-register\""));
    Ok(())
}

#[tokio::test]
async fn quiz_without_session_redirects_to_login() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;
    let response = test_app
        .post_form("/type", "question=Hello+World&answer=hello+world", None)
        .await?;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(test_app.stats("alice").await?, Some(Stats::default()));
    Ok(())
}

#[tokio::test]
async fn quiz_first_question_starts_the_clock() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;
    let token = test_app.token("alice", None)?;
    let before = now_unix_millis();

    let response = test_app.post_form("/type", "", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let issued = issued_token(&response).ok_or_else(|| anyhow!("no token issued"))?;
    let started = test_app
        .codec
        .decode(&issued, now_unix_seconds())
        .and_then(|c| c.qst)
        .ok_or_else(|| anyhow!("no question start"))?;
    assert!(started >= before);

    let body = body_text(response).await?;
    assert!(body.contains(QUESTION));
    assert!(!body.contains("data-result"));
    assert_eq!(test_app.stats("alice").await?, Some(Stats::default()));
    Ok(())
}

#[tokio::test]
async fn quiz_correct_answer_counts_and_reports_time() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;
    let token = test_app.token("alice", Some(now_unix_millis() - 1_500))?;

    let response = test_app
        .post_form(
            "/type",
            "question=Hello+World&answer=Hello+World",
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(issued_token(&response).is_some());

    let body = body_text(response).await?;
    assert!(body.contains("data-result=\"true\""));
    assert!(body.contains("Time elapsed: "));
    assert_eq!(test_app.stats("alice").await?, Some(Stats::new(1, 0, 0)));
    Ok(())
}

#[tokio::test]
async fn quiz_wrong_and_empty_answers() -> Result<()> {
    let test_app = TestApp::with_user("alice", "Passw0rd!").await?;
    let token = test_app.token("alice", Some(now_unix_millis()))?;

    let wrong = test_app
        .post_form("/type", "question=Hello+World&answer=nope", Some(&token))
        .await?;
    let body = body_text(wrong).await?;
    assert!(body.contains("data-result=\"false\""));
    assert!(body.contains("Answer was: Hello world"));

    let skipped = test_app
        .post_form("/type", "question=Hello+World&answer=", Some(&token))
        .await?;
    assert!(body_text(skipped).await?.contains("data-result=\"skip\""));

    assert_eq!(test_app.stats("alice").await?, Some(Stats::new(0, 1, 1)));
    Ok(())
}

#[tokio::test]
async fn quiz_for_vanished_user_redirects_to_login() -> Result<()> {
    let test_app = TestApp::new()?;
    let token = test_app.token("ghost", Some(now_unix_millis()))?;

    let response = test_app
        .post_form("/type", "question=Hello+World&answer=x", Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
    assert!(set_cookie(&response).is_none());
    Ok(())
}

#[tokio::test]
async fn top_lists_ten_users_by_correct_answers() -> Result<()> {
    let test_app = TestApp::new()?;
    for i in 0..11u64 {
        let username = format!("user{i:02}");
        test_app.store.create(&username, "hash").await?;
        test_app
            .store
            .update_stats(&username, Stats::new(i, 0, 0))
            .await?;
    }

    let response = test_app.get("/top", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await?;

    assert!(body.contains("<h1>Top 10</h1>"));
    assert!(!body.contains("user00"));
    let first = body.find("user10").ok_or_else(|| anyhow!("user10 missing"))?;
    let last = body.find("user01").ok_or_else(|| anyhow!("user01 missing"))?;
    assert!(first < last);
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let test_app = TestApp::new()?;
    let response = test_app.get("/health", None).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-app"));
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(body["database"], "ok");
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));

    let ping = test_app.get("/ping", None).await?;
    assert_eq!(ping.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn health_and_ping_carry_request_id() -> Result<()> {
    let test_app = TestApp::new()?;

    for uri in ["/health", "/ping"] {
        let response = test_app.get(uri, None).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(request_id.parse::<ulid::Ulid>().is_ok(), "{uri}: {request_id}");
    }

    let request = Request::builder()
        .method("GET")
        .uri("/ping")
        .header("x-request-id", "01HZZZZZZZZZZZZZZZZZZZZZZZ")
        .body(Body::empty())?;
    let response = test_app.app.clone().oneshot(request).await?;
    assert_eq!(
        response.headers().get("x-request-id").map(|v| v.as_bytes()),
        Some(&b"01HZZZZZZZZZZZZZZZZZZZZZZZ"[..])
    );
    Ok(())
}

#[test]
fn session_token_is_found_among_other_cookies() {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(COOKIE, "a=1; token=abc.def.ghi; b=2".parse().unwrap());
    assert_eq!(
        extract_session_token(&headers),
        Some("abc.def.ghi".to_string())
    );

    headers.insert(COOKIE, "token=".parse().unwrap());
    assert_eq!(extract_session_token(&headers), None);
}
