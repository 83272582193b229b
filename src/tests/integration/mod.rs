//! End-to-end tests through the full warp filter stack

use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::Filter;

use crate::infrastructure::http::HttpServer;
use crate::tests::fixtures::{approved_payment, token_from_last_email, TestContext};

fn server(ctx: &TestContext) -> HttpServer {
    HttpServer::with_dependencies(ctx.config.clone(), ctx.deps.clone()).unwrap()
}

async fn graphql<F>(routes: &F, query: &str, variables: Value, cookie: Option<&str>) -> warp::http::Response<bytes::Bytes>
where
    F: Filter + Clone + Send + Sync + 'static,
    F::Extract: warp::Reply + Send,
{
    let mut request = warp::test::request()
        .method("POST")
        .path("/graphql")
        .header("content-type", "application/json")
        .json(&json!({ "query": query, "variables": variables }));
    if let Some(cookie) = cookie {
        request = request.header("cookie", cookie);
    }
    request.reply(routes).await
}

fn body(response: &warp::http::Response<bytes::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

const LOGIN: &str = "mutation($email: String!, $password: String!) {
    login(email: $email, password: $password) { success client { id email } }
}";

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let ctx = TestContext::new();
    let id = ctx.register("cookie@x.com").await;
    let routes = server(&ctx).routes();

    let response = graphql(
        &routes,
        LOGIN,
        json!({"email": "cookie@x.com", "password": "s3cret-pass"}),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body(&response);
    assert_eq!(data["data"]["login"]["success"], true);
    assert_eq!(data["data"]["login"]["client"]["id"], id);

    let set_cookie = response.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("authToken="));
    assert!(set_cookie.contains("Max-Age=1800"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("SameSite=None"));

    let pair = set_cookie.split(';').next().unwrap();
    let header = format!("theme=dark; {}; lang=es", pair);
    let response = graphql(
        &routes,
        "{ verifySession { authenticated client { id } } }",
        json!({}),
        Some(&header),
    )
    .await;
    let data = body(&response);
    assert_eq!(data["data"]["verifySession"]["authenticated"], true);
    assert_eq!(data["data"]["verifySession"]["client"]["id"], id);

    for header in ["authToken=", "theme=dark"] {
        let response = graphql(
            &routes,
            "{ verifySession { authenticated } }",
            json!({}),
            Some(header),
        )
        .await;
        assert_eq!(body(&response)["data"]["verifySession"]["authenticated"], false);
    }
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let ctx = TestContext::new();
    let routes = server(&ctx).routes();

    let response = graphql(&routes, "mutation { logout }", json!({}), None).await;

    assert_eq!(body(&response)["data"]["logout"], true);
    let set_cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.starts_with("authToken=;"));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("SameSite=None"));
}

#[tokio::test]
async fn test_login_errors_do_not_reveal_accounts() {
    let ctx = TestContext::new();
    ctx.register("known@x.com").await;
    let routes = server(&ctx).routes();

    let wrong_password = graphql(&routes, LOGIN, json!({"email": "known@x.com", "password": "nope"}), None).await;
    let unknown_email = graphql(&routes, LOGIN, json!({"email": "ghost@x.com", "password": "nope"}), None).await;

    assert!(!wrong_password.headers().contains_key("set-cookie"));
    let a = body(&wrong_password);
    let b = body(&unknown_email);
    assert_eq!(a["errors"], b["errors"]);
    assert_eq!(a["errors"][0]["extensions"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_error_codes_in_extensions() {
    let ctx = TestContext::new();
    ctx.register("dup@x.com").await;
    let routes = server(&ctx).routes();

    let response = graphql(&routes, r#"{ client(id: "missing") { id } }"#, json!({}), None).await;
    assert_eq!(body(&response)["errors"][0]["extensions"]["code"], "NOT_FOUND");

    let response = graphql(
        &routes,
        "mutation($input: CreateClientInput!) { createClient(input: $input) }",
        json!({"input": {"name": "Ana", "surname": "García", "email": "dup@x.com", "password": "p"}}),
        None,
    )
    .await;
    assert_eq!(body(&response)["errors"][0]["extensions"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_catalog_over_graphql() {
    let ctx = TestContext::new();
    let routes = server(&ctx).routes();

    let response = graphql(
        &routes,
        r#"mutation { createMuscleGroup(name: "Legs") { id name } }"#,
        json!({}),
        None,
    )
    .await;
    let group_id = body(&response)["data"]["createMuscleGroup"]["id"].as_str().unwrap().to_string();

    let response = graphql(
        &routes,
        "mutation($input: ExerciseInput!) { createExercise(input: $input) { id name } }",
        json!({"input": {"name": "Squat", "description": "d", "execution": "e", "muscleGroupId": group_id}}),
        None,
    )
    .await;
    let squat = body(&response)["data"]["createExercise"]["id"].as_str().unwrap().to_string();

    let response = graphql(
        &routes,
        "mutation($input: RoutineInput!) { createRoutine(input: $input) { name level exercises { id } } }",
        json!({"input": {
            "name": "LegDay",
            "muscleGroupId": group_id,
            "level": "NIVEL_1",
            "exerciseIds": [squat],
            "setSpecs": [{"sets": 3, "repetitions": 10}]
        }}),
        None,
    )
    .await;
    let data = body(&response);
    assert!(data.get("errors").is_none(), "{}", data);
    assert_eq!(data["data"]["createRoutine"]["level"], "NIVEL_1");
    assert_eq!(data["data"]["createRoutine"]["exercises"][0]["id"], squat);
}

#[tokio::test]
async fn test_confirm_account_over_graphql() {
    let ctx = TestContext::new();
    ctx.register("confirm@x.com").await;
    let token = token_from_last_email(&ctx.mailer, "confirm@x.com");
    let routes = server(&ctx).routes();

    let response = graphql(
        &routes,
        "mutation($token: String!) { confirmAccount(token: $token) { success message } }",
        json!({"token": token}),
        None,
    )
    .await;
    assert_eq!(body(&response)["data"]["confirmAccount"]["success"], true);
}

#[tokio::test]
async fn test_avatar_multipart_upload() {
    let ctx = TestContext::new();
    let id = ctx.register("upload@x.com").await;
    let routes = server(&ctx).routes();

    let boundary = "fitnetboundary";
    let operations = json!({
        "query": "mutation($clientId: ID!, $file: Upload!) { uploadAvatar(clientId: $clientId, file: $file) { path } }",
        "variables": {"clientId": id, "file": null}
    });
    let multipart = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"operations\"\r\n\r\n{ops}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"map\"\r\n\r\n{{\"0\": [\"variables.file\"]}}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"0\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n\
         --{b}--\r\n",
        b = boundary,
        ops = operations
    );

    let response = warp::test::request()
        .method("POST")
        .path("/graphql")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(multipart)
        .reply(&routes)
        .await;

    let data = body(&response);
    assert!(data.get("errors").is_none(), "{}", data);
    let path = data["data"]["uploadAvatar"]["path"].as_str().unwrap();
    assert!(path.starts_with("/uploads/avatars/"));

    let served = warp::test::request().method("GET").path(path).reply(&routes).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.body().as_ref(), b"PNGDATA");
}

#[tokio::test]
async fn test_process_payment_and_webhook() {
    let ctx = TestContext::new();
    let client_id = ctx.register("shop@x.com").await;
    let routes = server(&ctx).routes();

    let response = warp::test::request()
        .method("POST")
        .path("/process_payment")
        .json(&json!({
            "clientId": client_id,
            "items": [{"title": "Monthly membership", "quantity": 1, "unit_price": 15000.0}],
            "payer": {"email": "shop@x.com"}
        }))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reference = body(&response)["external_reference"].as_str().unwrap().to_string();

    ctx.gateway.set_payment(approved_payment("5150", &reference, 15000.0));

    for expected in ["updated", "unchanged"] {
        let response = warp::test::request()
            .method("POST")
            .path("/webhook?type=payment")
            .json(&json!({"action": "payment.updated", "data": {"id": "5150"}}))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response)["outcome"], expected);
    }

    let client = ctx.services.clients.get_client(&client_id).await.unwrap();
    assert!(client.enabled_at.is_some());
}

#[tokio::test]
async fn test_webhook_acknowledges_failures() {
    let ctx = TestContext::new();
    let routes = server(&ctx).routes();

    let response = warp::test::request()
        .method("POST")
        .path("/webhook?data.id=unknown&type=payment")
        .body("")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["outcome"], "failed");

    let response = warp::test::request()
        .method("POST")
        .path("/webhook?topic=merchant_order&id=1")
        .body("")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["outcome"], "ignored");
}

#[tokio::test]
async fn test_webhook_ignores_malformed_payment_ids() {
    let ctx = TestContext::new();
    let routes = server(&ctx).routes();

    let response = warp::test::request()
        .method("POST")
        .path("/webhook?type=payment")
        .json(&json!({"data": {"id": "../../users/me?x=1"}}))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["outcome"], "ignored");
    assert_eq!(ctx.gateway.fetch_count(), 0);
}

#[tokio::test]
async fn test_process_payment_unknown_client() {
    let ctx = TestContext::new();
    let routes = server(&ctx).routes();

    let response = warp::test::request()
        .method("POST")
        .path("/process_payment")
        .json(&json!({
            "clientId": "missing",
            "items": [{"title": "Monthly", "quantity": 1, "unit_price": 10.0}]
        }))
        .reply(&routes)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response)["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_rate_limit_applies_to_graphql() {
    let mut ctx = TestContext::new();
    ctx.config.rate_limit.enabled = true;
    ctx.config.rate_limit.requests_per_minute = 1;
    ctx.config.rate_limit.burst_size = 1;
    let routes = server(&ctx).routes();

    let first = graphql(&routes, "{ muscleGroups { id } }", json!({}), None).await;
    let second = graphql(&routes, "{ muscleGroups { id } }", json!({}), None).await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body(&second)["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_health_metrics_and_graphiql() {
    let ctx = TestContext::new();
    let routes = server(&ctx).routes();

    let health = warp::test::request().method("GET").path("/health").reply(&routes).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body(&health)["status"], "healthy");
    assert!(health.headers().contains_key("content-security-policy"));

    let metrics = warp::test::request().method("GET").path("/metrics").reply(&routes).await;
    assert_eq!(metrics.status(), StatusCode::OK);
    assert!(String::from_utf8_lossy(metrics.body()).contains("# TYPE"));

    let graphiql = warp::test::request().method("GET").path("/graphql").reply(&routes).await;
    assert_eq!(graphiql.status(), StatusCode::OK);
    assert!(String::from_utf8_lossy(graphiql.body()).contains("graphiql"));

    let missing = warp::test::request().method("GET").path("/nothing").reply(&routes).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
