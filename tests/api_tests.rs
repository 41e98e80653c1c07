//! Integration tests for the REST side of schwab-web-rs.
//!
//! Every test runs against a local wiremock server standing in for the
//! platform gateway; the client is seeded with captured credentials instead
//! of a browser login.
//!
//! Run with: cargo test --test api_tests

use std::sync::Once;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use schwab_web_rs::client::endpoints::{ORDERS_PATH, POSITIONS_PATH, TOKEN_AUTHORIZE_PATH};
use schwab_web_rs::prelude::*;

static INIT: Once = Once::new();

/// Initialize logging for tests
fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn captured_session() -> Session {
    let bundle = CredentialBundle::from_capture(
        vec![
            ("authorization", "Bearer initial"),
            ("schwab-channelcode", "IO"),
            ("schwab-client-appid", "AD00008376"),
            (":authority", "ausgateway.schwab.com"),
        ],
        "sid=abc; tok=xyz",
    )
    .expect("valid capture");
    Session::from_bundle(bundle)
}

/// Create a client aimed at the mock server.
fn create_client(server: &MockServer, config: ClientConfig) -> SchwabClient {
    init_logging();
    let endpoints = Endpoints::for_base_url(&server.uri()).expect("mock server uri");
    SchwabClient::with_session(captured_session(), config.with_endpoints(endpoints))
        .expect("client builds")
}

fn token_path(scope: &str) -> String {
    format!("{TOKEN_AUTHORIZE_PATH}{scope}")
}

async fn mount_token(server: &MockServer, scope: &str, token: &str) {
    Mock::given(method("GET"))
        .and(path(token_path(scope)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(server)
        .await;
}

fn order_response(order_id: i64, code: i32, messages: &[&str], security_id: i64) -> Value {
    json!({
        "orderStrategy": {
            "orderId": order_id,
            "orderReturnCode": code,
            "orderMessages": messages.iter().map(|m| json!({ "message": m })).collect::<Vec<_>>(),
            "orderLegs": [{ "schwabSecurityId": security_id }]
        }
    })
}

async fn mount_phase(server: &MockServer, control: u8, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(ORDERS_PATH))
        .and(body_partial_json(json!({ "OrderProcessingControl": control })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn order_posts(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == ORDERS_PATH)
        .map(|r| serde_json::from_slice(&r.body).expect("order body is JSON"))
        .collect()
}

fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// Trade engine
// =============================================================================

#[tokio::test]
async fn test_invalid_side_makes_no_requests() {
    let server = MockServer::start().await;
    let client = create_client(&server, ClientConfig::default());

    for side in ["buy", "SELL", "Short", ""] {
        let err = client
            .orders()
            .trade("AAPL", side, 1.0, "12345678", true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "side {side:?}");
    }

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no request may be sent, got {}", requests.len());
}

#[tokio::test]
async fn test_verify_then_execute() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(555, 0, &["OK"], 9)),
    )
    .await;
    mount_phase(
        &server,
        2,
        ResponseTemplate::new(200).set_body_json(order_response(555, 10, &["Placed with warning"], 9)),
    )
    .await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Buy", 2.0, "12345678", false)
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.messages, vec!["Placed with warning".to_string()]);

    let posts = order_posts(&server).await;
    assert_eq!(posts.len(), 2);

    let verify = &posts[0];
    assert_eq!(verify["OrderProcessingControl"], 1);
    assert_eq!(verify["UserContext"]["AccountId"], "12345678");
    assert!(verify["UserContext"].get("CustomerId").is_none());
    assert!(verify["OrderStrategy"].get("OrderId").is_none());
    let leg = &verify["OrderStrategy"]["OrderLegs"][0];
    assert_eq!(leg["Instruction"], "49");
    assert_eq!(leg["Quantity"], "2.000000");
    assert_eq!(leg["Instrument"]["Symbol"], "AAPL");
    assert!(leg["Instrument"].get("ItemIssueId").is_none());

    let execute = &posts[1];
    assert_eq!(execute["OrderProcessingControl"], 2);
    assert_eq!(execute["OrderStrategy"]["OrderId"], 555);
    assert_eq!(execute["OrderStrategy"]["OrderLegs"][0]["Instrument"]["ItemIssueId"], 9);
    assert_eq!(execute["UserContext"]["CustomerId"], 0);
    // Everything else is echoed from verification.
    assert_eq!(execute["OrderStrategy"]["OrderType"], verify["OrderStrategy"]["OrderType"]);
    assert_eq!(execute["OrderStrategy"]["Duration"], verify["OrderStrategy"]["Duration"]);
    assert_eq!(
        execute["OrderStrategy"]["CostBasisRequest"],
        verify["OrderStrategy"]["CostBasisRequest"]
    );
}

#[tokio::test]
async fn test_order_posts_carry_required_headers() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(1, 0, &[], 9)),
    )
    .await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Sell", 1.0, "12345678", true)
        .await
        .unwrap();
    assert!(outcome.success);

    let requests = server.received_requests().await.unwrap_or_default();
    let post = requests
        .iter()
        .find(|r| r.url.path() == ORDERS_PATH)
        .expect("verification was sent");
    assert_eq!(header_value(post, "schwab-resource-version"), Some("1.0"));
    assert_eq!(header_value(post, "content-type"), Some("application/json"));
    assert_eq!(header_value(post, "authorization"), Some("Bearer fresh"));
    assert_eq!(header_value(post, "cookie"), Some("sid=abc; tok=xyz"));
    assert_eq!(header_value(post, "schwab-channelcode"), Some("IO"));

    let body: Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(body["OrderStrategy"]["OrderLegs"][0]["Instruction"], "50");
}

#[tokio::test]
async fn test_dry_run_never_executes() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(555, 10, &["Warning", "Still fine"], 9)),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(ORDERS_PATH))
        .and(body_partial_json(json!({ "OrderProcessingControl": 2 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Buy", 1.0, "12345678", true)
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.messages, vec!["Warning", "Still fine"]);
    assert_eq!(order_posts(&server).await.len(), 1);
}

#[tokio::test]
async fn test_rejection_codes_at_verification() {
    for code in [1, 5, 11, 20, -1, -10] {
        let server = MockServer::start().await;
        mount_token(&server, "update", "fresh").await;
        mount_phase(
            &server,
            1,
            ResponseTemplate::new(200).set_body_json(order_response(7, code, &["Insufficient funds"], 9)),
        )
        .await;

        let client = create_client(&server, ClientConfig::default());
        let outcome = client
            .orders()
            .trade("AAPL", "Buy", 1.0, "12345678", false)
            .await
            .unwrap();

        assert!(!outcome.success, "code {code} must be a rejection");
        assert_eq!(outcome.messages, vec!["Insufficient funds"]);
        assert_eq!(order_posts(&server).await.len(), 1, "code {code} must not execute");
    }
}

#[tokio::test]
async fn test_rejection_code_at_execution() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(555, 0, &["Verified"], 9)),
    )
    .await;
    mount_phase(
        &server,
        2,
        ResponseTemplate::new(200).set_body_json(order_response(555, -3, &["Market closed"], 9)),
    )
    .await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Buy", 1.0, "12345678", false)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.messages, vec!["Market closed"]);
}

#[tokio::test]
async fn test_non_200_verification_is_soft_failure() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(&server, 1, ResponseTemplate::new(400).set_body_string("bad order")).await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Buy", 1.0, "12345678", false)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.messages, vec!["bad order"]);
    assert_eq!(order_posts(&server).await.len(), 1);
}

#[tokio::test]
async fn test_non_200_execution_is_soft_failure() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(555, 0, &["OK"], 9)),
    )
    .await;
    mount_phase(&server, 2, ResponseTemplate::new(503).set_body_string("gateway down")).await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Buy", 1.0, "12345678", false)
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.messages, vec!["gateway down"]);
}

#[tokio::test]
async fn test_undecodable_verification_is_an_error() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(&server, 1, ResponseTemplate::new(200).set_body_string("<html>")).await;

    let client = create_client(&server, ClientConfig::default());
    let err = client
        .orders()
        .trade("AAPL", "Buy", 1.0, "12345678", false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn test_verification_without_strategy_never_executes() {
    let server = MockServer::start().await;
    let client = create_client(&server, ClientConfig::default());

    for body in [json!({}), json!({ "orderStrategy": {} }), json!({ "orderStrategy": null })] {
        server.reset().await;
        mount_token(&server, "update", "fresh").await;
        mount_phase(&server, 1, ResponseTemplate::new(200).set_body_json(body.clone())).await;
        mount_phase(
            &server,
            2,
            ResponseTemplate::new(200).set_body_json(order_response(555, 0, &["OK"], 9)),
        )
        .await;

        let err = client
            .orders()
            .trade("AAPL", "Buy", 1.0, "12345678", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)), "{body} was accepted");

        let posts = order_posts(&server).await;
        assert_eq!(posts.len(), 1, "{body} led to execution");
        assert_eq!(posts[0]["OrderProcessingControl"], 1);
    }
}

#[tokio::test]
async fn test_undecodable_execution_is_tolerated() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(555, 0, &["OK"], 9)),
    )
    .await;
    mount_phase(&server, 2, ResponseTemplate::new(200).set_body_string("not json")).await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Buy", 1.0, "12345678", false)
        .await
        .unwrap();

    assert!(outcome.success);
    assert!(outcome.messages.is_empty());
}

#[tokio::test]
async fn test_trade_v2_matches_trade() {
    let server = MockServer::start().await;
    mount_token(&server, "update", "fresh").await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(1, 0, &["OK"], 9)),
    )
    .await;

    let client = create_client(&server, ClientConfig::default());
    let a = client.orders().trade("AAPL", "Buy", 1.0, "1", true).await.unwrap();
    let b = client.orders().trade_v2("AAPL", "Buy", 1.0, "1", true).await.unwrap();
    assert_eq!(a, b);

    assert!(client.orders().trade_v2("AAPL", "Hold", 1.0, "1", true).await.is_err());
}

// =============================================================================
// Token refresh
// =============================================================================

#[tokio::test]
async fn test_refresh_failure_is_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(token_path("update")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_phase(
        &server,
        1,
        ResponseTemplate::new(200).set_body_json(order_response(1, 0, &["OK"], 9)),
    )
    .await;

    let client = create_client(&server, ClientConfig::default());
    let outcome = client
        .orders()
        .trade("AAPL", "Buy", 1.0, "12345678", true)
        .await
        .unwrap();
    assert!(outcome.success);

    let requests = server.received_requests().await.unwrap_or_default();
    let post = requests.iter().find(|r| r.url.path() == ORDERS_PATH).unwrap();
    assert_eq!(header_value(post, "authorization"), Some("Bearer initial"));
}

#[tokio::test]
async fn test_explicit_refresh_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(token_path("api")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = create_client(&server, ClientConfig::default());
    let err = client.refresh_token(TokenScope::Api).await.unwrap_err();
    assert!(matches!(err, Error::TokenRefresh { status: 403 }));
    assert!(err.is_auth_error());

    let bearer = client
        .session()
        .with_bundle(|b| b.header("Authorization").map(str::to_string))
        .await;
    assert_eq!(bearer.as_deref(), Some("Bearer initial"));
}

#[tokio::test]
async fn test_explicit_refresh_updates_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(token_path("update")))
        .and(header("authorization", "Bearer initial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "next" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, ClientConfig::default());
    client.refresh_token("update").await.unwrap();

    let (header, names) = client
        .session()
        .with_bundle(|b| {
            (
                b.header("authorization").map(str::to_string),
                b.headers()
                    .keys()
                    .filter(|k| k.eq_ignore_ascii_case("authorization"))
                    .count(),
            )
        })
        .await;
    assert_eq!(header.as_deref(), Some("Bearer next"));
    assert_eq!(names, 1);
    assert!(client.session().refreshed_at().await.is_some());
}

// =============================================================================
// Positions
// =============================================================================

fn positions_body() -> Value {
    json!({
        "accounts": [
            {
                "accountId": "12345",
                "totals": {
                    "marketValue": 1500.5,
                    "cashInvestments": 200.0,
                    "accountValue": 1700.5,
                    "costBasis": null
                },
                "groupedPositions": [
                    {
                        "groupName": "Equities",
                        "holdingsRows": [
                            {
                                "symbol": { "symbol": "AAPL", "ssId": 9 },
                                "description": { "description": "APPLE INC" },
                                "qty": { "qty": 5.0 },
                                "costBasis": { "cstBasis": 700.0 },
                                "marketValue": { "val": 900.5 }
                            },
                            {
                                "symbol": { "symbol": "MSFT" },
                                "description": "MICROSOFT CORP",
                                "qty": { "qty": 1.0 },
                                "marketValue": { "val": 600.0 }
                            }
                        ]
                    },
                    {
                        "groupName": "ETFs",
                        "holdingsRows": [
                            {
                                "symbol": { "symbol": "SPY" },
                                "description": { "text": "SPDR S&P 500" },
                                "qty": { "qty": 0.5 },
                                "marketValue": { "val": 250.0 }
                            }
                        ]
                    }
                ]
            },
            {
                "accountId": 67890,
                "totals": { "accountValue": 10.0 },
                "groupedPositions": []
            },
            {
                "accountId": "XXXX-1",
                "totals": { "accountValue": 1.0 }
            }
        ]
    })
}

async fn mount_positions(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_positions_keyed_by_numeric_id() {
    let server = MockServer::start().await;
    mount_token(&server, "api", "fresh").await;
    mount_positions(&server).await;

    let client = create_client(&server, ClientConfig::default());
    let accounts = client.positions().get().await.unwrap();

    assert_eq!(accounts.keys().copied().collect::<Vec<_>>(), vec![12345, 67890]);
    let account = &accounts[&12345];
    assert_eq!(account.totals.account_value, 1700.5);
    assert_eq!(account.totals.cost_basis, 0.0);
    assert_eq!(account.groups.len(), 2);

    let descriptions: Vec<&str> = account.rows().map(|r| r.description.as_str()).collect();
    assert_eq!(descriptions, vec!["APPLE INC", "MICROSOFT CORP", "SPDR S&P 500"]);
}

#[tokio::test]
async fn test_positions_legacy_shape() {
    let server = MockServer::start().await;
    mount_token(&server, "api", "fresh").await;
    mount_positions(&server).await;

    let client = create_client(&server, ClientConfig::default());
    let legacy = client.positions().get_legacy().await.unwrap();

    let account = &legacy["12345"];
    assert_eq!(account.account_value, 1700.5);
    let symbols: Vec<&str> = account.positions.iter().map(|p| p.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT", "SPY"]);
    assert_eq!(account.positions[2].quantity, 0.5);
    assert_eq!(account.positions[0].market_value, 900.5);

    assert!(legacy["67890"].positions.is_empty());
}

#[tokio::test]
async fn test_positions_send_refreshed_token_and_account_hint() {
    let server = MockServer::start().await;
    mount_token(&server, "api", "fresh").await;
    mount_positions(&server).await;

    let config = ClientConfig::default().with_account_ids(vec![AccountId::new("12345")]);
    let client = create_client(&server, config);
    client.positions().get().await.unwrap();

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests[0].url.path(), token_path("api"));
    let get = requests
        .iter()
        .find(|r| r.url.path() == POSITIONS_PATH)
        .expect("positions were requested");
    assert_eq!(header_value(get, "authorization"), Some("Bearer fresh"));
    assert_eq!(header_value(get, "schwab-client-ids"), Some("12345"));
    assert_eq!(header_value(get, "schwab-client-appid"), Some("AD00008376"));
    assert!(get.headers.get(":authority").is_none());
}

#[tokio::test]
async fn test_positions_api_error_carries_excerpt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(800)))
        .mount(&server)
        .await;

    let client = create_client(&server, ClientConfig::default());
    let err = client.positions().get().await.unwrap_err();

    match err {
        Error::Api { status, ref body } => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 503);
            assert!(body.ends_with("..."));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_positions_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSITIONS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let client = create_client(&server, ClientConfig::default());
    let err = client.positions().get().await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(err.to_string().contains("401"));
}
