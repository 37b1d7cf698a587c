// HTTP-level tests against the assembled app, driven through poem's TestClient.

use std::path::PathBuf;
use std::time::Duration;

use poem::http::StatusCode;
use poem::test::{TestClient, TestResponse};
use poem::{Body, Endpoint};
use serde_json::{json, Value};

use stockwise::app::{build_app, AppState};
use stockwise::config::Config;

struct Sandbox {
    dir: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!(
            "stockwise-api-{}",
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::create_dir_all(dir.join("outputs")).unwrap();
        Self { dir }
    }

    fn config(&self) -> Config {
        Config {
            upload_dir: self.dir.join("uploads"),
            output_dir: self.dir.join("outputs"),
            forecast_script: self.dir.join("forecast.sh"),
            python_bin: "sh".to_string(),
            page_size: 2,
            ..Config::default()
        }
    }

    fn write_output(&self, file: &str, contents: impl AsRef<[u8]>) {
        std::fs::write(self.dir.join("outputs").join(file), contents).unwrap();
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn client(config: Config) -> TestClient<impl Endpoint> {
    let state = AppState::new(config);
    TestClient::new(build_app(&state))
}

async fn json_body(resp: TestResponse) -> Value {
    let text = resp.0.into_body().into_string().await.unwrap();
    serde_json::from_str(&text).unwrap()
}

async fn register(cli: &TestClient<impl Endpoint>, email: &str) -> String {
    let resp = cli
        .post("/api/v1/auth/register")
        .body_json(&json!({
            "name": "Shopkeeper",
            "email": email,
            "password": "secret123",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let body = json_body(resp).await;
    body["token"].as_str().unwrap().to_string()
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn create_consumer(cli: &TestClient<impl Endpoint>, token: &str, name: &str, email: &str) {
    let resp = cli
        .post("/api/v1/consumer/register")
        .header("Authorization", bearer(token))
        .body_json(&json!({
            "name": name,
            "email": email,
            "mobile": "9000000000",
            "address": "Pune",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
}

async fn first_consumer_id(cli: &TestClient<impl Endpoint>, token: &str) -> String {
    let resp = cli
        .get("/api/v1/consumer/get-all")
        .header("Authorization", bearer(token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    body["data"][0]["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_login_profile() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let token = register(&cli, "Owner@Shop.in").await;

    let resp = cli
        .post("/api/v1/auth/login")
        .body_json(&json!({"email": "owner@shop.in", "password": "secret123"}))
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    assert_eq!(body["msg"], "User Login Successfully");
    assert!(body["token"].is_string());

    let resp = cli
        .get("/api/v1/auth/profile")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    assert_eq!(body["msg"], "Data fetched");
    assert_eq!(body["user"]["email"], "owner@shop.in");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_failures() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());
    register(&cli, "owner@shop.in").await;

    let resp = cli
        .post("/api/v1/auth/login")
        .body_json(&json!({"email": "nobody@shop.in", "password": "secret123"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "User Not Registered");

    let resp = cli
        .post("/api/v1/auth/login")
        .body_json(&json!({"email": "owner@shop.in", "password": "wrong-pass"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Invalid Credentials");
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
async fn test_register_validation_error() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli
        .post("/api/v1/auth/register")
        .body_json(&json!({"name": "A", "email": "not-an-email", "password": "secret123"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "email must be valid");
}

#[tokio::test]
async fn test_missing_fields_reach_validation() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli
        .post("/api/v1/auth/register")
        .body_json(&json!({"email": "a@b.co", "password": "secret123"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "name cannot be empty");
    assert_eq!(body["statusCode"], 400);

    let resp = cli
        .post("/api/v1/auth/register")
        .body_json(&json!({"name": "Asha", "password": "secret123"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "email is required");

    let resp = cli
        .post("/api/v1/auth/login")
        .body_json(&json!({"email": "a@b.co"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "password is required");

    let token = register(&cli, "owner@shop.in").await;

    let resp = cli
        .post("/api/v1/consumer/register")
        .header("Authorization", bearer(&token))
        .body_json(&json!({"name": "Meera", "email": "meera@shop.in"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "mobile cannot be empty");

    let resp = cli
        .post("/api/v1/orders/create-order")
        .header("Authorization", bearer(&token))
        .body_json(&json!({"items": [{"name": "Rice", "price": 10.0}]}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "consumer is required");

    let resp = cli
        .post("/api/v1/orders/create-order")
        .header("Authorization", bearer(&token))
        .body_json(&json!({"consumer": "c1", "items": [{"price": 10.0}]}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "Item name is required.");
}

#[tokio::test]
async fn test_malformed_body_renders_json_error() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli
        .post("/api/v1/auth/login")
        .content_type("application/json")
        .body("{not json")
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["message"].is_string());
    assert_eq!(body["statusCode"], 400);
}

#[tokio::test]
async fn test_streamed_body_over_limit_rejected() {
    let sandbox = Sandbox::new();
    let cli = client(Config {
        max_body_bytes: 16,
        ..sandbox.config()
    });

    let payload = json!({
        "name": "Shopkeeper",
        "email": "owner@shop.in",
        "password": "secret123",
    })
    .to_string();
    let resp = cli
        .post("/api/v1/auth/register")
        .content_type("application/json")
        .body(Body::from_async_read(std::io::Cursor::new(payload.into_bytes())))
        .send()
        .await;
    resp.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(resp).await["message"], "Request body too large");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/consumer/get-all").send().await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["message"], "Please Login First");

    let resp = cli
        .get("/api/v1/orders/get-orders")
        .header("Authorization", "Bearer not-a-session")
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_consumer_lifecycle() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());
    let token = register(&cli, "owner@shop.in").await;

    create_consumer(&cli, &token, "Meera", "meera@shop.in").await;
    create_consumer(&cli, &token, "Ravi", "ravi@shop.in").await;
    create_consumer(&cli, &token, "Arjun", "arjun@shop.in").await;

    let resp = cli
        .post("/api/v1/consumer/register")
        .header("Authorization", bearer(&token))
        .body_json(&json!({"name": "Meera", "email": "meera@shop.in", "mobile": "1"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(resp).await["message"],
        "Consumer Already in Your Record"
    );

    // Page size is 2 in the sandbox config.
    let resp = cli
        .get("/api/v1/consumer/get-all")
        .query("page", &1)
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["hasMore"], true);

    let resp = cli
        .get("/api/v1/consumer/get-all")
        .query("query", &"ravi")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    let body = json_body(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let id = body["data"][0]["_id"].as_str().unwrap().to_string();

    let resp = cli
        .patch(format!("/api/v1/consumer/update/{}", id))
        .header("Authorization", bearer(&token))
        .body_json(&json!({"address": "Mumbai"}))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(json_body(resp).await["msg"], "Consumer Updated :)");

    let resp = cli
        .get(format!("/api/v1/consumer/get/{}", id))
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(json_body(resp).await["address"], "Mumbai");

    let resp = cli
        .get("/api/v1/consumer/get-search")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    assert_eq!(json_body(resp).await["users"].as_array().unwrap().len(), 3);

    let resp = cli
        .delete(format!("/api/v1/consumer/delete/{}", id))
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(json_body(resp).await["msg"], "Consumer Deleted :)");

    let resp = cli
        .get(format!("/api/v1/consumer/get/{}", id))
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["message"], "Consumer Not Found");
}

#[tokio::test]
async fn test_consumers_are_scoped_to_owner() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());
    let owner = register(&cli, "owner@shop.in").await;
    let other = register(&cli, "other@shop.in").await;

    create_consumer(&cli, &owner, "Meera", "meera@shop.in").await;
    let id = first_consumer_id(&cli, &owner).await;

    let resp = cli
        .get(format!("/api/v1/consumer/get/{}", id))
        .header("Authorization", bearer(&other))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    let resp = cli
        .get("/api/v1/consumer/get-all")
        .header("Authorization", bearer(&other))
        .send()
        .await;
    assert!(json_body(resp).await["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_order_lifecycle_and_dashboard() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());
    let token = register(&cli, "owner@shop.in").await;
    create_consumer(&cli, &token, "Meera", "meera@shop.in").await;
    let consumer_id = first_consumer_id(&cli, &token).await;

    let resp = cli
        .post("/api/v1/orders/create-order")
        .header("Authorization", bearer(&token))
        .body_json(&json!({
            "consumer": consumer_id,
            "items": [
                {"name": "Rice", "price": 320.0, "quantity": 2},
                {"name": "Dal", "price": 90.0}
            ]
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    assert_eq!(json_body(resp).await["msg"], "Order Created Successfully");

    let resp = cli
        .post("/api/v1/orders/create-order")
        .header("Authorization", bearer(&token))
        .body_json(&json!({"consumer": consumer_id, "items": []}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(resp).await["message"],
        "At least one item is required for the order."
    );

    let resp = cli
        .get("/api/v1/orders/get-orders")
        .query("query", &"meera")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    assert_eq!(body["hasMore"], false);
    let order = &body["data"][0];
    assert_eq!(order["consumer"]["name"], "Meera");
    assert_eq!(order["total"], 730.0);
    let order_id = order["_id"].as_str().unwrap().to_string();

    let resp = cli
        .get(format!("/api/v1/orders/get-invoice/{}", order_id))
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let invoice = json_body(resp).await;
    assert_eq!(invoice["consumer"]["address"], "Pune");
    assert_eq!(invoice["items"].as_array().unwrap().len(), 2);

    let resp = cli
        .get("/api/v1/consumer/dashboard")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    let stats = json_body(resp).await;
    assert_eq!(stats["consumers"], 1);
    assert_eq!(stats["orders"], 1);
    assert_eq!(stats["quantity"], 3);

    let resp = cli
        .patch(format!("/api/v1/orders/update/{}", order_id))
        .header("Authorization", bearer(&token))
        .body_json(&json!({"isActive": false}))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(json_body(resp).await["msg"], "Order Updated Successfully");

    let resp = cli
        .get("/api/v1/orders/get-orders")
        .header("Authorization", bearer(&token))
        .send()
        .await;
    assert!(json_body(resp).await["data"].as_array().unwrap().is_empty());

    let resp = cli
        .delete(format!("/api/v1/orders/delete/{}", order_id))
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(json_body(resp).await["msg"], "Order Deleted Successfully");

    let resp = cli
        .delete(format!("/api/v1/orders/delete/{}", order_id))
        .header("Authorization", bearer(&token))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["message"], "Order Not Found");
}

#[tokio::test]
async fn test_ml_ping() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/ml/ping").send().await;
    resp.assert_status_is_ok();
    resp.assert_text("ML Route is working").await;
}

fn multipart_body(boundary: &str, fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, contents) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}.csv\"\r\nContent-Type: text/csv\r\n\r\n{}\r\n",
            boundary, name, name, contents
        ));
    }
    body.push_str(&format!("--{}--\r\n", boundary));
    body
}

#[tokio::test]
async fn test_analyze_missing_upload() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());
    let boundary = "stockwise-boundary";

    let resp = cli
        .post("/api/v1/ml/analyze")
        .content_type(format!("multipart/form-data; boundary={}", boundary))
        .body(multipart_body(boundary, &[("sales", "date,qty\n2024-03-01,4\n")]))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "Missing uploaded files.");
}

#[tokio::test]
async fn test_analyze_non_multipart_body() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli
        .post("/api/v1/ml/analyze")
        .body_json(&json!({"sales": "date,qty"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "Missing uploaded files.");
}

#[cfg(unix)]
#[tokio::test]
async fn test_analyze_runs_script() {
    let sandbox = Sandbox::new();
    let config = sandbox.config();
    std::fs::write(
        &config.forecast_script,
        "echo \"{\\\"rows\\\": $(wc -l < \"$1\")}\"\n",
    )
    .unwrap();
    let cli = client(config);
    let boundary = "stockwise-boundary";

    let resp = cli
        .post("/api/v1/ml/analyze")
        .content_type(format!("multipart/form-data; boundary={}", boundary))
        .body(multipart_body(
            boundary,
            &[("sales", "date,qty\n2024-03-01,4"), ("inventory", "sku,stock\nP1,3")],
        ))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(json_body(resp).await["rows"], 1);

    // Staged uploads are removed once the run finishes.
    let staged = std::fs::read_dir(sandbox.dir.join("uploads")).unwrap().count();
    assert_eq!(staged, 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_analyze_script_failure() {
    let sandbox = Sandbox::new();
    let config = sandbox.config();
    std::fs::write(&config.forecast_script, "echo 'model exploded' >&2\nexit 3\n").unwrap();
    let cli = client(config);
    let boundary = "stockwise-boundary";

    let resp = cli
        .post("/api/v1/ml/analyze")
        .content_type(format!("multipart/form-data; boundary={}", boundary))
        .body(multipart_body(boundary, &[("sales", "a\n1"), ("inventory", "b\n2")]))
        .send()
        .await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "Python script failed");
    assert!(body["details"].as_str().unwrap().contains("model exploded"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_analyze_output_not_json() {
    let sandbox = Sandbox::new();
    let config = sandbox.config();
    std::fs::write(&config.forecast_script, "echo 'Warning: skipping Rice@Pune'\n").unwrap();
    let cli = client(config);
    let boundary = "stockwise-boundary";

    let resp = cli
        .post("/api/v1/ml/analyze")
        .content_type(format!("multipart/form-data; boundary={}", boundary))
        .body(multipart_body(boundary, &[("sales", "a\n1"), ("inventory", "b\n2")]))
        .send()
        .await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "Output parse error");
    assert!(body["raw"].as_str().unwrap().contains("skipping Rice@Pune"));
    assert!(body.get("details").is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_analyze_timeout() {
    let sandbox = Sandbox::new();
    let config = Config {
        analysis_timeout: Duration::from_millis(200),
        ..sandbox.config()
    };
    std::fs::write(&config.forecast_script, "sleep 5\necho '{}'\n").unwrap();
    let cli = client(config);
    let boundary = "stockwise-boundary";

    let resp = cli
        .post("/api/v1/ml/analyze")
        .content_type(format!("multipart/form-data; boundary={}", boundary))
        .body(multipart_body(boundary, &[("sales", "a\n1"), ("inventory", "b\n2")]))
        .send()
        .await;
    resp.assert_status(StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        json_body(resp).await,
        json!({"error": "Python script timed out"})
    );
}

#[tokio::test]
async fn test_spikes_malformed_file() {
    let sandbox = Sandbox::new();
    sandbox.write_output(
        "detected_spikes.csv",
        b"timestamp,product_name\n2024-03-01 10:00:00,\xff\xfeRice\n".as_slice(),
    );
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/ml/spikes").send().await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Failed to parse CSV");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_spikes_missing_file() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/ml/spikes").send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["message"], "Spike file not found");
}

const SPIKES: &str = "timestamp,product_id,product_name,location,z_score,quantity,surge_percent\n\
    2024-03-02 10:00:00,P1,Rice,Pune,2.41,38,212.5\n\
    2024-03-01 10:00:00,P2,Oil,Mumbai,1.9,12,90\n";

#[tokio::test]
async fn test_spikes_and_series() {
    let sandbox = Sandbox::new();
    sandbox.write_output("detected_spikes.csv", SPIKES);
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/ml/spikes").send().await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    assert_eq!(body["spikes"].as_array().unwrap().len(), 2);
    assert_eq!(body["spikes"][0]["surge_percent"], "212.5");

    let resp = cli
        .get("/api/v1/ml/spike-series")
        .query("product", &"Rice")
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    assert_eq!(body["products"], json!(["Oil", "Rice"]));
    assert_eq!(body["selected"], "Rice");
    assert_eq!(body["points"][0]["quantity"], 38);
}

#[tokio::test]
async fn test_alert_feed() {
    let sandbox = Sandbox::new();
    sandbox.write_output("detected_spikes.csv", SPIKES);
    sandbox.write_output(
        "forecasted_sales.csv",
        "timestamp,forecasted_quantity,product_id,product_name,location\n\
         2024-03-03 00:00:00,14.37,P1,Rice,Pune\n",
    );
    sandbox.write_output(
        "inventory_suggestions.csv",
        "product_id,product_name,location,timestamp,predicted_demand,suggested_stock,order_recommendation\n\
         P1,Rice,Pune,2024-03-03 00:00:00,14.37,18,ORDER\n\
         P2,Oil,Mumbai,2024-03-03 00:00:00,2.1,3,HOLD\n",
    );
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/ml/alerts").send().await;
    resp.assert_status_is_ok();
    let body = json_body(resp).await;
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0]["type"], "danger");
    assert_eq!(alerts[1]["message"], "Rice spiked 212.5% at Pune");
    assert_eq!(alerts[2]["message"], "Forecast: Rice demand ≈ 14.37");

    let resp = cli
        .get("/api/v1/ml/alerts")
        .query("type", &"warning")
        .query("dismissed", &"suggestion-0")
        .send()
        .await;
    let body = json_body(resp).await;
    assert_eq!(body["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(body["alerts"][0]["id"], "spike-0");
}

#[tokio::test]
async fn test_alerts_missing_outputs() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/ml/alerts").send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert!(json_body(resp).await["message"].is_string());
}

#[tokio::test]
async fn test_static_outputs_served() {
    let sandbox = Sandbox::new();
    sandbox.write_output("detected_spikes.csv", SPIKES);
    let cli = client(sandbox.config());

    let resp = cli.get("/ml-outputs/detected_spikes.csv").send().await;
    resp.assert_status_is_ok();
    resp.assert_text(SPIKES).await;
}

#[tokio::test]
async fn test_health_degraded_without_script() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli.get("/api/v1/health").send().await;
    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["output_dir_present"], true);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let sandbox = Sandbox::new();
    let cli = client(sandbox.config());

    let resp = cli.get("/no/such/page").send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "page not found");
    assert_eq!(body["statusCode"], 404);
}
