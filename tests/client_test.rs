mod common;

use common::{closed_base_url, init_logger, StubServer};
use obm_client::{
    ClientConfig, DatasetRef, HttpTransport, ProjectRef, RequestContext, TrainOptions,
    TrainingBackendClient, DEFAULT_EPOCHS,
};
use serde_json::{json, Value};

// Proxy settings from the environment must not intercept loopback traffic.
fn client(enabled: bool, base_url: &str) -> TrainingBackendClient {
    let transport = HttpTransport::from_builder(reqwest::Client::builder().no_proxy()).unwrap();
    TrainingBackendClient::with_transport(ClientConfig::new(enabled, "v1", base_url), transport).unwrap()
}

fn ctx() -> RequestContext {
    RequestContext::new("ws1", "p1")
}

fn model_list() -> Value {
    json!([
        {
            "model": "YOLOv5n",
            "size": 640,
            "map_val": { "val_50": 28, "val_50_59": 45.7 },
            "speed": { "cpu_b1": 45, "v100_b1": 6.3, "v100_b32": 1.9 },
            "params_m": "1.9",
            "flops_b": 4.5
        }
    ])
}

#[tokio::test]
async fn test_list_models_end_to_end() {
    init_logger();
    let body = json!({ "code": 200, "status": "success", "data": model_list() });
    let server = StubServer::start(vec![("/v1/archs/ws1/p1", 200, body.to_string())]).await;
    let client = client(true, &server.base_url());

    assert_eq!(client.list_models(&ctx()).await, Some(model_list()));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/v1/archs/ws1/p1");
    assert_eq!(requests[0].headers.get("accept").map(String::as_str), Some("*/*"));
}

#[tokio::test]
async fn test_list_models_not_found() {
    init_logger();
    let server = StubServer::start(vec![]).await;
    let client = client(true, &server.base_url());

    assert_eq!(client.list_models(&ctx()).await, None);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_list_models_disabled_skips_network() {
    init_logger();
    let body = json!({ "code": 200, "status": "success", "data": model_list() });
    let server = StubServer::start(vec![("/v1/archs/ws1/p1", 200, body.to_string())]).await;
    let client = client(false, &server.base_url());

    assert_eq!(client.list_models(&ctx()).await, None);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_list_models_invalid_envelope() {
    init_logger();
    let body = json!({ "code": 200, "status": "pending", "data": model_list() });
    let server = StubServer::start(vec![("/v1/archs/ws1/p1", 200, body.to_string())]).await;
    let client = client(true, &server.base_url());

    assert_eq!(client.list_models(&ctx()).await, None);
}

#[tokio::test]
async fn test_list_models_connection_refused() {
    init_logger();
    let client = client(true, &closed_base_url().await);
    assert_eq!(client.list_models(&ctx()).await, None);
}

#[tokio::test]
async fn test_train_details_end_to_end() {
    init_logger();
    let data = json!([
        {
            "step": 0,
            "train": { "box_loss": 0.1305, "obj_loss": 0.0314, "cls_loss": 0.0 },
            "metrics": { "precision": 0.0, "recall": 0.0, "map_0_5": 0.0, "map_0_5_0_95": 0.0 },
            "val": { "box_loss": 0.0906, "obj_loss": 0.0283, "cls_loss": 0.0 },
            "x": { "lr0": 0.1, "lr1": 0.0, "lr2": 0.0 }
        }
    ]);
    let body = json!({ "code": 200, "status": "success", "data": data });
    let server = StubServer::start(vec![("/v1/track/ws1/p1/ver_234_345", 200, body.to_string())]).await;
    let client = client(true, &server.base_url());

    assert_eq!(client.train_details(&ctx(), "ver_234_345").await, Some(data));
    assert_eq!(client.train_details(&ctx(), "ver_unknown").await, None);

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/v1/track/ws1/p1/ver_234_345", "/v1/track/ws1/p1/ver_unknown"]);
}

#[tokio::test]
async fn test_train_end_to_end() {
    init_logger();
    let server = StubServer::start(vec![("/v1/fit", 200, r#"{"task_id":"t-1"}"#.to_string())]).await;
    let client = client(true, &server.base_url());

    let result = client
        .train(
            "workspace-slug",
            &ProjectRef::new("12", "project-slug"),
            "ver_234",
            "YOLOv5n",
            &DatasetRef::new(234, "ver_234_345"),
            Some(&TrainOptions::default().with_epochs(20).with_pre_trained(true)),
        )
        .await;
    assert_eq!(result, Some(json!({ "task_id": "t-1" })));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/v1/fit");
    assert_eq!(
        requests[0].headers.get("content-type").map(String::as_str),
        Some("application/json")
    );

    let sent: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        sent,
        json!({
            "workspace": {
                "id": "workspace-slug",
                "project_id": "project-slug",
                "model_name": "obj_master_vizo_234_train",
                "dataset": { "version_code": 234, "version_name": "ver_234_345" }
            },
            "architectures": { "name": "YOLOv5n" },
            "adv_model_conf": { "pre_trained": true, "epochs": 20 }
        })
    );
}

#[tokio::test]
async fn test_train_defaults_and_cap() {
    init_logger();
    let server = StubServer::start(vec![("/v1/fit", 200, "{}".to_string())]).await;
    let client = client(true, &server.base_url());
    let project = ProjectRef::new("12", "project-slug");
    let dataset = DatasetRef::new(1, "ver_1");

    client.train("ws", &project, "v", "YOLOv5n", &dataset, None).await;
    client
        .train("ws", &project, "v", "YOLOv5n", &dataset, Some(&TrainOptions::default().with_epochs(DEFAULT_EPOCHS * 3)))
        .await;

    for request in server.requests() {
        let sent: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(sent["adv_model_conf"]["epochs"], DEFAULT_EPOCHS);
        assert_eq!(sent["adv_model_conf"]["pre_trained"], false);
    }
}

#[tokio::test]
async fn test_train_rejected_returns_empty_object() {
    init_logger();
    let server = StubServer::start(vec![("/v1/fit", 400, r#"{"detail":"bad dataset"}"#.to_string())]).await;
    let client = client(true, &server.base_url());

    let result = client
        .train("ws", &ProjectRef::new("1", "p"), "v", "YOLOv5n", &DatasetRef::new(1, "n"), None)
        .await;
    assert_eq!(result, Some(json!({})));
}

#[tokio::test]
async fn test_train_connection_refused_returns_none() {
    init_logger();
    let client = client(true, &closed_base_url().await);

    let result = client
        .train("ws", &ProjectRef::new("1", "p"), "v", "YOLOv5n", &DatasetRef::new(1, "n"), None)
        .await;
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_base_url_with_prefix() {
    init_logger();
    let body = json!({ "code": "200", "status": "success", "data": [] });
    let server = StubServer::start(vec![("/obm/v1/archs/ws1/p1", 200, body.to_string())]).await;
    let client = client(true, &format!("{}/obm/", server.base_url()));

    assert_eq!(client.list_models(&ctx()).await, Some(json!([])));
}

#[tokio::test]
async fn test_list_models_typed_view() {
    init_logger();
    let body = json!({ "code": 200, "status": "success", "data": model_list() });
    let server = StubServer::start(vec![("/v1/archs/ws1/p1", 200, body.to_string())]).await;
    let client = client(true, &server.base_url());

    let data = client.list_models(&ctx()).await.unwrap();
    let models = obm_client::ModelArchitecture::list_from(&data).unwrap();
    assert_eq!(models[0].model, "YOLOv5n");
    assert_eq!(models[0].params_m, Some(1.9));
}
