use rama::http::{BodyExtractExt as _, StatusCode, service::client::HttpClientExt as _};

use super::runtime;

#[tokio::test]
#[tracing_test::traced_test]
async fn test_loggen_writes_requested_volume_to_out_file() {
    let runtime = runtime::spawn_with_args(&[]).await;
    let client = runtime.client();

    let resp = client
        .get(runtime.url("/api/loggen?per_second=200&message_size=64&burst_dur=500ms"))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, resp.status());

    let report: serde_json::Value = resp.try_into_json().await.unwrap();
    let emitted = report["emitted_count"].as_u64().unwrap();
    assert!((90..=101).contains(&emitted), "emitted: {emitted}");

    let content = std::fs::read_to_string(runtime.data_dir().join("out.log")).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(emitted as usize, lines.len());
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(64, value["msg"].as_str().unwrap().len());
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_sequential_loggen_requests_append() {
    let runtime = runtime::spawn_with_args(&["--message-kind", "sentence"]).await;
    let client = runtime.client();

    for _ in 0..2 {
        let resp = client
            .get(runtime.url("/api/loggen?per_second=1&message_size=128&burst_dur=1"))
            .send()
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, resp.status());
    }

    let content = std::fs::read_to_string(runtime.data_dir().join("out.log")).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(2, lines.len());
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(1, value["seq"]);
        assert!(value["msg"].as_str().unwrap().ends_with('.'));
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn test_probes_and_server_header() {
    let runtime = runtime::spawn_with_args(&["--unready"]).await;
    let client = runtime.client();

    let resp = client.get(runtime.url("/healthz")).send().await.unwrap();
    assert_eq!(StatusCode::OK, resp.status());
    let server = resp.headers().get("server").unwrap().to_str().unwrap();
    assert!(server.starts_with("logwild/"), "server: {server}");

    let resp = client.get(runtime.url("/readyz")).send().await.unwrap();
    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, resp.status());

    let resp = client
        .post(runtime.url("/readyz/enable"))
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::ACCEPTED, resp.status());

    let resp = client.get(runtime.url("/readyz")).send().await.unwrap();
    assert_eq!(StatusCode::OK, resp.status());
}
