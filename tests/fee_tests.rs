//! Integration tests for the node RPC fee path using mockito.

use bchtip::{BitcoindRpc, Config, FeeEstimator, MemoryCache, NodeRpc, UpstreamError};
use mockito::Server;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

#[test]
fn test_estimatefee_rpc_call() {
    let mut server = Server::new();

    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result": 0.00001, "error": null, "id": "bchtip"}"#)
        .create();

    let rpc = BitcoindRpc::with_url(server.url());
    let fee = rpc.estimate_fee().unwrap();

    mock.assert();
    assert_eq!(fee.to_f64().unwrap(), 0.00001);
}

#[test]
fn test_rpc_error_envelope_is_a_failure() {
    let mut server = Server::new();

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"result": null, "error": {"code": -32601, "message": "Method not found"}, "id": "bchtip"}"#)
        .create();

    let rpc = BitcoindRpc::with_url(server.url());
    let result = rpc.estimate_fee();

    mock.assert();
    assert!(matches!(result, Err(UpstreamError::Malformed(_))));
}

#[test]
fn test_unreachable_node_propagates() {
    let rpc = BitcoindRpc::with_url("http://127.0.0.1:1");
    let result = rpc.estimate_fee();
    assert!(matches!(result, Err(UpstreamError::Unavailable(_))));
}

#[test]
fn test_estimator_caches_rpc_result() {
    let mut server = Server::new();

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"result": 0.00001, "error": null, "id": "bchtip"}"#)
        .expect(1)
        .create();

    let estimator = FeeEstimator::new(
        Arc::new(BitcoindRpc::with_url(server.url())),
        Arc::new(MemoryCache::new()),
        &Config::default(),
    );

    let first = estimator.estimate(false).unwrap();
    let second = estimator.estimate(false).unwrap();

    mock.assert();
    assert_eq!(first, second);
}

#[test]
fn test_estimator_force_hits_node_again() {
    let mut server = Server::new();

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"result": 0.00001, "error": null, "id": "bchtip"}"#)
        .expect(2)
        .create();

    let estimator = FeeEstimator::new(
        Arc::new(BitcoindRpc::with_url(server.url())),
        Arc::new(MemoryCache::new()),
        &Config::default(),
    );

    estimator.estimate(false).unwrap();
    estimator.estimate(true).unwrap();

    mock.assert();
}
