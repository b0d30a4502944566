use httpmock::prelude::*;
use order_service::clients::{CustomerClient, CustomerError, HttpCustomerClient};
use order_service::model::Customer;
use resilience::mock::MockServiceRegistry;
use resilience::{DiscoveryError, SelectionPolicy, ServiceInstance};
use serde_json::json;
use std::sync::Arc;

const CUSTOMER_SERVICE: &str = "customerservice";

fn instance_of(server: &MockServer) -> ServiceInstance {
    ServiceInstance::new("127.0.0.1", server.port())
}

fn client(registry: &MockServiceRegistry) -> HttpCustomerClient {
    HttpCustomerClient::new(Arc::new(registry.clone()), reqwest::Client::new())
}

#[tokio::test]
async fn test_returns_customer_from_customer_service() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/customers/26");
            then.status(200).json_body(json!({
                "customerId": "26",
                "customerName": "Jane",
                "customerAddress": "New York"
            }));
        })
        .await;

    let registry = MockServiceRegistry::new();
    registry
        .expect_resolve(CUSTOMER_SERVICE)
        .return_instances(vec![instance_of(&server)]);

    let customer = client(&registry).get_customer("26").await.unwrap();

    mock.assert_async().await;
    assert_eq!(customer, Customer::new("26", "Jane", "New York"));
    assert_eq!(customer.customer_name, "Jane");
    assert_eq!(customer.customer_address, "New York");
    registry.verify();
}

#[tokio::test]
async fn test_empty_registry_is_no_instance_available() {
    let registry = MockServiceRegistry::new();
    registry.expect_resolve(CUSTOMER_SERVICE).return_instances(vec![]);

    assert_eq!(
        client(&registry).get_customer("26").await,
        Err(CustomerError::NoInstanceAvailable(CUSTOMER_SERVICE.to_string()))
    );
}

#[tokio::test]
async fn test_registry_failure_is_discovery_error() {
    let registry = MockServiceRegistry::new();
    registry
        .expect_resolve(CUSTOMER_SERVICE)
        .return_err(DiscoveryError::Unavailable("agent down".to_string()));

    assert_eq!(
        client(&registry).get_customer("26").await,
        Err(CustomerError::Discovery(DiscoveryError::Unavailable(
            "agent down".to_string()
        )))
    );
}

#[tokio::test]
async fn test_non_success_status_is_remote_call_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/customers/26");
            then.status(404);
        })
        .await;

    let registry = MockServiceRegistry::new();
    registry
        .expect_resolve(CUSTOMER_SERVICE)
        .return_instances(vec![instance_of(&server)]);

    assert!(matches!(
        client(&registry).get_customer("26").await,
        Err(CustomerError::RemoteCallFailed(_))
    ));
}

#[tokio::test]
async fn test_malformed_body_is_remote_call_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/customers/26");
            then.status(200).body("{\"customerName\": 42");
        })
        .await;

    let registry = MockServiceRegistry::new();
    registry
        .expect_resolve(CUSTOMER_SERVICE)
        .return_instances(vec![instance_of(&server)]);

    assert!(matches!(
        client(&registry).get_customer("26").await,
        Err(CustomerError::RemoteCallFailed(_))
    ));
}

#[tokio::test]
async fn test_unreachable_instance_is_remote_call_failure() {
    // Bind then release a port so nothing is listening on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let registry = MockServiceRegistry::new();
    registry
        .expect_resolve(CUSTOMER_SERVICE)
        .return_instances(vec![ServiceInstance::new("127.0.0.1", port)]);

    assert!(matches!(
        client(&registry).get_customer("26").await,
        Err(CustomerError::RemoteCallFailed(_))
    ));
}

#[tokio::test]
async fn test_instances_are_resolved_on_every_call() {
    let first = MockServer::start_async().await;
    let second = MockServer::start_async().await;
    for server in [&first, &second] {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/customers/26");
                then.status(200)
                    .json_body(json!({ "customerId": "26", "customerName": "Jane", "customerAddress": "New York" }));
            })
            .await;
    }

    // The topology changes between calls; the client follows it.
    let registry = MockServiceRegistry::new();
    registry
        .expect_resolve(CUSTOMER_SERVICE)
        .return_instances(vec![instance_of(&first)]);
    registry
        .expect_resolve(CUSTOMER_SERVICE)
        .return_instances(vec![instance_of(&second)]);

    let client = client(&registry);
    client.get_customer("26").await.unwrap();
    client.get_customer("26").await.unwrap();

    registry.verify();
    assert_eq!(registry.calls(), vec![CUSTOMER_SERVICE, CUSTOMER_SERVICE]);
}

#[tokio::test]
async fn test_round_robin_spreads_calls_across_instances() {
    let first = MockServer::start_async().await;
    let second = MockServer::start_async().await;
    let mut mocks = Vec::new();
    for server in [&first, &second] {
        mocks.push(
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/v1/customers/26");
                    then.status(200).json_body(json!({ "customerId": "26" }));
                })
                .await,
        );
    }

    let registry = MockServiceRegistry::new();
    for _ in 0..4 {
        registry
            .expect_resolve(CUSTOMER_SERVICE)
            .return_instances(vec![instance_of(&first), instance_of(&second)]);
    }

    let client = client(&registry).with_selection(SelectionPolicy::RoundRobin);
    for _ in 0..4 {
        client.get_customer("26").await.unwrap();
    }

    for mock in mocks {
        mock.assert_calls_async(2).await;
    }
}

#[tokio::test]
async fn test_resolves_configured_service_name() {
    let registry = MockServiceRegistry::new();
    registry.expect_resolve("customers-v2").return_instances(vec![]);

    let client = client(&registry).with_service_name("customers-v2");
    assert_eq!(
        client.get_customer("26").await,
        Err(CustomerError::NoInstanceAvailable("customers-v2".to_string()))
    );
    registry.verify();
}
