#![allow(dead_code)]

use registry_client::RegistryClient;
use registry_config::ClientConfig;

pub const DISCOVERY: &str = r#"{
    "swagger": "2.0",
    "host": "quay.io",
    "basePath": "/api/v1",
    "schemes": ["https"],
    "info": { "title": "Quay Frontend", "version": "v1" },
    "paths": {
        "/api/v1/repository": {
            "get": {
                "operationId": "listRepos",
                "summary": "List repositories",
                "tags": ["repository"],
                "parameters": [
                    { "name": "namespace", "in": "query", "type": "string" },
                    { "name": "public", "in": "query", "type": "boolean" }
                ]
            },
            "post": {
                "operationId": "createRepo",
                "tags": ["repository"]
            }
        },
        "/api/v1/repository/{repository}": {
            "parameters": [
                { "name": "repository", "in": "path", "required": true, "type": "string" }
            ],
            "get": {
                "operationId": "getRepo",
                "summary": "Get repository",
                "tags": ["repository"]
            }
        },
        "/api/v1/repository/{namespace}/{repository}/tag/": {
            "get": {
                "operationId": "listRepoTags",
                "tags": ["tag"],
                "parameters": [
                    { "name": "namespace", "in": "path", "required": true, "type": "string" },
                    { "name": "repository", "in": "path", "required": true, "type": "string" },
                    { "name": "limit", "in": "query", "type": "integer" }
                ]
            }
        },
        "/api/v1/health/instance": {
            "get": {
                "operationId": "instanceHealth",
                "tags": ["health"]
            }
        },
        "/api/v1/plans/": {
            "get": {
                "operationId": "listPlans",
                "tags": ["billing"]
            }
        },
        "/api/v1/user/": {
            "get": {
                "operationId": "getLoggedInUser",
                "summary": "Get user information for the authenticated user",
                "tags": ["user"]
            }
        }
    }
}"#;

pub fn config(url: &str) -> ClientConfig {
    ClientConfig::new(url).expect("mock server url is valid")
}

pub async fn discovered(server: &mut mockito::Server, config: ClientConfig) -> RegistryClient {
    server
        .mock("GET", "/api/v1/discovery")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DISCOVERY)
        .create_async()
        .await;
    let mut client = RegistryClient::new(config).expect("config is valid");
    client.discover().await.expect("discovery succeeds");
    client
}

/// Accepts connections and never answers them.
pub async fn silent_registry() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{address}")
}

/// Answers after `delay` with response headers, then stalls mid-body.
pub async fn stalling_registry(delay: std::time::Duration) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            tokio::time::sleep(delay).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 64\r\n\r\n{\"partial\":")
                .await;
            held.push(socket);
        }
    });
    format!("http://{address}")
}
