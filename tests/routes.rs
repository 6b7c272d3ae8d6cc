//! End-to-end tests against a server on a real socket.

use ipd::http::Server;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_json_on_root_when_accepted() {
    let server = common::start_server(common::full_server()).await;

    let res = common::client()
        .get(server.url("/"))
        .header(ACCEPT, "application/json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "ip": "127.0.0.1",
            "ip_decimal": 2130706433u32,
            "country": "Elbonia",
            "country_iso": "EB",
            "city": "Bornyasherk",
            "hostname": "localhost",
        })
    );
}

#[tokio::test]
async fn test_json_path_omits_unknown_fields() {
    let server = common::start_server(Server::new()).await;

    let body: Value = common::client()
        .get(server.url("/json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"ip": "127.0.0.1", "ip_decimal": 2130706433u32}));
}

#[tokio::test]
async fn test_cli_clients_get_plain_text() {
    let server = common::start_server(common::full_server()).await;
    let client = common::client();

    for ua in ["curl/7.26.0", "Wget/1.13.4 (linux-gnu)", "fetch libfetch/2.0", "HTTPie/0.9.3", "Go 1.1 package http"] {
        let res = client.get(server.url("/")).header(USER_AGENT, ua).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{ua}");
        assert_eq!(res.text().await.unwrap(), "127.0.0.1\n", "{ua}");
    }

    let res = client
        .get(server.url("/"))
        .header(ACCEPT, "text/plain")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "127.0.0.1\n");

    let res = client.get(server.url("/ip")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "127.0.0.1\n");
}

#[tokio::test]
async fn test_geo_fields_as_text() {
    let server = common::start_server(common::full_server()).await;
    let client = common::client();

    for (path, expected) in [
        ("/country", "Elbonia\n"),
        ("/country-iso", "EB\n"),
        ("/city", "Bornyasherk\n"),
    ] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(res.text().await.unwrap(), expected, "{path}");
    }
}

#[tokio::test]
async fn test_browsers_get_html() {
    let server = common::start_server(common::full_server()).await;

    let res = common::client()
        .get(server.url("/"))
        .header(USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    let body = res.text().await.unwrap();
    assert!(body.contains("127.0.0.1"));
    assert!(body.contains("2130706433"));
    assert!(body.contains("Elbonia"));
    assert!(body.contains(&server.addr.to_string()));
    assert!(body.contains("/port/8080"));
}

#[tokio::test]
async fn test_port_reachability() {
    let server = common::start_server(common::full_server()).await;
    let client = common::client();

    let res = client.get(server.url("/port/80")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(res.text().await.unwrap(), r#"{"ip":"127.0.0.1","port":80,"reachable":true}"#);

    let body: Value = client
        .get(server.url("/port/8080"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"ip": "127.0.0.1", "port": 8080, "reachable": false}));
}

#[tokio::test]
async fn test_invalid_ports_are_rejected() {
    let server = common::start_server(common::full_server()).await;
    let client = common::client();

    for literal in ["0", "65536", "70000", "abc"] {
        let res = client.get(server.url(&format!("/port/{literal}"))).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{literal}");
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({"error": format!("Invalid port: {literal}")}));
    }

    let res = client.get(server.url("/port/65535")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_not_found_negotiation() {
    let server = common::start_server(common::full_server()).await;
    let client = common::client();

    let res = client.get(server.url("/missing")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "404 page not found");

    let res = client
        .get(server.url("/missing"))
        .header(ACCEPT, "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "404 page not found"}));

    let res = client.post(server.url("/json")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_optional_routes_absent_without_collaborators() {
    let server = common::start_server(Server::new()).await;
    let client = common::client();

    for path in ["/country", "/country-iso", "/city", "/port/80"] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let server = common::start_server(common::full_server()).await;
    let client = common::client();

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let res = client
            .get(server.url("/"))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .unwrap();
        bodies.push(res.bytes().await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = common::start_server(Server::new()).await;
    let client = common::client();

    let res = client.get(server.url("/ip")).send().await.unwrap();
    let id = res.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());

    let res = client
        .get(server.url("/ip"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");
}
