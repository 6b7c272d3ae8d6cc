//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::{IpAddr, SocketAddr};

use futures_util::future::{BoxFuture, FutureExt};
use ipd::config::IpdConfig;
use ipd::http::{HttpServer, Server};
use ipd::lookup::{Country, GeoDatabase, LookupError, PortProbe, ReverseResolver};
use ipd::Shutdown;
use tokio::net::TcpListener;

/// Geolocation stub answering the same place for every address.
pub struct StaticGeo;

impl GeoDatabase for StaticGeo {
    fn country(&self, _ip: IpAddr) -> Result<Country, LookupError> {
        Ok(Country {
            name: Some("Elbonia".into()),
            iso: Some("EB".into()),
        })
    }

    fn city(&self, _ip: IpAddr) -> Result<Option<String>, LookupError> {
        Ok(Some("Bornyasherk".into()))
    }
}

/// Reverse resolver stub.
pub struct StaticResolver(pub &'static str);

impl ReverseResolver for StaticResolver {
    fn lookup_addr(&self, _ip: IpAddr) -> BoxFuture<'_, Result<String, LookupError>> {
        let hostname = self.0.to_string();
        async move { Ok(hostname) }.boxed()
    }
}

/// Port probe stub reporting only the listed ports as open.
pub struct OpenPorts(pub Vec<u16>);

impl PortProbe for OpenPorts {
    fn probe(&self, ip: IpAddr, port: u16) -> BoxFuture<'_, Result<(), LookupError>> {
        let open = self.0.contains(&port);
        async move {
            if open {
                Ok(())
            } else {
                Err(LookupError::NotFound(ip))
            }
        }
        .boxed()
    }
}

/// A server with every optional collaborator stubbed out.
pub fn full_server() -> Server {
    Server::new()
        .with_geo(std::sync::Arc::new(StaticGeo))
        .with_resolver(std::sync::Arc::new(StaticResolver("localhost")))
        .with_port_probe(std::sync::Arc::new(OpenPorts(vec![80, 443])))
}

/// A running server. Stops when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start `server` on an ephemeral loopback port.
pub async fn start_server(server: Server) -> TestServer {
    let config = IpdConfig::default();
    let http = HttpServer::new(&config, server);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = http.run(listener, rx).await;
    });

    TestServer { addr, shutdown }
}

/// Client that never goes through a proxy and does not pool connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
