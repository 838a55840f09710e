use rpc::search::v1::DocCountRequest;
use search_rpc_client::{
    AnonymousResolver, CertMaterial, ConnectionRegistry, Credentials, IdentityResolver, PoolConfig,
    PoolKey, StaticIdentityResolver,
};
use std::convert::Infallible;
use std::future::{Ready, ready};
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::body::Body;
use tonic::server::NamedService;
use tonic::transport::Server;

/// Search service stand-in that records the `authorization` header of every
/// request and answers `UNIMPLEMENTED`.
#[derive(Clone, Default)]
struct RecordingSearchService {
    seen: Arc<parking_lot::Mutex<Vec<Option<String>>>>,
}

impl NamedService for RecordingSearchService {
    const NAME: &'static str = "search.v1.SearchService";
}

impl tower::Service<http::Request<Body>> for RecordingSearchService {
    type Response = http::Response<Body>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Body>) -> Self::Future {
        let authorization = req
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.seen.lock().push(authorization);

        let mut response = http::Response::new(Body::empty());
        let headers = response.headers_mut();
        headers.insert("content-type", http::HeaderValue::from_static("application/grpc"));
        headers.insert("grpc-status", http::HeaderValue::from_static("12"));
        headers.insert("grpc-message", http::HeaderValue::from_static("recorded"));
        ready(Ok(response))
    }
}

async fn spawn_search_node() -> (SocketAddr, RecordingSearchService) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = RecordingSearchService::default();

    let server = Server::builder()
        .add_service(service.clone())
        .serve_with_incoming(TcpListenerStream::new(listener));
    tokio::spawn(server);

    (addr, service)
}

fn registry(resolver: Arc<dyn IdentityResolver>) -> ConnectionRegistry {
    ConnectionRegistry::new(PoolConfig::default().with_pool_size(2), resolver)
}

#[tokio::test]
async fn test_calls_carry_basic_authorization() {
    let (addr, service) = spawn_search_node().await;
    let resolver = StaticIdentityResolver::new().with_fallback(Credentials::new("user", "pass"));
    let registry = registry(Arc::new(resolver));

    let mut client = registry
        .get_client("node-A", &addr.to_string(), &CertMaterial::None)
        .await
        .unwrap();
    let status = client
        .doc_count(DocCountRequest {
            index_name: "products".into(),
            index_uuid: "b7f3".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::Unimplemented);
    assert_eq!(
        service.seen.lock().as_slice(),
        &[Some("Basic dXNlcjpwYXNz".to_string())]
    );
}

#[tokio::test]
async fn test_anonymous_calls_have_no_authorization() {
    let (addr, service) = spawn_search_node().await;
    let registry = registry(Arc::new(AnonymousResolver));

    let mut client = registry
        .get_client("node-A", &addr.to_string(), &CertMaterial::None)
        .await
        .unwrap();
    let _ = client.doc_count(DocCountRequest::default()).await;

    assert_eq!(service.seen.lock().as_slice(), &[None]);
}

#[tokio::test]
async fn test_eager_pool_dials_live_node_once() {
    let (addr, service) = spawn_search_node().await;
    let registry = registry(Arc::new(AnonymousResolver));
    let host_port = addr.to_string();

    for _ in 0..4 {
        let mut client = registry
            .get_client("node-A", &host_port, &CertMaterial::None)
            .await
            .unwrap();
        let _ = client.doc_count(DocCountRequest::default()).await;
    }

    let key = PoolKey::new("node-A", host_port).unwrap();
    assert_eq!(registry.pool(&key).unwrap().len(), 2);
    assert_eq!(registry.len(), 1);
    assert_eq!(service.seen.lock().len(), 4);
}

#[tokio::test]
async fn test_zero_stream_limit_still_connects() {
    let (addr, _service) = spawn_search_node().await;
    let mut config = PoolConfig::default().with_pool_size(1);
    config.transport.max_concurrent_streams = 0;
    let registry = ConnectionRegistry::new(config, Arc::new(AnonymousResolver));

    let client = tokio::time::timeout(
        Duration::from_secs(10),
        registry.get_client("node-A", &addr.to_string(), &CertMaterial::None),
    )
    .await
    .expect("pool creation stalled");
    assert!(client.is_ok());
}
