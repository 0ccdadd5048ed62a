use std::sync::Arc;

use tempfile::TempDir;

use graphloom::registry::SchemaStore;
use graphloom::server::{AppState, create_router};
use graphloom::store::SqliteKv;

pub struct TestServer {
    // Held so the database directory outlives the server task.
    _temp_dir: TempDir,
    pub base_url: String,
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");

        let kv = SqliteKv::new(temp_dir.path().join("graphloom.db")).expect("open store");
        kv.initialize().expect("initialize store");

        let state = Arc::new(AppState::new(SchemaStore::new(Arc::new(kv))));
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            _temp_dir: temp_dir,
            base_url: format!("http://{addr}"),
        }
    }
}
