use candidate_intake::client::{read_candidates_file, CandidateUploader};
use candidate_intake::{build_router, AppState, MemoryStorage};
use std::io::Write;
use std::sync::Arc;

async fn spawn_server(storage: Arc<MemoryStorage>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(AppState::new(storage), &[]);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// CSV -> upload-csv client -> running server -> in-memory tables
#[tokio::test]
async fn test_csv_upload_round_trip() {
    let storage = Arc::new(MemoryStorage::new());
    let base_url = spawn_server(storage.clone()).await;

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(
        b"Name,Phone,Age,Address,Company,Position,Education\n\
          Ahmed Mohamed,01123456789,29,Cairo,Acme,Sales,BSc\n\
          Ahmed Again,01123456789,30,Cairo,Acme,Sales,BSc\n\
          Sara Ali,01234567890,27,Giza,Globex,Support,MSc\n",
    )
    .unwrap();

    let candidates = read_candidates_file(file.path()).unwrap();
    let uploader = CandidateUploader::new(&base_url).unwrap();

    let first = uploader.upload(&candidates, Some("round-trip")).await.unwrap();
    let second = uploader.upload(&candidates, Some("round-trip")).await.unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 0);

    let stored = storage.candidates().await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].get_str("name"), Some("Ahmed Mohamed"));
    assert_eq!(stored[1].get_str("uploadBatch"), Some("round-trip"));
}

#[tokio::test]
async fn test_client_surfaces_server_validation_error() {
    let storage = Arc::new(MemoryStorage::new());
    let base_url = spawn_server(storage).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/candidates/upload", base_url))
        .json(&serde_json::json!({ "uploadBatch": "no-candidates" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}
