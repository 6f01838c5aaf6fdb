use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use tower::ServiceExt;
use vid_server::Settings;

#[tokio::test]
async fn build_creates_the_uploads_dir_and_serves_health() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        upload_dir: dir.path().join("nested").join("uploads"),
        ..Settings::default()
    };

    let ax = vid_server::build(&settings).await.unwrap();
    assert!(settings.upload_dir.is_dir());

    let res = ax
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn upload_url_uses_configured_base_and_port() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        upload_dir: dir.path().to_path_buf(),
        base_url: "https://videos.example.com".to_string(),
        port: 8443,
        ..Settings::default()
    };
    let ax = vid_server::build(&settings).await.unwrap();

    let body = "--B\r\nContent-Disposition: form-data; name=\"video\"; filename=\"a.mp4\"\r\nContent-Type: video/mp4\r\n\r\nMP4\r\n--B--\r\n";
    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header("content-type", "multipart/form-data; boundary=B")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let path = json["video_path"].as_str().unwrap();
    assert!(path.starts_with("https://videos.example.com:8443/stream/"), "{path}");
    assert!(path.ends_with("-a.mp4"));
}
