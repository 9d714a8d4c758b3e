use noteboard_core::{ApiError, ClientConfig, Note, NotesApi, RestNotesClient};
use std::io::Read;
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use tiny_http::{Response, Server};

const API_KEY: &str = "test-anon-key";

#[derive(Debug)]
struct RecordedRequest {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl RecordedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves the scripted `(status, body)` responses in order, one per request.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, Receiver<RecordedRequest>) {
    let server = Server::http("127.0.0.1:0").expect("bind test server");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("test server listens on tcp");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in responses {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut content = String::new();
            request
                .as_reader()
                .read_to_string(&mut content)
                .expect("read request body");
            let headers = request
                .headers()
                .iter()
                .map(|header| (header.field.to_string(), header.value.to_string()))
                .collect();
            let _ = tx.send(RecordedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers,
                body: content,
            });
            let _ = if body.is_empty() {
                request.respond(Response::empty(status))
            } else {
                request.respond(Response::from_string(body).with_status_code(status))
            };
        }
    });

    (format!("http://{addr}/rest/v1"), rx)
}

fn client_for(base_url: &str) -> RestNotesClient {
    let config = ClientConfig::new(base_url, API_KEY)
        .expect("valid config")
        .with_timeout(Duration::from_secs(5));
    RestNotesClient::new(&config).expect("client builds")
}

fn next_request(rx: &Receiver<RecordedRequest>) -> RecordedRequest {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("server should have recorded a request")
}

#[tokio::test]
async fn list_sends_credentials_and_keeps_server_order() {
    let (base, rx) = serve(vec![(
        200,
        r#"[{"id":"b","created_at":"2025-08-07T10:00:00Z","title":"second"},
            {"id":"a","created_at":"2025-08-06T10:00:00Z","title":"first"}]"#,
    )]);
    let client = client_for(&base);

    let notes = client.list().await.unwrap();
    assert_eq!(
        notes,
        vec![
            Note::new("b", "2025-08-07T10:00:00Z", "second"),
            Note::new("a", "2025-08-06T10:00:00Z", "first"),
        ]
    );

    let request = next_request(&rx);
    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "/rest/v1/notes");
    assert_eq!(request.header("apikey"), Some(API_KEY));
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {API_KEY}").as_str())
    );
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("prefer"), Some("return=representation"));
}

#[tokio::test]
async fn list_maps_bad_status_and_bad_body() {
    let (base, _rx) = serve(vec![(500, "oops"), (200, r#"{"not":"an array"}"#)]);
    let client = client_for(&base);

    assert_eq!(client.list().await.unwrap_err(), ApiError::Server(500));
    assert!(matches!(
        client.list().await.unwrap_err(),
        ApiError::Decoding(_)
    ));
}

#[tokio::test]
async fn create_posts_title_and_returns_first_row() {
    let (base, rx) = serve(vec![(
        201,
        r#"[{"id":"n9","created_at":"2025-08-06T12:00:00Z","title":"Milk"}]"#,
    )]);
    let client = client_for(&base);

    let created = client.create("Milk").await.unwrap();
    assert_eq!(created, Note::new("n9", "2025-08-06T12:00:00Z", "Milk"));

    let request = next_request(&rx);
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "/rest/v1/notes");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({ "title": "Milk" }));
}

#[tokio::test]
async fn create_requires_created_status_and_one_row() {
    let (base, _rx) = serve(vec![
        (201, "[]"),
        (
            200,
            r#"[{"id":"n9","created_at":"2025-08-06T12:00:00Z","title":"Milk"}]"#,
        ),
    ]);
    let client = client_for(&base);

    assert_eq!(client.create("Milk").await.unwrap_err(), ApiError::NoData);
    assert_eq!(
        client.create("Milk").await.unwrap_err(),
        ApiError::Server(200)
    );
}

#[tokio::test]
async fn update_patches_the_filtered_row() {
    let (base, rx) = serve(vec![
        (
            200,
            r#"[{"id":"n1","created_at":"2025-08-06T12:00:00Z","title":"Renamed"}]"#,
        ),
        (200, "[]"),
    ]);
    let client = client_for(&base);

    let updated = client.update(&"n1".to_string(), "Renamed").await.unwrap();
    assert_eq!(updated.title, "Renamed");

    let request = next_request(&rx);
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.url, "/rest/v1/notes?id=eq.n1");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({ "title": "Renamed" }));

    assert_eq!(
        client
            .update(&"gone".to_string(), "Renamed")
            .await
            .unwrap_err(),
        ApiError::NoData
    );
}

#[tokio::test]
async fn update_rejects_statuses_other_than_ok() {
    let (base, rx) = serve(vec![
        (
            201,
            r#"[{"id":"n1","created_at":"2025-08-06T12:00:00Z","title":"Renamed"}]"#,
        ),
        (404, "missing"),
    ]);
    let client = client_for(&base);
    let id = "n1".to_string();

    assert_eq!(
        client.update(&id, "Renamed").await.unwrap_err(),
        ApiError::Server(201)
    );
    assert_eq!(
        client.update(&id, "Renamed").await.unwrap_err(),
        ApiError::Server(404)
    );
    assert_eq!(next_request(&rx).method, "PATCH");
}

#[tokio::test]
async fn delete_accepts_ok_and_no_content() {
    let (base, rx) = serve(vec![(204, ""), (200, "[]"), (404, "missing")]);
    let client = client_for(&base);
    let id = "n1".to_string();

    client.delete(&id).await.unwrap();
    client.delete(&id).await.unwrap();
    assert_eq!(client.delete(&id).await.unwrap_err(), ApiError::Server(404));

    let request = next_request(&rx);
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.url, "/rest/v1/notes?id=eq.n1");
}

fn unreachable_client() -> RestNotesClient {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    client_for(&format!("http://127.0.0.1:{port}/rest/v1"))
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let client = unreachable_client();

    assert!(matches!(
        client.list().await.unwrap_err(),
        ApiError::Network(_)
    ));
}

#[tokio::test]
async fn mutations_report_refused_connections_as_network_errors() {
    let client = unreachable_client();
    let id = "n1".to_string();

    assert!(matches!(
        client.create("Milk").await.unwrap_err(),
        ApiError::Network(_)
    ));
    assert!(matches!(
        client.update(&id, "Renamed").await.unwrap_err(),
        ApiError::Network(_)
    ));
    assert!(matches!(
        client.delete(&id).await.unwrap_err(),
        ApiError::Network(_)
    ));
}
