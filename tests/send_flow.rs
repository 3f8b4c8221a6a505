//! End-to-end tests for the authenticate-then-submit sequence, driven
//! against a canned-response HTTP listener on a loopback port.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tidarr_send::config::ServerConfig;
use tidarr_send::menu::{ButtonState, MenuButton, REVERT_DELAY};
use tidarr_send::models::{AlbumRef, ArtistRef, MediaKind, MediaSelection, Quality};
use tidarr_send::tidarr::ConnectionTest;
use tidarr_send::{request, SendError, TidarrClient};

struct Recorded {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

enum Reply {
    Body(&'static str),
    /// Accept and read the request, then never answer.
    Hang,
}

/// One accepted connection per scripted reply; every parsed request is
/// reported through the channel before the reply is written.
fn spawn_server(replies: Vec<Reply>) -> (String, Receiver<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for reply in replies {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let recorded = read_request(&mut stream);
            let _ = tx.send(recorded);
            match reply {
                Reply::Body(body) => respond(&mut stream, body),
                Reply::Hang => {
                    // Keep the socket open until the client has timed out
                    thread::sleep(Duration::from_secs(2));
                }
            }
        }
    });

    (format!("http://{addr}"), rx)
}

fn read_request(stream: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut tmp).unwrap();
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut authorization = None;
    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.to_ascii_lowercase().as_str() {
                "authorization" => authorization = Some(value.trim().to_string()),
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut tmp).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Recorded {
        method,
        path,
        authorization,
        body,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn respond(stream: &mut TcpStream, body: &str) {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).unwrap();
    let _ = stream.flush();
}

fn single_track() -> MediaSelection {
    MediaSelection::Track {
        id: "42".to_string(),
        title: Some("Song".to_string()),
        url: None,
        artists: vec![ArtistRef::new("Artist")],
        album: None,
    }
}

fn album_track(id: &str) -> MediaSelection {
    MediaSelection::Track {
        id: id.to_string(),
        title: Some(format!("Track {id}")),
        url: None,
        artists: vec![ArtistRef::new("Artist")],
        album: Some(AlbumRef {
            id: "7".to_string(),
            title: Some("Album".to_string()),
            release_date: Some("2003-06-24".to_string()),
        }),
    }
}

#[test]
fn single_track_without_password_skips_auth() {
    let (url, requests_rx) = spawn_server(vec![Reply::Body("Created")]);
    let server = ServerConfig::new(&url, "");
    let client = TidarrClient::new();

    let requests = request::plan(&[single_track()], Quality::High);
    assert_eq!(requests.len(), 1);

    client.send(&requests[0], &server).unwrap();

    let recorded = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.path, "/api/save");
    assert_eq!(recorded.authorization, None);

    let body: serde_json::Value = serde_json::from_str(&recorded.body).unwrap();
    let item = &body["item"];
    assert_eq!(item["id"], "42");
    assert_eq!(item["title"], "Song");
    assert_eq!(item["artist"], "Artist");
    assert_eq!(item["type"], "track");
    assert_eq!(item["url"], "https://tidal.com/browse/track/42");
    assert_eq!(item["quality"], "high");
    assert_eq!(item["status"], "queue");
    assert_eq!(item["loading"], true);
    assert_eq!(item["error"], false);

    // Exactly one call was made: no auth, no second save
    assert!(requests_rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn album_group_authenticates_once_and_sends_one_save() {
    let (url, requests_rx) = spawn_server(vec![
        Reply::Body(r#"{"accessGranted": true, "token": "abc"}"#),
        Reply::Body("Created"),
    ]);
    let server = ServerConfig::new(&url, "hunter2");
    let client = TidarrClient::new();

    // Three tracks, all on album 7: the plan collapses them into one album
    let selections = vec![album_track("1"), album_track("2"), album_track("3")];
    let requests = request::plan(&selections, Quality::High);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, MediaKind::Album);

    let mut button = MenuButton::for_requests(&requests);
    let results = button.click(&client, &requests, &server, |_, _, _| {});
    assert!(results[0].is_ok());

    let auth = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(auth.method, "POST");
    assert_eq!(auth.path, "/api/auth");
    let auth_body: serde_json::Value = serde_json::from_str(&auth.body).unwrap();
    assert_eq!(auth_body["password"], "hunter2");

    let save = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(save.path, "/api/save");
    assert_eq!(save.authorization.as_deref(), Some("Bearer abc"));
    let save_body: serde_json::Value = serde_json::from_str(&save.body).unwrap();
    assert_eq!(save_body["item"]["type"], "album");
    assert_eq!(save_body["item"]["id"], "7");

    assert!(requests_rx.recv_timeout(Duration::from_millis(200)).is_err());

    // Button lands in Success, then reverts after the delay
    assert_eq!(button.state(), ButtonState::Success);
    assert_eq!(button.label(), "Sent album to Tidarr!");
    button.tick(Instant::now() + REVERT_DELAY + Duration::from_millis(10));
    assert_eq!(button.state(), ButtonState::Idle);
}

#[test]
fn auth_timeout_never_reaches_save() {
    let (url, requests_rx) = spawn_server(vec![Reply::Hang]);
    let server = ServerConfig::new(&url, "hunter2");
    let client = TidarrClient::with_timeout(Duration::from_millis(200));

    let requests = request::plan(&[single_track()], Quality::High);
    let mut button = MenuButton::for_requests(&requests);
    let results = button.click(&client, &requests, &server, |_, _, _| {});

    assert!(matches!(results[0], Err(SendError::Timeout)));
    assert_eq!(button.state(), ButtonState::Failed);
    assert_eq!(button.label(), "Failed to send to Tidarr");

    // The hung auth call is the only request the server ever saw
    let only = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(only.path, "/api/auth");
    assert!(requests_rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn connection_refused_is_a_network_error() {
    // Bind a port, then free it again so nothing listens there
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = TidarrClient::with_timeout(Duration::from_secs(2));
    let server = ServerConfig::new(&url, "");
    let requests = request::plan(&[single_track()], Quality::High);

    assert!(matches!(
        client.send(&requests[0], &server),
        Err(SendError::Network(_))
    ));
}

#[test]
fn denied_auth_aborts_before_save() {
    let (url, requests_rx) = spawn_server(vec![Reply::Body(r#"{"accessGranted": false}"#)]);
    let server = ServerConfig::new(&url, "wrong");
    let client = TidarrClient::new();

    let requests = request::plan(&[single_track()], Quality::High);
    let result = client.send(&requests[0], &server);
    assert!(matches!(result, Err(SendError::Auth(_))));

    let only = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(only.path, "/api/auth");
    assert!(requests_rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn rejected_save_keeps_the_raw_body() {
    let (url, _requests_rx) = spawn_server(vec![Reply::Body("Error: 400 Bad Request")]);
    let server = ServerConfig::new(&url, "");
    let client = TidarrClient::new();

    let requests = request::plan(&[single_track()], Quality::High);
    match client.send(&requests[0], &server) {
        Err(SendError::Server { body }) => assert_eq!(body, "Error: 400 Bad Request"),
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[test]
fn sequential_send_attempts_every_item() {
    // Two separate tracks: first save rejected, second accepted
    let (url, requests_rx) = spawn_server(vec![
        Reply::Body("Error: 500"),
        Reply::Body("Created"),
    ]);
    let server = ServerConfig::new(&url, "");
    let client = TidarrClient::new();

    let selections = vec![
        MediaSelection::parse("track:1").unwrap(),
        MediaSelection::parse("track:2").unwrap(),
    ];
    let requests = request::plan(&selections, Quality::High);
    assert_eq!(requests.len(), 2);

    let results = client.send_all(&requests, &server, |_, _, _| {});
    assert!(results[0].is_err());
    assert!(results[1].is_ok());

    let first = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let second = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(first.path, "/api/save");
    assert_eq!(second.path, "/api/save");
    let second_body: serde_json::Value = serde_json::from_str(&second.body).unwrap();
    assert_eq!(second_body["item"]["id"], "2");
}

#[test]
fn connection_test_probes_and_authenticates() {
    let (url, requests_rx) = spawn_server(vec![
        Reply::Body(r#"{"isAuthActive": true}"#),
        Reply::Body(r#"{"accessGranted": true, "token": "abc"}"#),
    ]);
    let client = TidarrClient::new();
    let server = ServerConfig::new(&url, "hunter2");

    assert_eq!(client.test_connection(&server), ConnectionTest::Success);

    let probe = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(probe.method, "GET");
    assert_eq!(probe.path, "/api/is_auth_active");
    let auth = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(auth.path, "/api/auth");
}

#[test]
fn connection_test_without_auth_needs_no_password() {
    let (url, requests_rx) = spawn_server(vec![Reply::Body(r#"{"isAuthActive": false}"#)]);
    let client = TidarrClient::new();
    let server = ServerConfig::new(&url, "");

    assert_eq!(client.test_connection(&server), ConnectionTest::Success);
    let probe = requests_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(probe.path, "/api/is_auth_active");
    assert!(requests_rx.recv_timeout(Duration::from_millis(200)).is_err());
}
