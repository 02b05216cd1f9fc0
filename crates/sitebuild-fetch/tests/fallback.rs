//! Candidate fallback behaviour against a scripted HTTP client.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use sitebuild_fetch::{
    BoxStream, Error, FetchOptions, FetchPhase, Fetcher, HttpClient, Progress, Response,
};
use tempfile::tempdir;

#[derive(Debug)]
struct MockError(String);

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl std::error::Error for MockError {}

#[derive(Clone)]
enum Head {
    Status(u16),
    Refused,
    Hang,
}

#[derive(Clone)]
enum Get {
    /// 200 with the given chunks and a correct Content-Length.
    Body(Vec<&'static str>),
    /// 200 without Content-Length.
    Chunked(Vec<&'static str>),
    Status(u16),
    /// 200, some chunks, then a transport error.
    BreakAfter(Vec<&'static str>),
    /// 200, some chunks, then the body never ends.
    Stall(Vec<&'static str>),
    /// 200 advertising more bytes than are sent.
    Short { sent: &'static str, advertised: u64 },
}

#[derive(Clone, Default)]
struct ScriptedClient {
    routes:   HashMap<String, (Head, Get)>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    fn route(mut self, url: &str, head: Head, get: Get) -> Self {
        self.routes.insert(url.to_string(), (head, get));
        self
    }

    fn requests(&self) -> Vec<String> { self.requests.lock().unwrap().clone() }

    fn lookup(&self, method: &str, url: &str) -> Option<(Head, Get)> {
        self.requests.lock().unwrap().push(format!("{method} {url}"));
        self.routes.get(url).cloned()
    }
}

fn chunks(parts: Vec<&'static str>) -> Vec<Result<Bytes, MockError>> {
    parts.into_iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect()
}

fn body(items: Vec<Result<Bytes, MockError>>) -> BoxStream<'static, Result<Bytes, MockError>> {
    Box::pin(stream::iter(items))
}

fn len(parts: &[&'static str]) -> u64 { parts.iter().map(|p| p.len() as u64).sum() }

impl HttpClient for ScriptedClient {
    type Error = MockError;

    async fn head(&self, url: &str) -> Result<u16, Self::Error> {
        match self.lookup("HEAD", url) {
            Some((Head::Status(status), _)) => Ok(status),
            Some((Head::Refused, _)) => Err(MockError("connection refused".into())),
            Some((Head::Hang, _)) => std::future::pending().await,
            None => Err(MockError("dns failure".into())),
        }
    }

    async fn get(&self, url: &str) -> Result<Response<Self::Error>, Self::Error> {
        let Some((_, get)) = self.lookup("GET", url) else {
            return Err(MockError("dns failure".into()));
        };

        let (status, content_length, body) = match get {
            Get::Body(parts) => (200, Some(len(&parts)), body(chunks(parts))),
            Get::Chunked(parts) => (200, None, body(chunks(parts))),
            Get::Status(status) => (status, None, body(Vec::new())),
            Get::BreakAfter(parts) => {
                let advertised = len(&parts) * 2;
                let mut items = chunks(parts);
                items.push(Err(MockError("connection reset".into())));
                (200, Some(advertised), body(items))
            }
            Get::Stall(parts) => {
                let advertised = len(&parts) * 2;
                let stalled: BoxStream<'static, Result<Bytes, MockError>> =
                    Box::pin(stream::iter(chunks(parts)).chain(stream::pending()));
                (200, Some(advertised), stalled)
            }
            Get::Short { sent, advertised } => (200, Some(advertised), body(chunks(vec![sent]))),
        };

        Ok(Response {
            status,
            content_length,
            body,
        })
    }
}

const A: &str = "https://cdn.example/a.mp4";
const B: &str = "https://cdn.example/b.mp4";
const C: &str = "https://cdn.example/c.mp4";

fn fetcher(client: ScriptedClient) -> Fetcher<ScriptedClient> {
    Fetcher::new(client).with_options(
        FetchOptions::default()
            .probe_timeout(Some(Duration::from_millis(200)))
            .transfer_timeout(Some(Duration::from_millis(200))),
    )
}

fn staging_leftovers(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".part"))
        .collect()
}

#[tokio::test]
async fn test_falls_through_to_first_complete_candidate() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("public/bg.mp4");
    let client = ScriptedClient::default()
        .route(A, Head::Status(404), Get::Body(vec!["a"]))
        .route(B, Head::Status(200), Get::BreakAfter(vec!["bbbb", "bbbb"]))
        .route(C, Head::Status(200), Get::Body(vec!["cccc", "cc"]));
    let fetcher = fetcher(client.clone());

    let fetched = fetcher.fetch(&[A, B, C], &dest).await.unwrap();

    assert_eq!(fetched.index, 2);
    assert_eq!(fetched.url, C);
    assert_eq!(fetched.bytes, 6);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "cccccc");
    assert!(staging_leftovers(&dest.parent().unwrap()).is_empty());
    assert_eq!(
        client.requests(),
        vec![
            format!("HEAD {A}"),
            format!("HEAD {B}"),
            format!("GET {B}"),
            format!("HEAD {C}"),
            format!("GET {C}"),
        ]
    );
}

#[tokio::test]
async fn test_first_success_short_circuits() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let client = ScriptedClient::default()
        .route(A, Head::Status(200), Get::Body(vec!["first"]))
        .route(B, Head::Status(200), Get::Body(vec!["second"]))
        .route(C, Head::Status(200), Get::Body(vec!["third"]));
    let fetcher = fetcher(client.clone());

    let fetched = fetcher.fetch(&[A, B, C], &dest).await.unwrap();

    assert_eq!(fetched.index, 0);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "first");
    assert_eq!(client.requests(), vec![format!("HEAD {A}"), format!("GET {A}")]);
}

#[tokio::test]
async fn test_all_unavailable_is_exhausted_without_file() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let client = ScriptedClient::default()
        .route(A, Head::Status(404), Get::Body(vec!["a"]))
        .route(B, Head::Refused, Get::Body(vec!["b"]))
        .route(C, Head::Status(500), Get::Body(vec!["c"]));
    let fetcher = fetcher(client.clone());

    let result = fetcher.fetch(&[A, B, C], &dest).await;

    assert!(matches!(result, Err(Error::Exhausted { attempted: 3 })));
    assert!(!dest.exists());
    assert!(client.requests().iter().all(|r| r.starts_with("HEAD ")));
}

#[tokio::test]
async fn test_exhaustion_removes_stale_partial() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    std::fs::write(&dest, "half a video from last time").unwrap();
    let client = ScriptedClient::default()
        .route(A, Head::Status(200), Get::BreakAfter(vec!["aaaa"]))
        .route(B, Head::Status(404), Get::Body(vec!["b"]));
    let fetcher = fetcher(client);

    let result = fetcher.fetch(&[A, B], &dest).await;

    assert!(matches!(result, Err(Error::Exhausted { attempted: 2 })));
    assert!(!dest.exists());
    assert!(staging_leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_exhaustion_removes_leftover_staging_file() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    std::fs::write(dir.path().join(".bg.mp4.part"), "killed mid-download").unwrap();
    let client = ScriptedClient::default().route(A, Head::Status(404), Get::Body(vec!["a"]));
    let fetcher = fetcher(client);

    let result = fetcher.fetch(&[A], &dest).await;

    assert!(matches!(result, Err(Error::Exhausted { attempted: 1 })));
    assert!(!dest.exists());
    assert!(staging_leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_undiscardable_destination_still_tries_remaining_candidates() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    std::fs::create_dir(&dest).unwrap();
    std::fs::write(dest.join("keep"), "x").unwrap();
    let client = ScriptedClient::default()
        .route(A, Head::Status(200), Get::BreakAfter(vec!["aaaa"]))
        .route(B, Head::Status(404), Get::Body(vec!["b"]));
    let fetcher = fetcher(client.clone());

    let result = fetcher.fetch(&[A, B], &dest).await;

    assert!(matches!(result, Err(Error::Io { .. })));
    assert_eq!(
        client.requests(),
        vec![format!("HEAD {A}"), format!("GET {A}"), format!("HEAD {B}")]
    );
}

#[tokio::test]
async fn test_non_200_retrieval_is_skipped() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let client = ScriptedClient::default()
        .route(A, Head::Status(200), Get::Status(403))
        .route(B, Head::Status(200), Get::Chunked(vec!["bb", "bb"]));
    let fetcher = fetcher(client);

    let fetched = fetcher.fetch(&[A, B], &dest).await.unwrap();

    assert_eq!(fetched.index, 1);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "bbbb");
}

#[tokio::test]
async fn test_hung_probe_times_out() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let client = ScriptedClient::default()
        .route(A, Head::Hang, Get::Body(vec!["a"]))
        .route(B, Head::Status(200), Get::Body(vec!["b"]));
    let fetcher = fetcher(client);

    let fetched = fetcher.fetch(&[A, B], &dest).await.unwrap();

    assert_eq!(fetched.index, 1);
}

#[tokio::test]
async fn test_stalled_body_times_out_and_is_discarded() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let client = ScriptedClient::default()
        .route(A, Head::Status(200), Get::Stall(vec!["aaaa"]))
        .route(B, Head::Status(200), Get::Body(vec!["b"]));
    let fetcher = fetcher(client);

    let fetched = fetcher.fetch(&[A, B], &dest).await.unwrap();

    assert_eq!(fetched.index, 1);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "b");
    assert!(staging_leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_short_body_is_rejected() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let client = ScriptedClient::default().route(
        A,
        Head::Status(200),
        Get::Short {
            sent:       "abc",
            advertised: 10,
        },
    );
    let fetcher = fetcher(client);

    let result = fetcher.fetch(&[A], &dest).await;

    assert!(matches!(result, Err(Error::Exhausted { attempted: 1 })));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_empty_candidate_list() {
    let dir = tempdir().unwrap();
    let fetcher = fetcher(ScriptedClient::default());
    let none: [&str; 0] = [];

    let result = fetcher.fetch(&none, &dir.path().join("bg.mp4")).await;

    assert!(matches!(result, Err(Error::NoCandidates)));
}

#[tokio::test]
async fn test_progress_reports_phases_and_percentage() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let seen: Arc<Mutex<Vec<Progress>>> = Arc::default();
    let sink = seen.clone();
    let client = ScriptedClient::default()
        .route(A, Head::Status(404), Get::Body(vec!["a"]))
        .route(B, Head::Status(200), Get::Body(vec!["bb", "bb"]));
    let fetcher = Fetcher::new(client).with_options(
        FetchOptions::default().on_progress(Arc::new(move |p: &Progress| sink.lock().unwrap().push(p.clone()))),
    );

    fetcher.fetch(&[A, B], &dest).await.unwrap();

    let seen = seen.lock().unwrap();
    let phases: Vec<(usize, FetchPhase)> = seen.iter().map(|p| (p.candidate, p.phase)).collect();
    assert_eq!(
        phases,
        vec![
            (0, FetchPhase::Probing),
            (1, FetchPhase::Probing),
            (1, FetchPhase::Downloading),
            (1, FetchPhase::Downloading),
            (1, FetchPhase::Downloading),
            (1, FetchPhase::Committing),
            (1, FetchPhase::Completed),
        ]
    );
    let pct: Vec<Option<f64>> = seen
        .iter()
        .filter(|p| p.phase == FetchPhase::Downloading)
        .map(Progress::percentage)
        .collect();
    assert_eq!(pct, vec![Some(0.0), Some(50.0), Some(100.0)]);
}

#[tokio::test]
async fn test_repeated_runs_overwrite_with_first_candidate() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("bg.mp4");
    let client = ScriptedClient::default()
        .route(A, Head::Status(200), Get::Body(vec!["same bytes"]))
        .route(B, Head::Status(200), Get::Body(vec!["other"]));
    let fetcher = fetcher(client);

    fetcher.fetch(&[A, B], &dest).await.unwrap();
    std::fs::write(&dest, "tampered").unwrap();
    fetcher.fetch(&[A, B], &dest).await.unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "same bytes");
}
