mod common;

use std::fs;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use common::{page_html, sample_record, state_with};
use crossword_engine::{
    combinations, flush_conversion_log, ConversionAudit, CrosswordType, EngineEvent,
    FetchSettings, Harvester, ItemError, JobProgress, OutputPlan, ProgressSink, Stage,
    ValidationError, CONVERSION_LOG_FILENAME,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

fn harvester_for(server: &MockServer) -> Harvester {
    Harvester::new(FetchSettings {
        base_url: server.uri(),
        ..FetchSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn batch_writes_good_items_and_isolates_failures() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;

    let mut day_one = sample_record("2024-03-09", "QUICK");
    day_one["clues"]["down"][0]["question"] = json!("Toe 🦶 (3)");
    mount_page(&server, "/quick/2024-03-09", page_html(&state_with(day_one))).await;
    // the site served the wrong puzzle type for this date
    mount_page(
        &server,
        "/quick/2024-03-10",
        page_html(&state_with(sample_record("2024-03-10", "CRYPTIC"))),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/quick/2024-03-11"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dates: Vec<NaiveDate> = (9..=11)
        .map(|day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap())
        .collect();
    let requests = combinations(&[CrosswordType::Quick], &dates);

    let temp = TempDir::new().unwrap();
    let plan = OutputPlan::resolve(temp.path(), requests.len()).unwrap();
    plan.prepare().unwrap();

    let sink = TestSink::default();
    let mut audit = ConversionAudit::new();
    let report = harvester_for(&server)
        .run(&requests, &plan, &mut audit, &sink)
        .await;

    let expected = temp.path().join("quick").join("2024-03-09-quick.puz");
    assert_eq!(report.saved, vec![expected.clone()]);
    let bytes = fs::read(&expected).unwrap();
    assert_eq!(&bytes[0x02..0x0E], b"ACROSS&DOWN\0");

    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].request, requests[1]);
    assert!(matches!(
        report.failures[0].error,
        ItemError::Validation(ValidationError::TypeMismatch { .. })
    ));
    assert_eq!(report.failures[1].request, requests[2]);
    assert!(matches!(report.failures[1].error, ItemError::Fetch(_)));
    assert!(!report.is_success());

    let events = sink.take();
    let completed = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::JobCompleted { .. }))
        .count();
    assert_eq!(completed, 3);
    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::Progress(JobProgress {
            job_id: 0,
            stage: Stage::Done,
            ..
        })
    )));

    assert_eq!(audit.len(), 1);
    let log_path = flush_conversion_log(&mut audit, &plan).unwrap();
    assert_eq!(log_path, temp.path().join(CONVERSION_LOG_FILENAME));
    let log = fs::read_to_string(log_path).unwrap();
    assert!(log.contains("[clue 2 Quick, Saturday, March 09, 2024]"));
    assert!(audit.is_empty());
    assert_eq!(flush_conversion_log(&mut audit, &plan), None);
}

#[tokio::test]
async fn single_item_goes_to_the_explicit_file() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/mini/2024-03-09",
        page_html(&state_with(sample_record("2024-03-09", "MINI"))),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let target = temp.path().join("today.puz");
    let requests = combinations(
        &[CrosswordType::Mini],
        &[NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()],
    );
    let plan = OutputPlan::resolve(&target, requests.len()).unwrap();
    plan.prepare().unwrap();

    let mut audit = ConversionAudit::new();
    let report = harvester_for(&server)
        .run(&requests, &plan, &mut audit, &TestSink::default())
        .await;

    assert!(report.is_success());
    assert_eq!(report.saved, vec![target.clone()]);
    assert!(target.is_file());
    assert_eq!(plan.root(), temp.path());
    assert_eq!(flush_conversion_log(&mut audit, &plan), None);
    assert!(!temp.path().join(CONVERSION_LOG_FILENAME).exists());
}

#[tokio::test]
async fn page_without_state_is_reported_not_fatal() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/cryptic/2024-03-09",
        "<html><body>Maintenance</body></html>".to_string(),
    )
    .await;
    mount_page(
        &server,
        "/mini/2024-03-09",
        page_html(&state_with(sample_record("2024-03-09", "MINI"))),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let requests = combinations(
        &[CrosswordType::Cryptic, CrosswordType::Mini],
        &[NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()],
    );
    let plan = OutputPlan::resolve(temp.path(), requests.len()).unwrap();

    let mut audit = ConversionAudit::new();
    let report = harvester_for(&server)
        .run(&requests, &plan, &mut audit, &TestSink::default())
        .await;

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].error, ItemError::Extract(_)));
    assert_eq!(
        report.saved,
        vec![temp.path().join("mini").join("2024-03-09-mini.puz")]
    );
}
