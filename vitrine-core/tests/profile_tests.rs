// Tests for the remote profile panel

use url::Url;
use vitrine_client::record::{Address, Company};
use vitrine_client::{FetchError, ProfileClient, ProfileRecord};
use vitrine_core::document::{API_CONTENT, Region};
use vitrine_core::profile::{
    LOADING_HTML, PaintOutcome, PaintPolicy, PanelState, ProfilePanel, fetch_api_data,
};
use vitrine_core::render::render_profile;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const USER_JSON: &str = r#"{
    "id": 1,
    "name": "Leanne Graham",
    "username": "Bret",
    "email": "Sincere@april.biz",
    "address": {"street": "Kulas Light", "city": "Gwenborough"},
    "phone": "1-770-736-8031 x56442",
    "website": "hildegard.org",
    "company": {"name": "Romaguera-Crona"}
}"#;

fn record(name: &str) -> ProfileRecord {
    ProfileRecord {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        company: Company {
            name: "Acme".to_string(),
            ..Default::default()
        },
        address: Address {
            city: "Springfield".to_string(),
            ..Default::default()
        },
        phone: "555-0100".to_string(),
        website: "example.com".to_string(),
        ..Default::default()
    }
}

async fn mock_user(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ProfileClient {
    let endpoint = Url::parse(&format!("{}/users/1", server.uri())).unwrap();
    ProfileClient::new().unwrap().with_endpoint(endpoint)
}

// ============================================================================
// Fetch Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_paints_profile_fields() {
    let server = MockServer::start().await;
    mock_user(&server, 200, USER_JSON).await;

    let client = client_for(&server);
    let mut panel = ProfilePanel::new(PaintPolicy::default());
    let mut region = Region::new(API_CONTENT);

    let outcome = fetch_api_data(&client, &mut panel, &mut region).await.unwrap();

    assert_eq!(outcome, PaintOutcome::Success);
    assert_eq!(panel.state(), &PanelState::Loaded);
    assert_eq!(
        region.block_text(".user-info p").unwrap(),
        vec![
            "Name: Leanne Graham",
            "Email: Sincere@april.biz",
            "Company: Romaguera-Crona",
            "City: Gwenborough",
            "Phone: 1-770-736-8031 x56442",
            "Website: hildegard.org",
            "Member since 2024",
        ]
    );
    assert_eq!(panel.last_record().unwrap().name, "Leanne Graham");
}

#[tokio::test]
async fn test_fetch_not_found_paints_error_panel() {
    let server = MockServer::start().await;
    mock_user(&server, 404, "{}").await;

    let client = client_for(&server);
    let mut panel = ProfilePanel::new(PaintPolicy::default());
    let mut region = Region::new(API_CONTENT);

    let outcome = fetch_api_data(&client, &mut panel, &mut region).await.unwrap();

    assert_eq!(outcome, PaintOutcome::Failure("error: 404".to_string()));
    assert!(region.text().contains("Oops! Something went wrong"));
    assert!(region.text().contains("404"));
    assert_eq!(region.count(".user-info").unwrap(), 0);
    assert!(panel.last_record().is_none());
}

#[tokio::test]
async fn test_fetch_malformed_body_paints_error_panel() {
    let server = MockServer::start().await;
    mock_user(&server, 200, "<html>not json</html>").await;

    let client = client_for(&server);
    let mut panel = ProfilePanel::new(PaintPolicy::default());
    let mut region = Region::new(API_CONTENT);

    let outcome = fetch_api_data(&client, &mut panel, &mut region).await.unwrap();

    assert!(matches!(outcome, PaintOutcome::Failure(_)));
    assert_eq!(region.count(".error-panel").unwrap(), 1);
    assert_eq!(region.count(".user-info").unwrap(), 0);
}

#[tokio::test]
async fn test_fetch_transport_failure_paints_error_panel() {
    // Bind and release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = Url::parse(&format!("http://{}/users/1", addr)).unwrap();
    let client = ProfileClient::new().unwrap().with_endpoint(endpoint);
    let mut panel = ProfilePanel::new(PaintPolicy::default());
    let mut region = Region::new(API_CONTENT);

    let outcome = fetch_api_data(&client, &mut panel, &mut region).await.unwrap();

    let PaintOutcome::Failure(message) = outcome else {
        panic!("expected a failure");
    };
    assert!(!message.is_empty());
    assert!(matches!(panel.state(), PanelState::Failed(_)));
    assert_eq!(region.count(".error-panel").unwrap(), 1);
}

#[tokio::test]
async fn test_refresh_replaces_error_with_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mock_user(&server, 200, USER_JSON).await;

    let client = client_for(&server);
    let mut panel = ProfilePanel::new(PaintPolicy::default());
    let mut region = Region::new(API_CONTENT);

    fetch_api_data(&client, &mut panel, &mut region).await.unwrap();
    assert_eq!(region.count(".error-panel").unwrap(), 1);

    fetch_api_data(&client, &mut panel, &mut region).await.unwrap();
    assert_eq!(region.count(".error-panel").unwrap(), 0);
    assert_eq!(region.count(".user-info").unwrap(), 1);
}

// ============================================================================
// Panel State Tests
// ============================================================================

#[test]
fn test_begin_paints_loading() {
    let mut panel = ProfilePanel::new(PaintPolicy::default());
    let mut region = Region::new(API_CONTENT);
    region.set_inner_html("<p>old</p>");

    let ticket = panel.begin(&mut region);

    assert_eq!(ticket.id(), 1);
    assert_eq!(region.inner_html(), LOADING_HTML);
    assert_eq!(region.text(), "getting customer info...");
    assert_eq!(panel.state(), &PanelState::Loading);
}

#[test]
fn test_latest_request_drops_stale_response() {
    let mut panel = ProfilePanel::new(PaintPolicy::LatestRequest);
    let mut region = Region::new(API_CONTENT);

    let first = panel.begin(&mut region);
    let second = panel.begin(&mut region);

    let painted = panel
        .complete(&mut region, second, Ok(record("Second")))
        .unwrap();
    assert_eq!(painted, PaintOutcome::Success);

    let stale = panel
        .complete(&mut region, first, Ok(record("First")))
        .unwrap();
    assert_eq!(stale, PaintOutcome::Stale);

    assert!(region.text().contains("Name: Second"));
    assert_eq!(panel.last_record().unwrap().name, "Second");
}

#[test]
fn test_latest_request_drops_stale_error() {
    let mut panel = ProfilePanel::new(PaintPolicy::LatestRequest);
    let mut region = Region::new(API_CONTENT);

    let first = panel.begin(&mut region);
    let second = panel.begin(&mut region);

    panel
        .complete(&mut region, second, Ok(record("Fresh")))
        .unwrap();
    let stale = panel
        .complete(&mut region, first, Err(FetchError::Status(503)))
        .unwrap();

    assert_eq!(stale, PaintOutcome::Stale);
    assert_eq!(region.count(".error-panel").unwrap(), 0);
    assert_eq!(panel.state(), &PanelState::Loaded);
}

#[test]
fn test_older_response_waits_while_newer_in_flight() {
    let mut panel = ProfilePanel::new(PaintPolicy::LatestRequest);
    let mut region = Region::new(API_CONTENT);

    let first = panel.begin(&mut region);
    let _second = panel.begin(&mut region);

    let outcome = panel
        .complete(&mut region, first, Ok(record("First")))
        .unwrap();

    assert_eq!(outcome, PaintOutcome::Stale);
    assert_eq!(region.inner_html(), LOADING_HTML);
}

#[test]
fn test_last_resolved_paints_every_response() {
    let mut panel = ProfilePanel::new(PaintPolicy::LastResolved);
    let mut region = Region::new(API_CONTENT);

    let first = panel.begin(&mut region);
    let second = panel.begin(&mut region);

    panel
        .complete(&mut region, second, Ok(record("Second")))
        .unwrap();
    let outcome = panel
        .complete(&mut region, first, Ok(record("First")))
        .unwrap();

    assert_eq!(outcome, PaintOutcome::Success);
    assert!(region.text().contains("Name: First"));
    assert_eq!(panel.issued(), 2);
}

#[test]
fn test_resumed_panel_continues_numbering() {
    let mut region = Region::new(API_CONTENT);
    let mut earlier = ProfilePanel::new(PaintPolicy::LatestRequest);
    let old = earlier.begin(&mut region);

    let mut panel = ProfilePanel::resume(PaintPolicy::LatestRequest, earlier.issued());
    assert_eq!(panel.state(), &PanelState::Idle);
    assert!(panel.last_record().is_none());

    let new = panel.begin(&mut region);
    assert_eq!(new.id(), old.id() + 1);

    let outcome = panel
        .complete(&mut region, old, Err(FetchError::Status(500)))
        .unwrap();
    assert_eq!(outcome, PaintOutcome::Stale);
    assert_eq!(region.inner_html(), LOADING_HTML);
}

#[test]
fn test_render_profile_lists_fields_in_label_order() {
    let record: ProfileRecord = serde_json::from_str(
        r#"{"name":"Leanne","email":"a@b.com","company":{"name":"Co"},"address":{"city":"X"},"phone":"1","website":"w"}"#,
    )
    .unwrap();

    let mut region = Region::new(API_CONTENT);
    region.set_inner_html(render_profile(&record).unwrap());

    assert_eq!(
        region.block_text(".user-info p").unwrap(),
        vec![
            "Name: Leanne",
            "Email: a@b.com",
            "Company: Co",
            "City: X",
            "Phone: 1",
            "Website: w",
            "Member since 2024",
        ]
    );
}

#[test]
fn test_profile_values_are_escaped() {
    let mut panel = ProfilePanel::new(PaintPolicy::default());
    let mut region = Region::new(API_CONTENT);
    let ticket = panel.begin(&mut region);

    panel
        .complete(&mut region, ticket, Ok(record("<b>Bold</b>")))
        .unwrap();

    assert_eq!(region.count(".user-info b").unwrap(), 0);
    assert!(region.text().contains("Name: <b>Bold</b>"));
}

#[test]
fn test_paint_policy_from_str() {
    assert_eq!(PaintPolicy::from_str("latest"), Some(PaintPolicy::LatestRequest));
    assert_eq!(
        PaintPolicy::from_str("Last-Resolved"),
        Some(PaintPolicy::LastResolved)
    );
    assert_eq!(PaintPolicy::from_str("newest"), None);
    assert_eq!(PaintPolicy::default().as_str(), "latest");
}
