use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use vitrine::commands::command_argument_builder;
use vitrine::handlers::*;
use vitrine_core::catalog::CATALOG_KEY;
use vitrine_core::document::{API_CONTENT, CARDS_CONTAINER, Region};
use vitrine_core::profile::{LOADING_HTML, PaintPolicy};
use vitrine_core::render::{EMPTY_CATALOG_HTML, card_lines, panel_lines, render_error_panel};
use vitrine_core::store::{MemoryStorage, Storage};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn settings_for(args: &[&str]) -> Settings {
    let matches = command_argument_builder()
        .try_get_matches_from(args.iter().copied())
        .unwrap();
    Settings::from_matches(&matches).unwrap()
}

// ============================================================================
// Argument Tests
// ============================================================================

#[test]
fn test_default_settings() {
    let settings = settings_for(&["vitrine", "cards"]);

    assert!(settings.data_dir.ends_with(".config/vitrine"));
    assert_eq!(
        settings.endpoint.as_str(),
        "https://jsonplaceholder.typicode.com/users/1"
    );
    assert_eq!(settings.timeout, None);
    assert_eq!(settings.paint_policy, PaintPolicy::LatestRequest);
    assert!(settings.db_path().ends_with("vitrine.db"));
}

#[test]
fn test_global_flags_after_subcommand() {
    let settings = settings_for(&[
        "vitrine",
        "profile",
        "--endpoint",
        "http://127.0.0.1:8080/users/7",
        "--timeout",
        "3",
        "--paint-policy",
        "last-resolved",
        "--data-dir",
        "/tmp/vitrine-test",
    ]);

    assert_eq!(settings.endpoint.path(), "/users/7");
    assert_eq!(settings.timeout, Some(Duration::from_secs(3)));
    assert_eq!(settings.paint_policy, PaintPolicy::LastResolved);
    assert_eq!(settings.data_dir, PathBuf::from("/tmp/vitrine-test"));
    assert_eq!(settings.page_config().paint_policy, PaintPolicy::LastResolved);
}

#[test]
fn test_rejects_unknown_paint_policy() {
    let result = command_argument_builder().try_get_matches_from([
        "vitrine",
        "cards",
        "--paint-policy",
        "newest",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_debug_requires_subcommand() {
    let result = command_argument_builder().try_get_matches_from(["vitrine", "debug"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_paint_policy() {
    assert_eq!(parse_paint_policy("latest"), Ok(PaintPolicy::LatestRequest));
    assert_eq!(parse_paint_policy("last-resolved"), Ok(PaintPolicy::LastResolved));
    assert!(parse_paint_policy("whatever").unwrap_err().contains("whatever"));
}

#[test]
fn test_resolve_data_dir_expands_tilde() {
    let resolved = resolve_data_dir("~/.config/vitrine/");
    assert!(!resolved.to_string_lossy().starts_with('~'));

    assert_eq!(resolve_data_dir("/srv/vitrine"), PathBuf::from("/srv/vitrine"));
}

// ============================================================================
// Store Tests
// ============================================================================

#[test]
fn test_open_store_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("vitrine");

    let mut db = open_store(&data_dir).unwrap();
    db.set_item("k", "v").unwrap();

    assert!(data_dir.join("vitrine.db").exists());
}

// ============================================================================
// Output Helper Tests
// ============================================================================

#[test]
fn test_render_offline_page() {
    let mut store = MemoryStorage::new();
    let settings = settings_for(&["vitrine", "render", "--offline"]);

    let html = render_offline(&mut store, &settings.page_config()).unwrap();

    assert!(html.contains("Gaming Laptop"));
    assert!(html.contains("getting customer info..."));
    assert!(store.get_item(CATALOG_KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_render_online_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let endpoint = format!("{}/users/1", server.uri());
    let settings = settings_for(&["vitrine", "render", "--endpoint", endpoint.as_str()]);
    let client = build_client(&settings).unwrap();
    let mut store = MemoryStorage::new();

    let mut config = settings.page_config();
    config.icon_src = format!("{}/missing.png", server.uri());

    let html = render_online(&mut store, &client, &config).await.unwrap();

    assert!(html.contains("Oops! Something went wrong"));
    assert!(html.contains("error: 404"));
    // The broken icon was swapped for the inline fallback
    assert!(html.contains("data:image"));
}

#[test]
fn test_write_html_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("page.html");

    write_html("<html></html>", Some(&output)).unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "<html></html>");
}

#[test]
fn test_card_lines_for_empty_catalog() {
    let mut region = Region::new(CARDS_CONTAINER);
    region.set_inner_html(EMPTY_CATALOG_HTML);

    assert_eq!(card_lines(&region).unwrap(), vec!["no products found"]);
}

#[test]
fn test_card_lines_for_seeded_page() {
    let mut store = MemoryStorage::new();
    let (page, _) =
        vitrine_core::page::Page::open(&mut store, &Default::default()).unwrap();

    let lines = card_lines(page.region(CARDS_CONTAINER).unwrap()).unwrap();

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "Gaming Laptop (Price: $899 | Category: Electronics)"
    );
}

#[test]
fn test_panel_lines_loading_and_error() {
    let mut region = Region::new(API_CONTENT);
    region.set_inner_html(LOADING_HTML);
    assert_eq!(panel_lines(&region).unwrap(), vec!["getting customer info..."]);

    region.set_inner_html(render_error_panel("error: 500").unwrap());
    assert_eq!(
        panel_lines(&region).unwrap(),
        vec!["Oops! Something went wrong", "error: 500"]
    );
}

#[test]
fn test_build_client_uses_endpoint() {
    let settings = settings_for(&[
        "vitrine",
        "profile",
        "--endpoint",
        "http://localhost:9999/me",
    ]);

    let client = build_client(&settings).unwrap();
    assert_eq!(client.endpoint(), &Url::parse("http://localhost:9999/me").unwrap());
}
