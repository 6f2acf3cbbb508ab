#![forbid(unsafe_code)]

//! Integration tests: loading page configs from disk and driving the
//! resulting pages.

use std::fs;

use statebind_runtime::{PageConfig, Page, RuntimeError, StrategyKind, UserInput, Value};
use statebind_view::ViewError;
use tempfile::TempDir;

const COUNTER_TOML: &str = r#"
strategy = "intercepted"

[initial]
num = 0

[[nodes]]
tag = "p"
attributes = { data-bind = "num", data-template = "Clicked {value} times" }

[[nodes]]
tag = "button"
text = "Click me!"
attributes = { id = "click" }

[[nodes]]
tag = "button"
text = "Reset"
attributes = { id = "reset" }

[[events]]
target = "click"
on = "press"
action = { kind = "increment", key = "num" }

[[events]]
target = "reset"
action = { kind = "set", key = "num", value = 0 }
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_toml_and_drive_page() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "counter.toml", COUNTER_TOML);

    let config = PageConfig::load(&path).unwrap();
    assert_eq!(config.strategy, StrategyKind::Intercepted);

    let mut page = Page::from_config(&config).unwrap();
    page.mount().unwrap();
    for _ in 0..3 {
        page.dispatch(&UserInput::press("click")).unwrap();
    }
    assert_eq!(page.store().get("num"), Some(Value::from(3)));
    assert!(page.render_html().contains("Clicked 3 times"));

    page.dispatch(&UserInput::press("reset")).unwrap();
    assert!(page.render_html().contains("Clicked 0 times"));
}

#[test]
fn load_json() {
    let dir = TempDir::new().unwrap();
    let json = r#"{
        "strategy": "explicit",
        "initial": { "name": "world" },
        "nodes": [ { "tag": "p", "attributes": { "data-bind": "name" } } ]
    }"#;
    let path = write(&dir, "page.JSON", json);

    let config = PageConfig::load(&path).unwrap();
    let mut page = Page::from_config(&config).unwrap();
    page.mount().unwrap();
    assert_eq!(page.render_html(), "<p data-bind=\"name\">world</p>\n");
}

#[test]
fn toggle_actions_from_toml() {
    let config = PageConfig::from_toml_str(
        r#"
strategy = "intercepted"

[initial]
on = 0
mode = "light"

[[nodes]]
tag = "span"
attributes = { data-bind = "on" }

[[nodes]]
tag = "body"
attributes = { data-bind-attr = "mode:class" }

[[nodes]]
tag = "button"
attributes = { id = "power" }

[[nodes]]
tag = "button"
attributes = { id = "theme" }

[[events]]
target = "power"
action = { kind = "toggle", key = "on" }

[[events]]
target = "theme"
action = { kind = "toggle", key = "mode", on = "dark", off = "light" }
"#,
    )
    .unwrap();

    let mut page = Page::from_config(&config).unwrap();
    assert!(page.missing_targets().is_empty());
    page.mount().unwrap();

    page.dispatch(&UserInput::press("power")).unwrap();
    page.dispatch(&UserInput::press("theme")).unwrap();
    assert_eq!(page.store().get("on"), Some(Value::from(1)));
    assert_eq!(page.store().get("mode"), Some(Value::from("dark")));
    assert!(page.render_html().contains("class=\"dark\""));

    page.dispatch(&UserInput::press("power")).unwrap();
    page.dispatch(&UserInput::press("theme")).unwrap();
    assert_eq!(page.store().get("on"), Some(Value::from(0)));
    assert_eq!(page.store().get("mode"), Some(Value::from("light")));
    assert!(page.is_in_sync());

    let round_trip = PageConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
    assert_eq!(round_trip, config);
}

#[test]
fn attribute_names_cannot_inject_markup() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "page.toml",
        r#"
[[nodes]]
tag = "p"
attributes = { 'x" onclick="y' = "1" }
"#,
    );
    let config = PageConfig::load(&path).unwrap();
    assert!(matches!(
        Page::from_config(&config),
        Err(RuntimeError::View(ViewError::InvalidName { .. }))
    ));
}

#[test]
fn unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "page.yaml", "strategy: explicit");
    assert!(matches!(
        PageConfig::load(&path),
        Err(RuntimeError::UnsupportedFormat { .. })
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(PageConfig::load(&path), Err(RuntimeError::Io(_))));
}

#[test]
fn malformed_marker_fails_page_build() {
    let config = PageConfig::from_toml_str(
        r#"
[[nodes]]
tag = "span"
attributes = { data-bind = "" }
"#,
    )
    .unwrap();
    assert!(matches!(
        Page::from_config(&config),
        Err(RuntimeError::View(_))
    ));
}

#[test]
fn error_messages_are_descriptive() {
    let err = PageConfig::from_toml_str("strategy = \"proxy\"").unwrap_err();
    assert!(err.to_string().starts_with("invalid TOML config"), "{err}");
}
