use super::*;

#[test]
fn engine_and_format_lookup_is_exact() {
    assert_eq!(EngineId::lookup("neato"), Some(EngineId::Neato));
    assert_eq!(EngineId::lookup("Neato"), None);
    assert_eq!(EngineId::lookup(" dot"), None);
    assert_eq!(FormatId::lookup("xdot"), Some(FormatId::Xdot));
    assert_eq!(FormatId::lookup("jpeg"), None);

    let err = "bogus".parse::<EngineId>().unwrap_err();
    assert_eq!(err.to_string(), "Invalid 'engine' parameter: bogus");
    assert_eq!(err.kind(), ErrorKind::Parameter);
}

#[test]
fn presentation_follows_format_and_raw_toggle() {
    let mut controls = Controls::default();
    assert_eq!(controls.request("graph G {}").presentation(), Presentation::Vector);

    controls.raw = true;
    assert_eq!(controls.request("graph G {}").presentation(), Presentation::Text);

    // Raw only applies to svg.
    controls.format = FormatId::Png;
    assert!(!controls.raw_available());
    assert_eq!(controls.request("graph G {}").presentation(), Presentation::Raster);

    controls.format = FormatId::Json;
    controls.raw = false;
    assert_eq!(controls.request("graph G {}").presentation(), Presentation::Text);
    assert_eq!(FormatId::Json.compiler_format(), FormatId::Json);
    assert_eq!(FormatId::Png.compiler_format(), FormatId::Svg);
}

#[test]
fn history_entry_state_requires_both_fields() {
    let entry = HistoryEntry::new("graph { a -- b }", EngineId::Circo);
    assert_eq!(entry.content, "graph%20%7B%20a%20--%20b%20%7D");

    let state = entry.to_state();
    assert_eq!(state["engine"], "circo");
    assert_eq!(HistoryEntry::from_state(&state), Some(entry.clone()));
    assert_eq!(entry.decoded_content().unwrap(), "graph { a -- b }");

    let missing_engine = serde_json::json!({ "content": "x" });
    assert_eq!(HistoryEntry::from_state(&missing_engine), None);
    assert_eq!(HistoryEntry::from_state(&serde_json::Value::Null), None);
}
