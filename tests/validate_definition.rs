//! Integration tests for definition validation (EPROC-0001–0010, WPROC-0001).

mod helpers;

use helpers::*;
use procdef::validate;

#[test]
fn order_management_fixture_is_valid() {
    let result = validate_en(ORDER_MANAGEMENT);
    assert!(result.is_valid(), "Expected no diagnostics, got: {:?}", result);
}

#[test]
fn signals_fixture_is_valid() {
    let result = validate_en(SIGNALS);
    assert!(result.is_valid(), "Expected no diagnostics, got: {:?}", result);
}

#[test]
fn name_start_and_paths_missing() {
    let result = validate_en("Config:\n  Map service adapter.crm to crm\n");
    assert_eq!(
        result.error_codes(),
        vec!["EPROC-0001", "EPROC-0002", "EPROC-0003"]
    );
    assert!(result.warnings.is_empty());

    let rendered: Vec<String> = result.errors.iter().map(|d| d.to_string()).collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    [EPROC-0001] Process name must not be empty
    [EPROC-0002] Start path and start service must both be provided
    [EPROC-0003] Process must contain at least one path
    ");
}

#[test]
fn start_service_alone_is_incomplete() {
    let mut pd = parse_en(&process_text("a", &["Path: a\n  Invoke s"]));
    pd.config.start.service.clear();
    let result = validate::validate(&pd);
    assert_eq!(result.error_codes(), vec!["EPROC-0002"]);
}

#[test]
fn empty_paths_are_listed_together() {
    let text = process_text("a", &["Path: a\n  Enter b", "Path: b", "Path: c"]);
    let result = validate_en(&text);
    let messages = messages_for(&result, "EPROC-0004");
    assert_eq!(messages, vec!["Paths must not be empty: b, c"]);
}

#[test]
fn require_else_with_two_missing_paths() {
    let text = process_text(
        "a",
        &[
            "Path: a\n  Require my.path1 else my.path2",
            "Path: b\n  Invoke my.service",
        ],
    );
    let result = validate_en(&text);
    assert_eq!(result.errors.len(), 2, "Got: {:?}", result.errors);
    assert!(result.errors.iter().all(|d| d.code == "EPROC-0005"));
    assert!(result.errors[0].message.contains("`my.path1`"));
    assert!(result.errors[1].message.contains("`my.path2`"));
    assert!(
        result.errors[0]
            .message
            .contains("(line: `Require my.path1 else my.path2`)")
    );
}

#[test]
fn missing_start_path_is_dangling() {
    let text = process_text("nowhere", &["Path: a\n  Invoke my.service"]);
    let result = validate_en(&text);
    assert_eq!(
        messages_for(&result, "EPROC-0005"),
        vec!["Start path `nowhere` does not exist"]
    );
}

#[test]
fn handlers_are_not_path_targets() {
    let text = process_text(
        "a",
        &["Path: a\n  Enter cease", "Handler: cease\n  Invoke my.service"],
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0005"]);
}

#[test]
fn handler_steps_must_reference_existing_paths() {
    let text = process_text(
        "a",
        &["Path: a\n  Invoke my.service", "Handler: cease\n  Enter missing"],
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0005"]);
    assert!(result.errors[0].message.contains("`missing`"));
}

#[test]
fn fork_targets_are_checked_one_by_one() {
    let text = process_text(
        "a",
        &[
            "Path: a\n  Fork to b, ghost under my.fork",
            "Path: b\n  Invoke my.service",
        ],
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0005"]);
    assert!(result.errors[0].message.contains("`ghost`"));
}

#[test]
fn single_path_never_warns() {
    let text = process_text("a", &["Path: a\n  Invoke service.name"]);
    let result = validate_en(&text);
    assert!(result.is_valid(), "Got: {:?}", result);
}

#[test]
fn single_unreferenced_path_still_never_warns() {
    let text = process_text("elsewhere", &["Path: a\n  Invoke service.name"]);
    let result = validate_en(&text);
    assert!(result.warnings.is_empty());
    assert_eq!(result.error_codes(), vec!["EPROC-0005"]);
}

#[test]
fn unused_paths_warn_without_errors() {
    let text = process_text(
        "a",
        &[
            "Path: a\n  Enter b",
            "Path: b\n  Invoke my.service",
            "Path: d\n  Invoke my.service",
            "Path: c\n  Invoke my.service",
        ],
    );
    let result = validate_en(&text);
    assert!(result.errors.is_empty());
    assert_eq!(result.warning_codes(), vec!["WPROC-0001"]);
    assert_eq!(result.warnings[0].message, "Unused paths found: c, d");
    assert!(!result.is_valid());
}

#[test]
fn handler_references_do_not_count_as_use() {
    let text = process_text(
        "a",
        &[
            "Path: a\n  Invoke my.service",
            "Path: b\n  Invoke my.service",
            "Handler: h\n  Enter b",
        ],
    );
    let result = validate_en(&text);
    assert!(result.errors.is_empty());
    assert_eq!(result.warnings[0].message, "Unused paths found: b");
}

#[test]
fn timeout_without_unit() {
    let text = process_text(
        "a",
        &[
            "Path: a\n  Wait for signal s on timeout 15a enter p2",
            "Path: p2\n  Invoke my.service",
        ],
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0006"]);
    assert!(result.errors[0].message.contains("`15a`"));
}

#[test]
fn every_timeout_unit_is_accepted() {
    for unit in ["s", "m", "h", "d"] {
        let waiting = format!("Path: a\n  Wait for signal s on timeout 15{} enter p2", unit);
        let text = process_text(
            "a",
            &[waiting.as_str(), "Path: p2\n  Invoke my.service"],
        );
        let result = validate_en(&text);
        assert!(result.is_valid(), "Unit {} rejected: {:?}", unit, result);
    }
}

#[test]
fn signal_list_with_trailing_comma() {
    let text = process_text(
        "a",
        &[
            "Path: a\n  Wait for signals 123,456, on timeout 10s enter p2",
            "Path: p2\n  Invoke my.service",
        ],
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0007"]);
    assert!(result.errors[0].message.contains("`123,456,`"));
}

#[test]
fn signal_list_with_inner_gap() {
    let text = process_text(
        "a",
        &["Path: a\n  Wait for signals a,,b"],
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0007"]);
}

#[test]
fn empty_text_is_one_error() {
    for text in ["", "   \n\n\t\n"] {
        let result = validate_en(text);
        assert_eq!(result.error_codes(), vec!["EPROC-0008"]);
        assert!(result.warnings.is_empty());
    }
}

#[test]
fn unparseable_body_line_is_reported_with_its_number() {
    let text = process_text("a", &["Path: a\n  Invoke my.service\n  Dance wildly"]);
    let result = validate_en(&text);
    assert_eq!(
        messages_for(&result, "EPROC-0009"),
        vec!["Could not parse line 7: `Dance wildly`"]
    );
}

#[test]
fn unknown_block_keyword_is_unparseable() {
    let text = format!(
        "{}\nBanana: split\n  Invoke my.service\n",
        process_text("a", &["Path: a\n  Invoke my.service"])
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0009"]);
    assert!(result.errors[0].message.contains("`Banana: split`"));
}

#[test]
fn duplicate_path_name() {
    let text = process_text(
        "a",
        &["Path: a\n  Invoke my.service", "Path: a\n  Invoke other.service"],
    );
    let result = validate_en(&text);
    assert_eq!(result.error_codes(), vec!["EPROC-0010"]);
    assert_eq!(
        result.errors[0].message,
        "Duplicate name in line 8: `Path: a`"
    );
}

#[test]
fn errors_are_grouped_by_code() {
    let text = "Config:\n  Start: a from s\n\nPath: a\n  Enter ghost\n  Gibberish\n";
    let result = validate_en(text);
    assert_eq!(
        result.error_codes(),
        vec!["EPROC-0001", "EPROC-0005", "EPROC-0009"]
    );
}
