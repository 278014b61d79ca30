//! Integration tests for the canonical form and the YAML text form.

mod helpers;

use helpers::*;
use procdef::canonical::{self, text};
use procdef::parse::ProcessDefinition;
use proptest::prelude::*;

#[test]
fn text_form_round_trip_is_exact() {
    let pd = parse_en(ORDER_MANAGEMENT);
    let yaml = pd.to_text_form().expect("Should serialize");
    let back = ProcessDefinition::from_text_form(&yaml).expect("Should decode");

    assert_eq!(back.to_canonical(), pd.to_canonical());
    assert_eq!(back.to_text_form().unwrap(), yaml);
}

#[test]
fn round_trip_of_a_round_trip() {
    for fixture in [ORDER_MANAGEMENT, SIGNALS] {
        let pd = parse_en(fixture);
        let once = canonical::from_text(&canonical::to_text(&pd).unwrap()).unwrap();
        let twice = canonical::from_text(&canonical::to_text(&once).unwrap()).unwrap();
        assert_eq!(twice.to_canonical(), pd.to_canonical());
    }
}

#[test]
fn steps_are_rebuilt_through_the_registry() {
    let pd = parse_en(SIGNALS);
    let back = ProcessDefinition::from_text_form(&pd.to_text_form().unwrap()).unwrap();

    for (name, path) in &pd.paths {
        let rebuilt = &back.paths[name];
        assert_eq!(rebuilt.nodes.len(), path.nodes.len());
        for (a, b) in path.nodes.iter().zip(&rebuilt.nodes) {
            assert_eq!(a.step, b.step);
            assert_ne!(a.id, b.id);
            assert!(b.source_line.is_empty());
        }
    }
    assert_eq!(back.name(), "Signals");
    assert_eq!(back.text, SIGNALS);
}

#[test]
fn text_form_keys() {
    let yaml = parse_en(ORDER_MANAGEMENT).to_text_form().unwrap();
    let tree = text::text_to_tree(&yaml).unwrap();
    assert_eq!(
        tree.pipeline.keys().collect::<Vec<_>>(),
        vec!["user_addresses", "user_id", "user_name", "user_social"]
    );
    assert_eq!(
        tree.path.keys().collect::<Vec<_>>(),
        vec!["feasibility.study", "order.complete", "order.management", "reject.order"]
    );
    assert_eq!(tree.meta.name, "Order management");
    assert_eq!(tree.meta.lang_code, "en_uk");
    assert!(yaml.contains("\n_meta:\n"));
}

#[test]
fn node_records_are_verbatim_captures() {
    let pd = parse_en(&process_text("a", &["Path: a\n  Require b else c", "Path: b\n  Invoke s"]));
    let tree = pd.to_canonical();
    insta::assert_json_snapshot!(tree.path.get("a"), @r#"
    [
      {
        "node_name": "require_else",
        "data": {
          "path1": "b",
          "path2": "c"
        }
      }
    ]
    "#);
}

#[test]
fn canonical_ignores_labels() {
    let pd = parse_en(ORDER_MANAGEMENT);
    let mut renamed = parse_en(&ORDER_MANAGEMENT.replace("Order management", "Orders"));
    renamed.ext_version = "2024.1".to_string();
    assert!(pd.canonical_eq(&renamed));
    assert_ne!(pd.to_canonical(), renamed.to_canonical());
}

#[test]
fn canonical_sees_node_order() {
    let a = parse_en(&process_text("a", &["Path: a\n  Invoke first\n  Invoke second"]));
    let b = parse_en(&process_text("a", &["Path: a\n  Invoke second\n  Invoke first"]));
    assert!(!a.canonical_eq(&b));
}

#[test]
fn canonical_sees_config() {
    let pd = parse_en(ORDER_MANAGEMENT);
    let moved = parse_en(&ORDER_MANAGEMENT.replace(
        "from my.channel.feasibility-study",
        "from my.channel.other",
    ));
    assert!(!pd.canonical_eq(&moved));

    let remapped = parse_en(&ORDER_MANAGEMENT.replace("to delete.crm", "to remove.crm"));
    assert!(!pd.canonical_eq(&remapped));
}

#[test]
fn canonical_sees_step_kind() {
    let a = parse_en(&process_text("a", &["Path: a\n  Enter b", "Path: b\n  Invoke s"]));
    let b = parse_en(&process_text("a", &["Path: a\n  Require b", "Path: b\n  Invoke s"]));
    assert!(!a.canonical_eq(&b));
}

#[test]
fn empty_path_survives_the_text_form() {
    let pd = parse_en(&process_text("a", &["Path: a\n  Invoke s", "Path: idle"]));
    let back = ProcessDefinition::from_text_form(&pd.to_text_form().unwrap()).unwrap();
    assert!(back.paths["idle"].nodes.is_empty());
    assert!(pd.canonical_eq(&back));
}

// =============================================================================
// Order independence
// =============================================================================

const CONFIG_LINES: [&str; 4] = [
    "  Name: Order management",
    "  Start: order.management from my.channel.feasibility-study",
    "  Map service adapter.crm.delete.user to delete.crm",
    "  Map service adapter.billing.delete.user to delete.billing",
];

const PIPELINE_LINES: [&str; 4] = [
    "  user_name: str",
    "  user_id: int",
    "  user_addresses: list",
    "  user_social: dict",
];

const BLOCKS: [&str; 8] = [
    "Path: order.management\n  Require feasibility.study else reject.order\n  Wait for signals patch.complete, drop.complete\n  Enter order.complete",
    "Handler: cease\n  Ignore signals: amend, *.complete\n  Invoke core.order.release-resources\n  Invoke core.order.on-cease",
    "Handler: amend\n  Invoke core.order.amend",
    "Handler: patch.complete\n  Invoke core.order.patch-complete",
    "Handler: drop.complete\n  Invoke core.order.on-drop-complete",
    "Path: feasibility.study\n  Invoke core.order.feasibility-study",
    "Path: order.complete\n  Invoke core.order.notify-complete",
    "Path: reject.order\n  Invoke core.order.reject\n  Emit order.rejected",
];

fn assemble(config: &[&str], pipeline: &[&str], blocks: &[&str]) -> String {
    let mut parts = vec![format!("Config:\n{}", config.join("\n"))];
    parts.push(format!("Pipeline:\n{}", pipeline.join("\n")));
    parts.extend(blocks.iter().map(|b| b.to_string()));
    parts.join("\n\n")
}

#[test]
fn assembled_text_matches_fixture() {
    let assembled = parse_en(&assemble(&CONFIG_LINES, &PIPELINE_LINES, &BLOCKS));
    assert!(assembled.line_errors.is_empty());
    assert!(assembled.canonical_eq(&parse_en(ORDER_MANAGEMENT)));
}

proptest! {
    #[test]
    fn declaration_order_does_not_matter(
        config in Just(CONFIG_LINES.to_vec()).prop_shuffle(),
        pipeline in Just(PIPELINE_LINES.to_vec()).prop_shuffle(),
        blocks in Just(BLOCKS.to_vec()).prop_shuffle()
    ) {
        let reference = parse_en(&assemble(&CONFIG_LINES, &PIPELINE_LINES, &BLOCKS));
        let shuffled = parse_en(&assemble(&config, &pipeline, &blocks));

        let mut expected = reference.to_canonical();
        let mut actual = shuffled.to_canonical();
        expected.meta.text.clear();
        actual.meta.text.clear();
        prop_assert_eq!(actual, expected);
    }
}
