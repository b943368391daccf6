//! Integration tests across every representation of a RAIL spec

use pretty_assertions::assert_eq;
use railspec_core::{
    parse_rail, to_rail_xml, Children, DictCodec, ElementType, ListItem, RailSerializer,
    SchemaTree, WireCodec,
};

const PEOPLE: &str = include_str!("fixtures/people.rail");

#[test]
fn test_fixture_parses() {
    let spec = parse_rail(PEOPLE).unwrap();

    let input = spec.input_schema.as_ref().unwrap();
    assert_eq!(input.paths(), vec!["$.topic"]);

    let output = spec.output_schema.as_ref().unwrap();
    assert_eq!(
        output.paths(),
        vec![
            "$.people",
            "$.people.item.name",
            "$.people.item.born",
            "$.people.item.alarm",
            "$.people.item.address",
            "$.people.item.address.city",
            "$.people.item.address.homepage",
            "$.tags",
            "$.tags.item",
            "$.confidence",
        ]
    );

    let people = output.field("people").unwrap();
    let person = match &people.children {
        Some(Children::List(ListItem::Fields(person))) => person,
        other => panic!("expected implicit object, got {other:?}"),
    };
    assert_eq!(
        person["name"].formatters,
        vec!["two-words", "valid-choices: {['Ada Lovelace';'Alan Turing']}"]
    );
    assert_eq!(person["name"].element.on_fail_for("two-words"), Some("reask"));
    assert_eq!(person["name"].element.on_fail_for("length"), Some("fix"));
    assert_eq!(person["born"].element.date_format.as_deref(), Some("%Y-%m-%d"));
    assert_eq!(person["address"].element.strict, Some(true));

    assert_eq!(
        output.field("confidence").unwrap().element.attributes["x-unit"],
        "percent"
    );
    assert_eq!(spec.all_plugins(), vec!["acme-web", "acme-net"]);
    assert!(spec.prompt.contains("${gr.complete_json_suffix}"));
    assert!(spec.script.as_ref().unwrap().source.contains("value < 10"));
}

#[test]
fn test_fixture_survives_every_representation() {
    let spec = parse_rail(PEOPLE).unwrap();

    let xml = to_rail_xml(&spec);
    assert_eq!(parse_rail(&xml).unwrap(), spec);

    let compact = RailSerializer::compact().serialize(&spec);
    assert_eq!(parse_rail(&compact).unwrap(), spec);

    let dict = DictCodec::new();
    let wire = WireCodec::new();
    let stored = dict.to_dict(&spec);
    let response = wire.to_response(&spec);
    assert_eq!(dict.from_dict(&stored).unwrap(), spec);
    assert_eq!(wire.from_request(&response).unwrap(), spec);

    // dict -> xml -> wire -> spec
    let via_all = wire
        .from_request(&wire.to_response(&parse_rail(&to_rail_xml(&dict.from_dict(&stored).unwrap())).unwrap()))
        .unwrap();
    assert_eq!(via_all, spec);
}

#[test]
fn test_scalar_root_in_json() {
    let spec = parse_rail(
        r#"<rail version="0.1"><output type="string" description="A color" format="lower-case"/><prompt>Name a color</prompt></rail>"#,
    )
    .unwrap();
    let stored = DictCodec::new().to_dict(&spec);
    assert_eq!(
        stored["output_schema"]["schema"]["element"]["type"],
        serde_json::json!("string")
    );

    let restored = DictCodec::new().from_dict(&stored).unwrap();
    match restored.output_schema {
        Some(SchemaTree::Scalar(node)) => {
            assert_eq!(node.element_type(), &ElementType::String);
            assert_eq!(node.formatters, vec!["lower-case"]);
        }
        other => panic!("expected scalar root, got {other:?}"),
    }
}
