//! Property-based round-trip tests
//!
//! Generated specs must survive XML, persisted JSON and wire JSON unchanged.
//! Field names avoid the node keys used by the JSON shape test, and an
//! object used as a single list item always carries an attribute so it is not
//! mistaken for the implicit wrapper.

use proptest::collection::{btree_map, vec};
use proptest::option;
use proptest::prelude::*;
use railspec_core::{
    parse_rail, to_rail_xml, Children, DataTypeNode, DictCodec, ElementType, Fields, ListItem,
    OnFailOverride, RailSerializer, RailSpec, SchemaElement, SchemaTree, ScriptBlock, WireCodec,
};

fn text() -> impl Strategy<Value = String> {
    "[ -~\t\n]{0,12}"
}

fn leaf_type() -> impl Strategy<Value = ElementType> {
    prop_oneof![
        Just(ElementType::String),
        Just(ElementType::Integer),
        Just(ElementType::Float),
        Just(ElementType::Bool),
        Just(ElementType::Date),
        Just(ElementType::Time),
        Just(ElementType::Email),
        Just(ElementType::Url),
        Just(ElementType::Percentage),
        Just(ElementType::Unknown("widget".to_string())),
    ]
}

fn formatters() -> impl Strategy<Value = Vec<String>> {
    vec("[a-z][a-z-]{0,8}(: [a-z0-9 ]{0,6}[a-z0-9])?( \\{[a-z;' ]{0,6}\\})?", 0..3)
}

fn plugins() -> impl Strategy<Value = Option<Vec<String>>> {
    option::of(vec("[a-z][a-z-]{0,8}", 0..3))
}

prop_compose! {
    fn element_meta()(
        description in option::of(text()),
        strict in any::<Option<bool>>(),
        date_format in option::of("%[YmdHM]"),
        time_format in option::of("%[HMS]"),
        on_fail in option::of("reask|fix|noop|filter"),
        on_fails in btree_map("[a-z]{1,6}", "reask|fix|noop", 0..3),
        model in option::of("[A-Z][a-z]{0,6}"),
        attributes in btree_map("x-[a-z]{1,4}", text(), 0..2),
    ) -> SchemaElement {
        let mut element = SchemaElement::new(ElementType::String);
        element.description = description;
        element.strict = strict;
        element.date_format = date_format;
        element.time_format = time_format;
        element.on_fail = on_fail;
        element.on_fails = on_fails
            .into_iter()
            .map(|(validator, method)| OnFailOverride::new(format!("on-fail-{validator}"), method))
            .collect();
        element.model = model;
        element.attributes = attributes.into_iter().collect();
        element
    }
}

fn leaf_node() -> impl Strategy<Value = DataTypeNode> {
    (leaf_type(), element_meta(), formatters(), plugins()).prop_map(
        |(element_type, mut element, formatters, plugins)| {
            element.element_type = element_type;
            DataTypeNode {
                element,
                formatters,
                children: None,
                plugins,
            }
        },
    )
}

fn fields(inner: BoxedStrategy<DataTypeNode>) -> impl Strategy<Value = Fields> {
    btree_map("f_[a-z]{1,5}", inner, 0..4).prop_map(|map| {
        map.into_iter()
            .map(|(name, mut node)| {
                node.element.name = Some(name.clone());
                (name, node)
            })
            .collect()
    })
}

fn container(
    element_type: ElementType,
    children: Children,
    (mut element, formatters, plugins): (SchemaElement, Vec<String>, Option<Vec<String>>),
) -> DataTypeNode {
    element.element_type = element_type;
    DataTypeNode {
        element,
        formatters,
        children: Some(children),
        plugins,
    }
}

fn node() -> BoxedStrategy<DataTypeNode> {
    leaf_node()
        .boxed()
        .prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                (element_meta(), formatters(), plugins(), fields(inner.clone())).prop_map(
                    |(element, formatters, plugins, fields)| {
                        container(
                            ElementType::Object,
                            Children::Object(fields),
                            (element, formatters, plugins),
                        )
                    }
                ),
                (element_meta(), formatters(), plugins(), fields(inner.clone())).prop_map(
                    |(element, formatters, plugins, fields)| {
                        container(
                            ElementType::List,
                            Children::List(ListItem::Fields(fields)),
                            (element, formatters, plugins),
                        )
                    }
                ),
                (element_meta(), formatters(), plugins(), inner).prop_map(
                    |(element, formatters, plugins, mut item)| {
                        if item.element_type() == &ElementType::Object {
                            item.element.description = Some("item".to_string());
                        }
                        container(
                            ElementType::List,
                            Children::List(ListItem::Node(Box::new(item))),
                            (element, formatters, plugins),
                        )
                    }
                ),
            ]
        })
        .boxed()
}

fn tree() -> impl Strategy<Value = SchemaTree> {
    prop_oneof![
        node().prop_map(SchemaTree::Scalar),
        fields(node()).prop_map(SchemaTree::Object),
    ]
}

prop_compose! {
    fn rail_spec()(
        input in option::of(tree()),
        output in option::of(tree()),
        prompt in "[ -~\n]{0,20}",
        instructions in option::of("[ -~\n]{0,20}"),
        script in option::of("[ -~\n]{0,20}"),
    ) -> RailSpec {
        RailSpec {
            input_schema: input,
            output_schema: output,
            prompt,
            instructions,
            script: script.map(ScriptBlock::python),
            version: "0.1".to_string(),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_xml_round_trip(spec in rail_spec()) {
        let pretty = to_rail_xml(&spec);
        prop_assert_eq!(&parse_rail(&pretty).unwrap(), &spec);

        let compact = RailSerializer::compact().serialize(&spec);
        prop_assert_eq!(&parse_rail(&compact).unwrap(), &spec);
    }

    #[test]
    fn prop_dict_round_trip(spec in rail_spec()) {
        let codec = DictCodec::new();
        prop_assert_eq!(&codec.from_dict(&codec.to_dict(&spec)).unwrap(), &spec);
    }

    #[test]
    fn prop_wire_round_trip(spec in rail_spec()) {
        let codec = WireCodec::new();
        prop_assert_eq!(&codec.from_request(&codec.to_response(&spec)).unwrap(), &spec);
    }

    #[test]
    fn prop_node_count_is_stable(tree in tree()) {
        let spec = RailSpec::new("p").with_output(tree.clone());
        let restored = parse_rail(&to_rail_xml(&spec)).unwrap();
        prop_assert_eq!(restored.output_schema.unwrap().node_count(), tree.node_count());
    }
}
