//! Tests for the polymorphic object protocol.
//!
//! Covers registry round-trips, nested registered types, heterogeneous
//! collections, unknown-tag and unregistered-type failures, empty-registry
//! fail-fast, and the only/except projections.

use route_bind::{Error, Registry, Tagged};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    id: String,
    name: String,
}

impl Tagged for Widget {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gadget {
    serial: u64,
}

impl Tagged for Gadget {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Shipment {
    label: String,
    widget: Widget,
}

impl Tagged for Shipment {}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
struct Profile {
    a: Option<String>,
    b: Option<String>,
    c: Option<String>,
}

impl Tagged for Profile {}

fn registry() -> Registry {
    Registry::new()
        .with_type::<Widget>("Widget")
        .with_type::<Gadget>("Gadget")
        .with_type::<Shipment>("Shipment")
        .with_type::<Profile>("Profile")
}

#[test]
fn registered_type_round_trips() {
    let registry = registry();
    let widget = Widget {
        id: "7".into(),
        name: "Widget".into(),
    };

    let wire = registry.serialize(&widget).unwrap();
    let parsed: Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(parsed["@type"], "Widget");

    let back: Widget = registry.decode(&wire).unwrap();
    assert_eq!(back, widget);
}

#[test]
fn nested_registered_type_round_trips() {
    let registry = registry();
    let shipment = Shipment {
        label: "box".into(),
        widget: Widget {
            id: "7".into(),
            name: "Widget".into(),
        },
    };

    let wire = registry.serialize(&shipment).unwrap();
    let back: Shipment = registry.decode(&wire).unwrap();
    assert_eq!(back, shipment);
}

#[test]
fn nested_tags_on_the_wire_are_validated_and_stripped() {
    let registry = registry();
    let wire = json!({
        "@type": "Shipment",
        "label": "box",
        "widget": { "@type": "Widget", "id": "7", "name": "Widget" }
    })
    .to_string();

    let back: Shipment = registry.decode(&wire).unwrap();
    assert_eq!(back.widget.id, "7");
}

#[test]
fn plain_values_pass_through_untagged() {
    let registry = registry();
    let wire = registry
        .serialize_value(&json!({ "name": "Widget" }))
        .unwrap();

    assert!(!wire.contains("@type"));
    let back: Value = registry.decode(&wire).unwrap();
    assert_eq!(back, json!({ "name": "Widget" }));
}

#[test]
fn heterogeneous_slice_revives_concrete_variants() {
    let registry = registry();
    let items: Vec<Box<dyn Tagged>> = vec![
        Box::new(Widget {
            id: "7".into(),
            name: "Widget".into(),
        }),
        Box::new(Gadget { serial: 99 }),
    ];

    let wire = serde_json::to_string(&registry.encode_slice(&items).unwrap()).unwrap();
    let revived = registry.decode_slice(&wire).unwrap();

    assert_eq!(revived.len(), 2);
    assert!(revived[0].is::<Widget>());
    assert!(revived[1].is::<Gadget>());

    let mut revived = revived.into_iter();
    let widget = revived.next().unwrap().downcast::<Widget>().unwrap();
    assert_eq!(widget.name, "Widget");
    let gadget = revived.next().unwrap().downcast::<Gadget>().unwrap();
    assert_eq!(gadget.serial, 99);
}

#[test]
fn unknown_tag_aborts_whole_payload() {
    let registry = registry();
    let wire = json!({
        "label": "box",
        "widget": { "@type": "Sprocket", "id": "7" }
    })
    .to_string();

    let result: Result<Value, Error> = registry.decode(&wire);
    match result {
        Err(Error::UnknownTypeTag(tag)) => assert_eq!(tag, "Sprocket"),
        other => panic!("expected UnknownTypeTag, got {:?}", other),
    }
}

#[test]
fn unknown_top_level_tag_fails_object_decode() {
    let registry = registry();
    let wire = json!({ "@type": "Sprocket", "id": "7" }).to_string();

    assert!(matches!(
        registry.decode_object(&wire),
        Err(Error::UnknownTypeTag(_))
    ));
}

#[test]
fn unregistered_tagged_type_fails_serialization() {
    #[derive(Debug, Serialize)]
    struct Orphan {
        id: u32,
    }
    impl Tagged for Orphan {}

    let registry = registry();

    assert!(matches!(
        registry.encode_object(&Orphan { id: 1 }),
        Err(Error::Serialization(_))
    ));
    assert!(matches!(
        registry.serialize(&Orphan { id: 2 }),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn empty_registry_fails_fast() {
    let registry = Registry::new();
    let widget = Widget {
        id: "7".into(),
        name: "Widget".into(),
    };

    assert!(matches!(
        registry.encode_object(&widget),
        Err(Error::EmptyRegistry)
    ));
    assert!(matches!(
        registry.decode_object(r#"{"@type":"Widget","id":"7","name":"w"}"#),
        Err(Error::EmptyRegistry)
    ));
}

#[test]
fn only_keeps_listed_fields_and_tag() {
    let registry = registry();
    let profile = Profile {
        a: Some("1".into()),
        b: Some("2".into()),
        c: Some("3".into()),
    };

    let projected = registry.only(&profile, &["a", "b"]).unwrap();
    assert_eq!(
        projected,
        json!({ "@type": "Profile", "a": "1", "b": "2" })
    );

    let revived = registry
        .decode_object(&projected.to_string())
        .unwrap()
        .downcast::<Profile>()
        .unwrap();
    assert_eq!(revived.a.as_deref(), Some("1"));
    assert_eq!(revived.c, None);
}

#[test]
fn except_drops_listed_fields_and_keeps_tag() {
    let registry = registry();
    let profile = Profile {
        a: Some("1".into()),
        b: Some("2".into()),
        c: Some("3".into()),
    };

    let projected = registry.except(&profile, &["a"]).unwrap();
    assert_eq!(
        projected,
        json!({ "@type": "Profile", "b": "2", "c": "3" })
    );

    let revived = registry
        .decode_object(&projected.to_string())
        .unwrap()
        .downcast::<Profile>()
        .unwrap();
    assert_eq!(revived.a, None);
    assert_eq!(revived.b.as_deref(), Some("2"));
}

#[test]
fn tag_of_reports_registration() {
    let registry = registry();
    let widget = Widget {
        id: "7".into(),
        name: "Widget".into(),
    };

    assert_eq!(registry.tag_of(&widget), Some("Widget"));
    assert_eq!(registry.tag_of(&json!({ "plain": true })), None);
}
