//! Tests for the URL template engine.
//!
//! Covers slot derivation, substitution, round-trip matching, server-side
//! pattern translation, and parameter record validation for patterns mixing
//! string and identity slots.

use route_bind::{Params, RoutePattern, SlotKind};

#[test]
fn literal_pattern_derives_no_slots() {
    let route = RoutePattern::parse("/widgets/all").unwrap();

    assert!(!route.has_slots());
    assert!(route.slots().is_empty());
}

#[test]
fn literal_pattern_substitutes_to_itself() {
    let route = RoutePattern::parse("/widgets/all").unwrap();

    assert_eq!(route.substitute(&Params::new()), "/widgets/all");
    assert_eq!(route.router_pattern(), "/widgets/all");
}

#[test]
fn string_slot_is_derived_and_substituted() {
    let route = RoutePattern::parse("/widgets/:id").unwrap();

    assert_eq!(route.slots().len(), 1);
    assert_eq!(route.slots()[0].name, "id");
    assert_eq!(route.slots()[0].kind, SlotKind::String);
    assert_eq!(route.slots()[0].record_key(), "id");

    let params = Params::new().set("id", "42");
    assert_eq!(route.substitute(&params), "/widgets/42");
}

#[test]
fn identity_slot_uses_uuid_record_key() {
    let route = RoutePattern::parse("/widgets/@id").unwrap();

    assert_eq!(route.slots()[0].kind, SlotKind::Identity);
    assert_eq!(route.slots()[0].record_key(), "uuid_id");
    assert_eq!(route.slots()[0].entity_kind().as_deref(), Some("id"));

    let params = Params::new().uuid("id", "7");
    assert_eq!(route.substitute(&params), "/widgets/7");
}

#[test]
fn mixed_slots_in_non_trailing_segments_round_trip() {
    let route = RoutePattern::parse("/things/:id/children/@childId/edit").unwrap();
    let params = Params::new().set("id", "42").uuid("childId", "abc");

    let path = route.substitute(&params);
    assert_eq!(path, "/things/42/children/abc/edit");

    let recovered = route.match_path(&path).unwrap();
    assert_eq!(recovered, params);
}

#[test]
fn slot_order_follows_left_to_right_scan() {
    let route = RoutePattern::parse("/a/@x/b/:y/c/@z").unwrap();

    let keys: Vec<String> = route.slots().iter().map(|s| s.record_key()).collect();
    assert_eq!(keys, ["uuid_x", "y", "uuid_z"]);
}

#[test]
fn unresolved_slot_stays_literal() {
    let route = RoutePattern::parse("/things/:id/children/@childId").unwrap();
    let params = Params::new().set("id", "42");

    assert_eq!(route.substitute(&params), "/things/42/children/@childId");
}

#[test]
fn similar_slot_names_do_not_collide() {
    let route = RoutePattern::parse("/a/:id/b/:idx").unwrap();
    let params = Params::new().set("id", "7").set("idx", "9");

    assert_eq!(route.substitute(&params), "/a/7/b/9");
}

#[test]
fn duplicate_slot_name_is_rejected() {
    assert!(RoutePattern::parse("/a/:id/b/:id").is_err());
    assert!(RoutePattern::parse("/a/:id/b/@id").is_err());
}

#[test]
fn empty_slot_name_is_rejected() {
    assert!(RoutePattern::parse("/a/:/b").is_err());
}

#[test]
fn absolute_address_colon_stays_literal() {
    let route = RoutePattern::parse("https://api.test/widgets/:id").unwrap();

    assert_eq!(route.slots().len(), 1);
    assert_eq!(route.slots()[0].name, "id");

    let params = Params::new().set("id", "42");
    assert_eq!(route.substitute(&params), "https://api.test/widgets/42");
}

#[test]
fn router_pattern_rewrites_every_identity_slot() {
    let route = RoutePattern::parse("/orgs/@orgId/users/@userId").unwrap();

    assert_eq!(route.router_pattern(), "/orgs/:uuid_orgId/users/:uuid_userId");
}

#[test]
fn router_pattern_passes_string_slots_through() {
    let route = RoutePattern::parse("/things/:id/children/@childId/edit").unwrap();

    assert_eq!(
        route.router_pattern(),
        "/things/:id/children/:uuid_childId/edit"
    );
}

#[test]
fn validate_rejects_unknown_parameter_key() {
    let route = RoutePattern::parse("/widgets/:id").unwrap();
    let params = Params::new().set("nope", "1");

    assert!(route.validate(&params).is_err());
}

#[test]
fn validate_rejects_params_for_slotless_pattern() {
    let route = RoutePattern::parse("/widgets/all").unwrap();
    let params = Params::new().set("id", "1");

    assert!(route.validate(&params).is_err());
}

#[test]
fn validate_accepts_partial_record() {
    // Omitting a slot is the documented footgun, not a validation error.
    let route = RoutePattern::parse("/things/:id/children/@childId").unwrap();
    let params = Params::new().set("id", "42");

    assert!(route.validate(&params).is_ok());
}

#[test]
fn match_path_rejects_wrong_shapes() {
    let route = RoutePattern::parse("/widgets/:id").unwrap();

    assert!(route.match_path("/widgets").is_none());
    assert!(route.match_path("/gadgets/42").is_none());
    assert!(route.match_path("/widgets/42/extra").is_none());
}

#[test]
fn record_from_follows_slot_order() {
    let route = RoutePattern::parse("/things/:id/children/@childId").unwrap();
    let native = [
        ("uuid_childId".to_string(), "abc".to_string()),
        ("id".to_string(), "42".to_string()),
    ]
    .into_iter()
    .collect();

    let params = route.record_from(&native);
    let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["id", "uuid_childId"]);
    assert_eq!(params.get("uuid_childId"), Some("abc"));
}
