//! Route builder tests.
//!
//! A recording router captures what the builder registers, so the tests can
//! check pattern translation and drive the native handlers directly. The
//! loopback tests then run the whole binding end to end, client through
//! registered handler and back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use route_bind::transports::Loopback;
use route_bind::{
    ApiBuilder, ApiClient, Endpoint, Error, HttpRouter, Method, NativeRequest, Params, Registry,
    RouteHandler, SerdeTransformer, json_wrapper,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Captures registrations instead of dispatching them.
#[derive(Default)]
struct RecordingRouter {
    routes: Vec<(Method, String, RouteHandler)>,
}

impl RecordingRouter {
    fn patterns(&self) -> Vec<(Method, &str)> {
        self.routes
            .iter()
            .map(|(method, pattern, _)| (*method, pattern.as_str()))
            .collect()
    }

    fn handler(&self, index: usize) -> RouteHandler {
        Arc::clone(&self.routes[index].2)
    }
}

impl HttpRouter for RecordingRouter {
    fn get(&mut self, pattern: &str, handler: RouteHandler) {
        self.routes.push((Method::Get, pattern.to_string(), handler));
    }

    fn put(&mut self, pattern: &str, handler: RouteHandler) {
        self.routes.push((Method::Put, pattern.to_string(), handler));
    }

    fn patch(&mut self, pattern: &str, handler: RouteHandler) {
        self.routes
            .push((Method::Patch, pattern.to_string(), handler));
    }

    fn delete(&mut self, pattern: &str, handler: RouteHandler) {
        self.routes
            .push((Method::Delete, pattern.to_string(), handler));
    }
}

fn native(params: &[(&str, &str)], body: Option<Value>) -> NativeRequest {
    NativeRequest {
        params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body,
    }
}

#[test]
fn identity_slots_translate_on_registration() {
    let mut api = ApiBuilder::new(RecordingRouter::default(), json_wrapper::<Value>());

    api.get("/orgs/@orgId/users/@userId", |_params: Params| async move {
        Ok(None)
    })
    .unwrap();
    api.delete("/widgets/:id", |_params: Params| async move { Ok(None) })
        .unwrap();

    assert_eq!(
        api.router().patterns(),
        [
            (Method::Get, "/orgs/:uuid_orgId/users/:uuid_userId"),
            (Method::Delete, "/widgets/:id"),
        ]
    );
}

#[test]
fn invalid_pattern_is_rejected_at_registration() {
    let mut api = ApiBuilder::new(RecordingRouter::default(), json_wrapper::<Value>());

    let result = api.get("/a/:id/b/:id", |_params: Params| async move { Ok(None) });

    assert!(matches!(result, Err(Error::Template(_))));
    assert!(api.router().patterns().is_empty());
}

#[tokio::test]
async fn get_handler_receives_parameter_record() {
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);

    let mut api = ApiBuilder::new(RecordingRouter::default(), json_wrapper::<Value>());
    api.get("/things/:id/children/@childId", move |params: Params| {
        let sink = Arc::clone(&sink);
        async move {
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(params);
            }
            Ok(None)
        }
    })
    .unwrap();

    let handler = api.router().handler(0);
    let reply = handler(native(
        &[("uuid_childId", "abc"), ("id", "42")],
        None,
    ))
    .await;

    assert_eq!(reply.status, 204);
    let params = seen.lock().unwrap().clone().unwrap();
    let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["id", "uuid_childId"]);
    assert_eq!(params.get("id"), Some("42"));
    assert_eq!(params.get("uuid_childId"), Some("abc"));
}

#[derive(Debug, Serialize, Deserialize)]
struct WidgetUpdate {
    name: String,
}

#[tokio::test]
async fn put_handler_receives_transformed_payload() {
    let mut api = ApiBuilder::new(RecordingRouter::default(), json_wrapper::<Value>());
    api.put(
        "/widgets/@id",
        |payload: WidgetUpdate| async move { Ok(Some(json!({ "name": payload.name }))) },
        SerdeTransformer::new(),
    )
    .unwrap();

    let handler = api.router().handler(0);
    let reply = handler(native(&[("uuid_id", "7")], Some(json!({ "name": "w" })))).await;

    assert_eq!(reply.status, 200);
    let body: Value = serde_json::from_str(reply.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "name": "w" }));
}

#[tokio::test]
async fn rejected_payload_maps_to_bad_request() {
    let mut api = ApiBuilder::new(RecordingRouter::default(), json_wrapper::<Value>());
    api.put(
        "/widgets/@id",
        |payload: WidgetUpdate| async move { Ok(Some(json!({ "name": payload.name }))) },
        SerdeTransformer::new(),
    )
    .unwrap();

    let handler = api.router().handler(0);

    let wrong_shape = handler(native(&[("uuid_id", "7")], Some(json!({ "name": 5 })))).await;
    assert_eq!(wrong_shape.status, 400);

    let missing_body = handler(native(&[("uuid_id", "7")], None)).await;
    assert_eq!(missing_body.status, 400);
}

#[tokio::test]
async fn handler_failure_maps_to_server_error() {
    let mut api = ApiBuilder::new(RecordingRouter::default(), json_wrapper::<Value>());
    api.get("/widgets/:id", |_params: Params| async move {
        Err(Error::handler("lookup failed"))
    })
    .unwrap();

    let handler = api.router().handler(0);
    let reply = handler(native(&[("id", "42")], None)).await;

    assert_eq!(reply.status, 500);
    let body: Value = serde_json::from_str(reply.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["message"], "lookup failed");
}

const WIDGET_GET: Endpoint<(), Value> = Endpoint::get("/widgets/:id");
const WIDGET_PUT: Endpoint<Value, Value> = Endpoint::put("/widgets/@id");

fn widget_api() -> Loopback {
    let mut api = ApiBuilder::new(Loopback::new(), json_wrapper::<Value>());
    api.get("/widgets/:id", |params: Params| async move {
        let id = params.get("id").unwrap_or_default().to_string();
        Ok(Some(json!({ "id": id, "name": "Widget" })))
    })
    .unwrap();
    api.put(
        "/widgets/@id",
        |payload: WidgetUpdate| async move { Ok(Some(json!({ "name": payload.name }))) },
        SerdeTransformer::new(),
    )
    .unwrap();
    api.into_router()
}

#[tokio::test]
async fn loopback_serves_a_typed_get_end_to_end() {
    let client = ApiClient::new(widget_api(), Arc::new(Registry::new()));

    let widget = client
        .request(&WIDGET_GET)
        .params(Params::new().set("id", "42"))
        .execute()
        .await
        .unwrap();

    assert_eq!(widget, Some(json!({ "id": "42", "name": "Widget" })));
}

#[tokio::test]
async fn loopback_serves_a_typed_put_end_to_end() {
    let client = ApiClient::new(widget_api(), Arc::new(Registry::new()));

    let updated = client
        .request(&WIDGET_PUT)
        .params(Params::new().uuid("id", "7"))
        .payload_value(json!({ "name": "Renamed" }))
        .execute()
        .await
        .unwrap();

    assert_eq!(updated, Some(json!({ "name": "Renamed" })));
}

#[tokio::test]
async fn loopback_answers_unregistered_routes_with_not_found() {
    let client = ApiClient::new(widget_api(), Arc::new(Registry::new()));

    let result = client.call(Method::Get, "/gadgets/1").execute().await;

    match result {
        Err(Error::Api(e)) => assert_eq!(e.status, 404),
        other => panic!("expected Error::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn loopback_rejects_malformed_json_bodies() {
    let loopback = widget_api();
    assert_eq!(loopback.route_count(), 2);

    use route_bind::transports::{Transport, WireRequest};
    let request = WireRequest {
        url: "/widgets/7".to_string(),
        method: Method::Put,
        headers: HashMap::new(),
        body: Some("{not json".to_string()),
    };

    let response = loopback.send(request).await.unwrap();
    assert_eq!(response.status, 400);
}
