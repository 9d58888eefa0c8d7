//! End-to-end demo: one schema, both sides of the wire.
//!
//! Builds a widget API over the loopback transport, then calls it with the
//! typed client. Registered payloads travel with their type tag and come
//! back as concrete `Widget` values.
//!
//! Run with: cargo run --example typed_widgets

use std::sync::Arc;

use route_bind::transports::Loopback;
use route_bind::{
    ApiBuilder, ApiClient, Endpoint, Params, Registry, SerdeTransformer, Tagged, json_wrapper,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Widget {
    id: String,
    name: String,
}

impl Tagged for Widget {}

const WIDGET_GET: Endpoint<(), Widget> = Endpoint::get("/widgets/:id");
const WIDGET_RENAME: Endpoint<Widget, Widget> = Endpoint::put("/widgets/@id");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let registry = Arc::new(Registry::new().with_type::<Widget>("Widget"));

    let server_registry = Arc::clone(&registry);
    let mut api = ApiBuilder::new(Loopback::new(), json_wrapper::<Value>());
    api.get("/widgets/:id", {
        let registry = Arc::clone(&server_registry);
        move |params: Params| {
            let registry = Arc::clone(&registry);
            async move {
                let widget = Widget {
                    id: params.get("id").unwrap_or_default().to_string(),
                    name: "Widget".to_string(),
                };
                Ok(Some(registry.encode_object(&widget)?))
            }
        }
    })?;
    api.put(
        "/widgets/@id",
        {
            let registry = Arc::clone(&server_registry);
            move |widget: Widget| {
                let registry = Arc::clone(&registry);
                async move { Ok(Some(registry.encode_object(&widget)?)) }
            }
        },
        SerdeTransformer::new(),
    )?;

    let client = ApiClient::new(api.into_router(), registry);

    let widget = client
        .request(&WIDGET_GET)
        .params(Params::new().set("id", "42"))
        .execute()
        .await?;
    println!("fetched: {:?}", widget);

    let renamed = client
        .request(&WIDGET_RENAME)
        .params(Params::new().uuid("id", "42"))
        .payload(Widget {
            id: "42".to_string(),
            name: "Renamed Widget".to_string(),
        })
        .execute()
        .await?;
    println!("renamed: {:?}", renamed);

    Ok(())
}
