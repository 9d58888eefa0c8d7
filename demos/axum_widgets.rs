//! Serving a shared route schema over axum.
//!
//! Registers the widget routes against an `axum::Router` through the
//! adapter and serves them on localhost.
//!
//! Run with: cargo run --example axum_widgets --features axum

use route_bind::axum::AxumRouter;
use route_bind::{ApiBuilder, Params, SerdeTransformer, json_wrapper};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct WidgetUpdate {
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let mut api = ApiBuilder::new(AxumRouter::new(), json_wrapper::<Value>());

    api.get("/widgets/:id", |params: Params| async move {
        let id = params.get("id").unwrap_or_default().to_string();
        Ok(Some(json!({ "id": id, "name": "Widget" })))
    })?;

    api.put(
        "/widgets/@id",
        |update: WidgetUpdate| async move { Ok(Some(json!({ "name": update.name }))) },
        SerdeTransformer::new(),
    )?;

    api.delete("/widgets/:id", |_params: Params| async move { Ok(None) })?;

    let app = api.into_router().into_inner();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
