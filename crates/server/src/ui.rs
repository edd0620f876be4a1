//! Customer management page.
//!
//! A single server-rendered page: the roster table plus the create/edit form.
//! All mutations go through the customer resource endpoints; after any
//! successful mutation the page re-fetches the full list instead of patching
//! its local copy.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Html, routing::get, Router};
use clientele_core::config::AppConfig;
use tera::{Context, Tera};
use tracing::warn;

#[derive(Clone)]
pub struct UiState {
    templates: Arc<Tera>,
    api_base_url: String,
}

/// Initialize the Tera template engine with the management page templates.
fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/customers/**/*") {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "Failed to load customer templates from filesystem, using empty Tera instance");
            Tera::default()
        }
    };

    // Built-in fallback template in case filesystem templates are not available
    tera.add_raw_template("index.html", include_str!("../../../templates/customers/index.html"))
        .ok();

    Arc::new(tera)
}

pub fn router(config: &AppConfig) -> Router {
    let state = UiState {
        templates: init_templates(),
        api_base_url: config.server.api_base_url.clone().unwrap_or_default(),
    };

    Router::new().route("/", get(customers_page)).with_state(state)
}

async fn customers_page(
    State(state): State<UiState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut context = Context::new();
    context.insert("api_base_url", &state.api_base_url);
    context.insert(
        "branding",
        &serde_json::json!({
            "company_name": "Clientele",
        }),
    );

    let html = state.templates.render("index.html", &context).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Template Error</h1><pre>{:?}</pre>", e)),
        )
    })?;

    Ok(Html(html))
}
