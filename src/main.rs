//! Review dashboard service: binary entrypoint.
//! Boots the Axum HTTP server over the library's `app()` router.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs. `RUST_LOG` wins; otherwise info, or debug for this
/// crate when `DASHBOARD_DEV_LOG=1`. `try_init` leaves an already installed
/// subscriber (e.g. the runtime's) in place.
fn init_tracing() {
    let dev_flag = std::env::var("DASHBOARD_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");
    let default = if dev_flag {
        "review_facets=debug,info"
    } else {
        "review_facets=info,warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env first so DASHBOARD_DEV_LOG can live there.
    let _ = dotenvy::dotenv();
    init_tracing();

    let router = review_facets::app().await?;
    Ok(router.into())
}
