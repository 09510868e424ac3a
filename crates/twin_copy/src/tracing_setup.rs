use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tree-shaped tracing subscriber for debugging copies.
///
/// Safe to call multiple times. Only installs anything when `RUST_LOG` is
/// set, e.g. `RUST_LOG=twin_copy=trace` to see every resolved value nested
/// under the object that referenced it.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            // Another subscriber may already be installed (e.g. by a test
            // harness); keep it.
            let _ = tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .try_init();
        }
    });
}
