//! Porta: rewrite C/C++ sources from a legacy API to a new one.
//!
//! [`PortConfig`] describes one porting job. [`FilePorter`] owns the
//! shared parse cache and runs each file through the pipeline:
//!
//! ```text
//! text ──lex──► TokenStream ──ConditionalEvaluator──► ActiveTokenSequence
//!                   │                                        │ (filter)
//!                   ├──rewrite_includes──► EditSet ─┐        ▼
//!                   └──match_tokens──────► EditSet ─┴─merge──► apply ──► output
//! ```

mod config;
mod error;
mod porter;

pub use config::{PortConfig, TokenRuleConfig};
pub use error::{ConfigError, PortError};
pub use porter::{FilePorter, PortOutcome};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the `tracing` subscriber.
///
/// Does nothing unless `RUST_LOG` is set; safe to call more than once.
/// Enable with e.g. `RUST_LOG=porta_pp=debug` or `RUST_LOG=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
