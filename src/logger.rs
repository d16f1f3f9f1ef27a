use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs an env_logger backend at Info level. `RUST_LOG` overrides the
/// defaults, e.g. `RUST_LOG=probing_buckets=debug` to see table growth.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder: Builder = Builder::new();

        builder
            .filter_level(LevelFilter::Info)
            .filter_module("probing_buckets", LevelFilter::Info)
            .format_timestamp_millis()
            .parse_default_env();

        // another backend may already be installed
        let _ = builder.try_init();
    });
}

#[cfg(test)]
mod tests {
    use log::{debug, info};

    use super::*;

    #[test]
    fn test_initialize_twice() {
        initialize_logger();
        initialize_logger();
        debug!("debug message in test");
        info!("info message in test");
    }
}
