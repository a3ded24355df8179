use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Library events log under `medical_centers_etl`, the binary's under `medical_centers`.
fn filter_directives(verbose: bool) -> &'static str {
    if verbose {
        "medical_centers_etl=debug,medical_centers=debug,info"
    } else {
        "medical_centers_etl=info,medical_centers=info"
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines for unattended (cron / container) runs where logs are shipped elsewhere.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_covers_library_and_binary_targets() {
        for verbose in [false, true] {
            let directives: Vec<&str> = filter_directives(verbose).split(',').collect();
            let level = if verbose { "debug" } else { "info" };

            assert!(directives.contains(&format!("medical_centers_etl={}", level).as_str()));
            assert!(directives.contains(&format!("medical_centers={}", level).as_str()));
            assert!(filter_directives(verbose).parse::<EnvFilter>().is_ok());
        }
    }
}
