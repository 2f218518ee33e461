use tracing::info;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize logging for the terminal binary.
///
/// Logs go to stderr so table output on stdout stays pipeable.
pub fn init_logger() -> anyhow::Result<()> {
    let format_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(std::io::stderr)
        .compact();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stockkpi=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(format_layer)
        .try_init()?;

    Ok(())
}

/// Performance timing helper
pub struct Timer {
    start: std::time::Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        Self {
            start: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    pub fn log_elapsed(&self) {
        info!("{} completed in {:.1}ms", self.name, self.elapsed_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_measures_forward() {
        let timer = Timer::start("noop");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed_ms() >= 2.0);
        assert!(timer.elapsed() >= std::time::Duration::from_millis(2));
    }
}
