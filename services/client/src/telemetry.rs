use tracing::Level;

/// Installs the global `tracing` subscriber for a presentation layer embedding
/// the client.
///
/// Returns `false` if a subscriber was already installed, which is harmless
/// (tests and hosts with their own subscriber hit this).
pub fn init_tracing(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_tracing(Level::DEBUG);
        assert!(!init_tracing(Level::INFO));
    }
}
