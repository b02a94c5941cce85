use std::time::Instant;

/// Milliseconds elapsed since `start`, keeping the fractional part.
pub fn elapsed_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}
