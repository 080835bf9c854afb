use std::fmt::Display;

/// Outcome of mounting one canvas. A failure only affects that canvas; it is
/// logged and the caller moves on to the next one.
pub fn settle<T, E: Display>(canvas_id: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(mounted) => Some(mounted),
        Err(e) => {
            log::error!("#{canvas_id} not mounted: {e:#}");
            None
        }
    }
}
