//! Logging that reaches both the browser console and `tracing` subscribers.

pub fn info(message: &str) {
    tracing::info!("{message}");
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&message.into());
}

pub fn warn(message: &str) {
    tracing::warn!("{message}");
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
}

/// Debug-level events stay out of the browser console.
pub fn debug(message: &str) {
    tracing::debug!("{message}");
}
