//! Logger setup for the host application.

/// Install the platform logger. Safe to call more than once.
///
/// Native builds use `env_logger` (filter with `RUST_LOG`, default `info`);
/// WASM builds log to the browser console and route panics there too.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
