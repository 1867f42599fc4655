use leptos::prelude::*;
use martdesk_frontend::App;
use martdesk_frontend::config::AppConfig;

// Use lol_alloc as the global allocator for smaller WASM size
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

pub fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::from_env();
    martdesk_frontend::logging::init(config.log_level);
    tracing::info!(api_url = %config.api_url, "starting MartDesk");

    mount_to_body(move || view! { <App config=config.clone() /> });
}
