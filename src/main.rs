#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let config = scroll_flow::config::SceneConfig::load()?;
    scroll_flow::start(config)
}

// The web build starts from the library's wasm entry point.
#[cfg(target_arch = "wasm32")]
fn main() {}
