use tracing::{info, warn};
use zenmat::{
    catalog::{CategoryFilter, ProductCategory, SoundCategory},
    screens::{ControlBody, MatMode},
    Result, ScreenView, SimulationConfig, Tab, ZenMatApp,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🧘 ZenMat App Tour Example");

    // Guarantee a successful handshake so the tour can reach the control screen
    let config = SimulationConfig {
        success_probability: 1.0,
        ..SimulationConfig::default()
    };
    let mut app = ZenMatApp::simulated(config)?;

    if let ScreenView::Home(home) = app.render().await {
        info!("🏠 {}", home.header_title);
        for feature in home.features {
            info!("  • {}: {}", feature.title, feature.description);
        }
        info!("  [{}]", home.connect_button.label);
    }

    info!("🔗 Pressing connect...");
    if let Some(pending) = app.press_connect()? {
        if let Err(e) = pending.wait().await {
            warn!("❌ {}", e.user_message());
        }
    }

    app.start_practice();
    if app.toggle_mode(MatMode::WarmUp).is_ok() {
        info!("🔥 Warm-up started");
    }
    if let ScreenView::Control(control) = app.render().await {
        info!("🎛️  {}", control.title);
        match control.body {
            ControlBody::Connected {
                details, mat_label, ..
            } => {
                for line in details {
                    info!("  {}", line);
                }
                info!("  Mat: {}", mat_label);
            }
            ControlBody::NotConnected { message, .. } => warn!("  {}", message),
        }
    }

    app.navigate(Tab::Sounds);
    {
        let sounds = app.sounds_mut()?;
        sounds.select_category(CategoryFilter::Only(SoundCategory::Nature));
        if let Some(sound) = sounds.toggle_play("2")? {
            info!("🎵 Now playing: {} ({})", sound.title, sound.duration_label());
        }
        info!("🔊 Volume: {:?}", sounds.cycle_volume());
    }

    app.navigate(Tab::Shop);
    {
        let shop = app.products_mut()?;
        shop.select_category(CategoryFilter::Only(ProductCategory::Mats));
        let link = shop.open_product("1")?;
        info!("🛒 {} -> {}", link.label, link.url);
    }
    if let ScreenView::Products(products) = app.render().await {
        for card in products.products {
            info!("  {} {}", card.name, card.price);
        }
    }

    for tab in [Tab::Stats, Tab::Updates] {
        app.navigate(tab);
        if let ScreenView::Placeholder(view) = app.render().await {
            info!("📋 {}: {}", view.title, view.message);
        }
    }

    app.go_to_connect();
    if let Some(pending) = app.press_connect()? {
        pending.wait().await?;
    }
    info!("🔌 Status: {}", app.connectivity().status());

    info!("🎉 App tour example completed!");
    Ok(())
}
