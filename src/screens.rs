use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::{
    catalog::{
        self, CategoryFilter, Feature, Product, ProductCategory, Sound, SoundCategory, FEATURES,
        STORE_URL,
    },
    connectivity::{Connectivity, PendingOperation},
    error::{Result, ZenMatError},
    types::{ConnectionState, ConnectionStatus, MatTelemetry},
};

/// Selectable chip in a category bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChip<C> {
    /// Chip label
    pub label: String,
    /// Filter applied when the chip is pressed
    pub filter: CategoryFilter<C>,
    /// Whether this chip is the current selection
    pub active: bool,
}

fn category_chips<C>(
    all_label: &str,
    categories: [C; 3],
    selected: CategoryFilter<C>,
) -> Vec<CategoryChip<C>>
where
    C: Copy + PartialEq + fmt::Display,
{
    std::iter::once(CategoryFilter::All)
        .chain(categories.into_iter().map(CategoryFilter::Only))
        .map(|filter| CategoryChip {
            label: match filter {
                CategoryFilter::All => all_label.to_string(),
                CategoryFilter::Only(category) => category.to_string(),
            },
            filter,
            active: filter == selected,
        })
        .collect()
}

// ── Home ─────────────────────────────────────────────────────────

/// Label and affordance of the connect button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectButtonView {
    /// Button label
    pub label: &'static str,
    /// Show a spinner instead of the label
    pub loading: bool,
    /// Whether pressing is currently ignored
    pub disabled: bool,
}

impl ConnectButtonView {
    /// Button for a connection status
    #[must_use]
    pub const fn for_status(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Disconnected => Self {
                label: "Connect to Mat",
                loading: false,
                disabled: false,
            },
            ConnectionStatus::Connecting => Self {
                label: "Connecting...",
                loading: true,
                disabled: true,
            },
            ConnectionStatus::Connected => Self {
                label: "Disconnect",
                loading: false,
                disabled: false,
            },
        }
    }
}

/// Rendered home screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
    /// Collapsing header title
    pub header_title: &'static str,
    /// Show the "Connected" indicator in the header
    pub connected_badge: bool,
    /// Hero title
    pub hero_title: &'static str,
    /// Hero subtitle
    pub hero_subtitle: &'static str,
    /// Connect/disconnect button
    pub connect_button: ConnectButtonView,
    /// Last connection error, if any
    pub error: Option<String>,
    /// Feature section heading
    pub features_title: &'static str,
    /// Feature cards
    pub features: &'static [Feature],
    /// Label of the button that opens the control tab
    pub start_practice_label: &'static str,
    /// Footer information
    pub info_text: &'static str,
}

/// Home/marketing screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomeScreen;

impl HomeScreen {
    /// Render the screen for a connection state
    #[must_use]
    pub fn view(&self, state: &ConnectionState) -> HomeView {
        HomeView {
            header_title: "ZenMat Smart Yoga",
            connected_badge: state.is_connected(),
            hero_title: "ZenMat",
            hero_subtitle: "Smart Yoga Experience",
            connect_button: ConnectButtonView::for_status(state.status),
            error: state.last_error.clone(),
            features_title: "Smart Features",
            features: FEATURES,
            start_practice_label: "Start Your Practice",
            info_text: "Connect your ZenMat to access all smart features. \
                        The mat requires Bluetooth 5.0 or higher.",
        }
    }

    /// Handle a press of the connect button
    ///
    /// Disconnects when connected, connects otherwise. Returns `None` while an
    /// operation is already in flight, as the button is disabled then.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn press_connect(&self, connectivity: &Connectivity) -> Option<PendingOperation> {
        match connectivity.status() {
            ConnectionStatus::Connecting => {
                debug!("Connect button pressed while busy; ignoring");
                None
            }
            ConnectionStatus::Connected => Some(connectivity.begin_disconnect()),
            ConnectionStatus::Disconnected => Some(connectivity.begin_connect()),
        }
    }
}

// ── Control ──────────────────────────────────────────────────────

/// Mat programs available on the control screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatMode {
    /// Gentle heating before practice
    WarmUp,
    /// Subtle vibration patterns
    Relaxation,
}

impl MatMode {
    /// All modes in display order
    pub const ALL: [Self; 2] = [Self::WarmUp, Self::Relaxation];

    /// Button label when the mode is off
    #[must_use]
    pub const fn start_label(self) -> &'static str {
        match self {
            Self::WarmUp => "Start Warm-Up",
            Self::Relaxation => "Begin Relaxation",
        }
    }

    /// Button label when the mode is running
    #[must_use]
    pub const fn stop_label(self) -> &'static str {
        match self {
            Self::WarmUp => "Stop Warm-Up",
            Self::Relaxation => "Stop Relaxation",
        }
    }

    /// What the mode does
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::WarmUp => "Gentle heating to prepare your muscles for yoga",
            Self::Relaxation => "Subtle vibration patterns for deep relaxation",
        }
    }
}

impl fmt::Display for MatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WarmUp => write!(f, "Warm-Up Mode"),
            Self::Relaxation => write!(f, "Relaxation Mode"),
        }
    }
}

/// Mode button on the control screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeButtonView {
    /// Mode toggled by the button
    pub mode: MatMode,
    /// Button label
    pub label: &'static str,
    /// Description under the label
    pub description: &'static str,
    /// Whether the mode is running
    pub active: bool,
}

/// Body of the control screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ControlBody {
    /// Mat is not connected
    NotConnected {
        /// Prompt text
        message: &'static str,
        /// Label of the button leading to the home tab
        action_label: &'static str,
    },
    /// Mat is connected
    Connected {
        /// Status line
        status_line: &'static str,
        /// Link details such as signal and battery
        details: Vec<String>,
        /// Label in the middle of the mat graphic
        mat_label: String,
        /// Whether the mat graphic pulses
        animating: bool,
        /// Mode buttons
        modes: Vec<ModeButtonView>,
        /// Usage tips
        tips: &'static [&'static str],
    },
}

/// Rendered control screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlView {
    /// Screen title
    pub title: &'static str,
    /// Screen body
    pub body: ControlBody,
}

const CONTROL_TIPS: &[&str] = &[
    "For Warm-Up: Place mat on a flat surface and allow 5 minutes to reach optimal temperature.",
    "For Relaxation: Use with our companion sound packs for a fully immersive experience.",
];

/// Device control screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlScreen {
    active_mode: Option<MatMode>,
}

impl ControlScreen {
    /// Currently running mode
    #[must_use]
    pub const fn active_mode(&self) -> Option<MatMode> {
        self.active_mode
    }

    /// Toggle a mat mode
    ///
    /// Pressing the running mode turns it off; pressing the other mode switches to
    /// it. Returns the mode running afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::NotConnected`] unless the mat is connected.
    pub fn toggle_mode(
        &mut self,
        mode: MatMode,
        state: &ConnectionState,
    ) -> Result<Option<MatMode>> {
        if !state.is_connected() {
            return Err(ZenMatError::NotConnected);
        }

        self.active_mode = if self.active_mode == Some(mode) {
            None
        } else {
            Some(mode)
        };

        match self.active_mode {
            Some(mode) => info!("Mat mode started: {}", mode),
            None => info!("Mat mode stopped"),
        }
        Ok(self.active_mode)
    }

    /// Render the screen
    #[must_use]
    pub fn view(&self, state: &ConnectionState, telemetry: Option<MatTelemetry>) -> ControlView {
        let body = if state.is_connected() {
            let details = telemetry
                .map(|t| {
                    vec![
                        format!("Bluetooth signal strength: {}", t.signal),
                        format!("Battery: {}%", t.battery_percent),
                    ]
                })
                .unwrap_or_default();

            ControlBody::Connected {
                status_line: "Connected to ZenMat",
                details,
                mat_label: self
                    .active_mode
                    .map_or_else(|| "Ready".to_string(), |mode| mode.to_string()),
                animating: self.active_mode.is_some(),
                modes: MatMode::ALL
                    .into_iter()
                    .map(|mode| {
                        let active = self.active_mode == Some(mode);
                        ModeButtonView {
                            mode,
                            label: if active {
                                mode.stop_label()
                            } else {
                                mode.start_label()
                            },
                            description: mode.description(),
                            active,
                        }
                    })
                    .collect(),
                tips: CONTROL_TIPS,
            }
        } else {
            ControlBody::NotConnected {
                message: "Please connect to your ZenMat first",
                action_label: "Go to Connect",
            }
        };

        ControlView {
            title: "Mat Control",
            body,
        }
    }
}

// ── Sounds ───────────────────────────────────────────────────────

/// Player volume step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VolumeLevel {
    /// Silent
    Muted,
    /// Quiet
    Low,
    /// Full
    #[default]
    High,
}

impl VolumeLevel {
    /// Next step when the volume button is pressed
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Muted => Self::Low,
            Self::Low => Self::High,
            Self::High => Self::Muted,
        }
    }
}

/// Track row in the sound list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackView {
    /// Catalog identifier
    pub id: &'static str,
    /// Track title
    pub title: &'static str,
    /// Formatted duration
    pub duration: String,
    /// Cover image reference
    pub image_url: &'static str,
    /// Whether this track is playing
    pub playing: bool,
}

/// Bar shown at the bottom while a track plays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlayingView {
    /// Track title
    pub title: &'static str,
    /// Track category
    pub category: SoundCategory,
    /// Player volume
    pub volume: VolumeLevel,
}

/// Rendered sounds screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoundsView {
    /// Screen title
    pub title: &'static str,
    /// Category bar
    pub categories: Vec<CategoryChip<SoundCategory>>,
    /// Tracks passing the filter
    pub tracks: Vec<TrackView>,
    /// Now-playing bar
    pub now_playing: Option<NowPlayingView>,
}

/// Ambient sound player
///
/// Playback is a selection only: no audio is decoded or played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoundsScreen {
    filter: CategoryFilter<SoundCategory>,
    playing: Option<&'static Sound>,
    volume: VolumeLevel,
}

impl SoundsScreen {
    /// Current category filter
    #[must_use]
    pub const fn filter(&self) -> CategoryFilter<SoundCategory> {
        self.filter
    }

    /// Track currently playing
    #[must_use]
    pub const fn playing(&self) -> Option<&'static Sound> {
        self.playing
    }

    /// Current volume
    #[must_use]
    pub const fn volume(&self) -> VolumeLevel {
        self.volume
    }

    /// Change the category filter; the playing track keeps playing
    pub fn select_category(&mut self, filter: CategoryFilter<SoundCategory>) {
        self.filter = filter;
    }

    /// Play a track, or stop it if it is the one playing
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::NotFound`] if no sound has this id.
    pub fn toggle_play(&mut self, id: &str) -> Result<Option<&'static Sound>> {
        let sound = catalog::sound(id)?;
        self.playing = match self.playing {
            Some(current) if current.id == sound.id => None,
            _ => Some(sound),
        };

        match self.playing {
            Some(sound) => info!("Playing \"{}\"", sound.title),
            None => info!("Playback stopped"),
        }
        Ok(self.playing)
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.playing = None;
    }

    /// Step the volume and return the new level
    pub fn cycle_volume(&mut self) -> VolumeLevel {
        self.volume = self.volume.next();
        self.volume
    }

    /// Render the screen
    #[must_use]
    pub fn view(&self) -> SoundsView {
        SoundsView {
            title: "Sounds & Music",
            categories: category_chips("All", SoundCategory::ALL, self.filter),
            tracks: catalog::sounds_in(self.filter)
                .map(|sound| TrackView {
                    id: sound.id,
                    title: sound.title,
                    duration: sound.duration_label(),
                    image_url: sound.image_url,
                    playing: self.playing.is_some_and(|p| p.id == sound.id),
                })
                .collect(),
            now_playing: self.playing.map(|sound| NowPlayingView {
                title: sound.title,
                category: sound.category,
                volume: self.volume,
            }),
        }
    }
}

// ── Products ─────────────────────────────────────────────────────

/// Product tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    /// Catalog identifier
    pub id: &'static str,
    /// Product name
    pub name: &'static str,
    /// Product description
    pub description: &'static str,
    /// Formatted price
    pub price: String,
    /// Review rating
    pub rating: f32,
    /// Product image reference
    pub image_url: &'static str,
    /// Show the NEW badge
    pub is_new: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price_label(),
            rating: product.rating,
            image_url: product.image_url,
            is_new: product.is_new,
        }
    }
}

/// Outbound link to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreLink {
    /// Link text
    pub label: String,
    /// Target URL
    pub url: String,
}

/// Rendered shop screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsView {
    /// Screen title
    pub title: &'static str,
    /// "New Arrivals" carousel, independent of the filter
    pub new_arrivals: Vec<ProductCard>,
    /// Category bar
    pub categories: Vec<CategoryChip<ProductCategory>>,
    /// Products passing the filter
    pub products: Vec<ProductCard>,
    /// Label of the per-product buy button
    pub buy_label: &'static str,
    /// Banner linking to the full store
    pub store_link: StoreLink,
}

/// Product catalog ("Shop") screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductsScreen {
    filter: CategoryFilter<ProductCategory>,
}

impl ProductsScreen {
    /// Current category filter
    #[must_use]
    pub const fn filter(&self) -> CategoryFilter<ProductCategory> {
        self.filter
    }

    /// Change the category filter
    pub fn select_category(&mut self, filter: CategoryFilter<ProductCategory>) {
        self.filter = filter;
    }

    /// Open a product in the store
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::NotFound`] if no product has this id.
    pub fn open_product(&self, id: &str) -> Result<StoreLink> {
        let product = catalog::product(id)?;
        info!("Opening product {} in store", product.id);
        Ok(StoreLink {
            label: format!("Opening product {} in store", product.id),
            url: format!("{STORE_URL}/products/{}", product.id),
        })
    }

    /// Render the screen
    #[must_use]
    pub fn view(&self) -> ProductsView {
        ProductsView {
            title: "Shop",
            new_arrivals: catalog::new_arrivals().map(ProductCard::from).collect(),
            categories: category_chips("All Products", ProductCategory::ALL, self.filter),
            products: catalog::products_in(self.filter)
                .map(ProductCard::from)
                .collect(),
            buy_label: "Add to Cart",
            store_link: StoreLink {
                label: "Visit our full online store".to_string(),
                url: STORE_URL.to_string(),
            },
        }
    }
}

// ── Placeholders ─────────────────────────────────────────────────

/// Rendered placeholder screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderView {
    /// Screen title
    pub title: &'static str,
    /// Body text
    pub message: &'static str,
}

/// Screens that exist in the tab bar but have no functionality yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderScreen {
    /// Practice analytics
    Analytics,
    /// Mat firmware updates
    Updates,
}

impl PlaceholderScreen {
    /// Render the screen
    #[must_use]
    pub const fn view(&self) -> PlaceholderView {
        match self {
            Self::Analytics => PlaceholderView {
                title: "Stats",
                message: "Practice analytics are coming soon.",
            },
            Self::Updates => PlaceholderView {
                title: "Updates",
                message: "Firmware updates for your ZenMat are coming soon.",
            },
        }
    }
}
