use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::{
    connectivity::{Connectivity, PendingOperation},
    error::{Result, ZenMatError},
    screens::{
        ControlScreen, ControlView, HomeScreen, HomeView, MatMode, PlaceholderScreen,
        PlaceholderView, ProductsScreen, ProductsView, SoundsScreen, SoundsView,
    },
    types::SimulationConfig,
};

/// Tabs of the application, in tab-bar order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tab {
    /// Home/marketing screen
    Home,
    /// Mat control
    Control,
    /// Ambient sounds
    Sounds,
    /// Product catalog
    Shop,
    /// Analytics placeholder
    Stats,
    /// Firmware update placeholder
    Updates,
}

impl Tab {
    /// All tabs in tab-bar order
    pub const ALL: [Self; 6] = [
        Self::Home,
        Self::Control,
        Self::Sounds,
        Self::Shop,
        Self::Stats,
        Self::Updates,
    ];

    /// Tab-bar title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Control => "Control",
            Self::Sounds => "Sounds",
            Self::Shop => "Shop",
            Self::Stats => "Stats",
            Self::Updates => "Updates",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The showing screen together with its local selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Home screen
    Home(HomeScreen),
    /// Control screen
    Control(ControlScreen),
    /// Sounds screen
    Sounds(SoundsScreen),
    /// Shop screen
    Products(ProductsScreen),
    /// Stats or Updates
    Placeholder(PlaceholderScreen),
}

impl Screen {
    /// Fresh screen state for a tab
    #[must_use]
    pub fn fresh(tab: Tab) -> Self {
        match tab {
            Tab::Home => Self::Home(HomeScreen),
            Tab::Control => Self::Control(ControlScreen::default()),
            Tab::Sounds => Self::Sounds(SoundsScreen::default()),
            Tab::Shop => Self::Products(ProductsScreen::default()),
            Tab::Stats => Self::Placeholder(PlaceholderScreen::Analytics),
            Tab::Updates => Self::Placeholder(PlaceholderScreen::Updates),
        }
    }

    /// Tab this screen belongs to
    #[must_use]
    pub const fn tab(&self) -> Tab {
        match self {
            Self::Home(_) => Tab::Home,
            Self::Control(_) => Tab::Control,
            Self::Sounds(_) => Tab::Sounds,
            Self::Products(_) => Tab::Shop,
            Self::Placeholder(PlaceholderScreen::Analytics) => Tab::Stats,
            Self::Placeholder(PlaceholderScreen::Updates) => Tab::Updates,
        }
    }
}

/// Rendered output of whichever screen is showing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScreenView {
    /// Home screen
    Home(HomeView),
    /// Control screen
    Control(ControlView),
    /// Sounds screen
    Sounds(SoundsView),
    /// Shop screen
    Products(ProductsView),
    /// Stats or Updates
    Placeholder(PlaceholderView),
}

/// Application root
///
/// Owns the single [`Connectivity`] container and the tab navigator. Screens never
/// hold connection state themselves; they receive it from here when rendered or
/// when an action needs it. Switching tabs discards the previous screen's local
/// selection state.
///
/// # Examples
///
/// ```no_run
/// use zenmat::{ScreenView, SimulationConfig, Tab, ZenMatApp};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut app = ZenMatApp::simulated(SimulationConfig::default())?;
///
///     if let Some(pending) = app.press_connect()? {
///         let _ = pending.wait().await;
///     }
///
///     app.navigate(Tab::Control);
///     if let ScreenView::Control(view) = app.render().await {
///         println!("{view:?}");
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ZenMatApp {
    connectivity: Connectivity,
    screen: Screen,
}

impl ZenMatApp {
    /// Create the application around a connectivity container, showing Home
    #[must_use]
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            screen: Screen::fresh(Tab::Home),
        }
    }

    /// Create the application with a simulated mat
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::InvalidParameters`] if the configuration is invalid.
    pub fn simulated(config: SimulationConfig) -> Result<Self> {
        Ok(Self::new(Connectivity::simulated(config)?))
    }

    /// Connectivity container shared with the screens
    #[must_use]
    pub const fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Screen currently showing
    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Tab currently showing
    #[must_use]
    pub const fn active_tab(&self) -> Tab {
        self.screen.tab()
    }

    /// Switch tabs
    ///
    /// Selecting the tab already showing keeps its state; any other tab starts
    /// fresh.
    pub fn navigate(&mut self, tab: Tab) {
        if self.active_tab() == tab {
            return;
        }
        info!("Navigating {} -> {}", self.active_tab(), tab);
        self.screen = Screen::fresh(tab);
    }

    /// Home "Start Your Practice" button
    pub fn start_practice(&mut self) {
        self.navigate(Tab::Control);
    }

    /// Control "Go to Connect" button
    pub fn go_to_connect(&mut self) {
        self.navigate(Tab::Home);
    }

    /// Home connect/disconnect button
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::ScreenInactive`] unless Home is showing.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn press_connect(&self) -> Result<Option<PendingOperation>> {
        match &self.screen {
            Screen::Home(home) => Ok(home.press_connect(&self.connectivity)),
            _ => Err(ZenMatError::ScreenInactive(Tab::Home.title())),
        }
    }

    /// Control screen state, if showing
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::ScreenInactive`] unless Control is showing.
    pub fn control_mut(&mut self) -> Result<&mut ControlScreen> {
        match &mut self.screen {
            Screen::Control(control) => Ok(control),
            _ => Err(ZenMatError::ScreenInactive(Tab::Control.title())),
        }
    }

    /// Sounds screen state, if showing
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::ScreenInactive`] unless Sounds is showing.
    pub fn sounds_mut(&mut self) -> Result<&mut SoundsScreen> {
        match &mut self.screen {
            Screen::Sounds(sounds) => Ok(sounds),
            _ => Err(ZenMatError::ScreenInactive(Tab::Sounds.title())),
        }
    }

    /// Shop screen state, if showing
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::ScreenInactive`] unless Shop is showing.
    pub fn products_mut(&mut self) -> Result<&mut ProductsScreen> {
        match &mut self.screen {
            Screen::Products(products) => Ok(products),
            _ => Err(ZenMatError::ScreenInactive(Tab::Shop.title())),
        }
    }

    /// Toggle a mat mode on the control screen
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::ScreenInactive`] unless Control is showing, or
    /// [`ZenMatError::NotConnected`] if the mat is not connected.
    pub fn toggle_mode(&mut self, mode: MatMode) -> Result<Option<MatMode>> {
        let state = self.connectivity.state();
        self.control_mut()?.toggle_mode(mode, &state)
    }

    /// Render the showing screen against the current connection state
    pub async fn render(&self) -> ScreenView {
        let state = self.connectivity.state();
        match &self.screen {
            Screen::Home(home) => ScreenView::Home(home.view(&state)),
            Screen::Control(control) => {
                let telemetry = self.connectivity.telemetry().await.ok();
                ScreenView::Control(control.view(&state, telemetry))
            }
            Screen::Sounds(sounds) => ScreenView::Sounds(sounds.view()),
            Screen::Products(products) => ScreenView::Products(products.view()),
            Screen::Placeholder(placeholder) => ScreenView::Placeholder(placeholder.view()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{CategoryFilter, SoundCategory},
        provider::SimulatedProvider,
        screens::{ControlBody, VolumeLevel},
        types::ConnectionStatus,
    };

    fn app() -> ZenMatApp {
        ZenMatApp::new(Connectivity::new(SimulatedProvider::always_succeed(
            SimulationConfig::default(),
        )))
    }

    #[test]
    fn test_tab_order() {
        let titles: Vec<_> = Tab::ALL.iter().map(|t| t.title()).collect();
        assert_eq!(
            titles,
            vec!["Home", "Control", "Sounds", "Shop", "Stats", "Updates"]
        );
        for tab in Tab::ALL {
            assert_eq!(Screen::fresh(tab).tab(), tab);
        }
    }

    #[test]
    fn test_navigation_resets_screen_state() {
        let mut app = app();
        assert_eq!(app.active_tab(), Tab::Home);

        app.navigate(Tab::Sounds);
        {
            let sounds = app.sounds_mut().unwrap();
            sounds.select_category(CategoryFilter::Only(SoundCategory::Meditation));
            sounds.toggle_play("3").unwrap();
            sounds.cycle_volume();
        }

        app.navigate(Tab::Sounds);
        assert!(app.sounds_mut().unwrap().playing().is_some());

        app.navigate(Tab::Shop);
        app.navigate(Tab::Sounds);
        let sounds = app.sounds_mut().unwrap();
        assert!(sounds.playing().is_none());
        assert_eq!(sounds.filter(), CategoryFilter::All);
        assert_eq!(sounds.volume(), VolumeLevel::High);
    }

    #[test]
    fn test_actions_require_their_screen() {
        let mut app = app();
        assert!(matches!(
            app.sounds_mut(),
            Err(ZenMatError::ScreenInactive("Sounds"))
        ));
        assert!(matches!(
            app.toggle_mode(MatMode::WarmUp),
            Err(ZenMatError::ScreenInactive("Control"))
        ));

        app.start_practice();
        assert_eq!(app.active_tab(), Tab::Control);
        assert!(matches!(
            app.toggle_mode(MatMode::WarmUp),
            Err(ZenMatError::NotConnected)
        ));

        app.go_to_connect();
        assert_eq!(app.active_tab(), Tab::Home);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_from_home_then_control() {
        let mut app = app();

        let pending = app.press_connect().unwrap().unwrap();
        if let ScreenView::Home(view) = app.render().await {
            assert!(view.connect_button.loading);
        } else {
            panic!("expected home view");
        }
        assert!(app.press_connect().unwrap().is_none());

        pending.wait().await.unwrap();
        assert_eq!(app.connectivity().status(), ConnectionStatus::Connected);

        app.start_practice();
        assert_eq!(
            app.toggle_mode(MatMode::Relaxation).unwrap(),
            Some(MatMode::Relaxation)
        );

        let ScreenView::Control(view) = app.render().await else {
            panic!("expected control view");
        };
        let ControlBody::Connected {
            details, mat_label, ..
        } = view.body
        else {
            panic!("expected connected body");
        };
        assert_eq!(details.len(), 2);
        assert_eq!(mat_label, "Relaxation Mode");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_from_home() {
        let mut app = app();
        app.connectivity().connect().await.unwrap();

        app.navigate(Tab::Home);
        let pending = app.press_connect().unwrap().unwrap();
        pending.wait().await.unwrap();

        assert_eq!(app.connectivity().status(), ConnectionStatus::Disconnected);
        let ScreenView::Home(view) = app.render().await else {
            panic!("expected home view");
        };
        assert_eq!(view.connect_button.label, "Connect to Mat");
        assert!(!view.connected_badge);
    }

    #[tokio::test]
    async fn test_render_placeholders() {
        let mut app = app();
        app.navigate(Tab::Updates);
        let ScreenView::Placeholder(view) = app.render().await else {
            panic!("expected placeholder view");
        };
        assert_eq!(view.title, "Updates");
    }
}
