//! Compiled-in reference data: shop products, ambient sounds and home-screen
//! feature cards. Nothing here is ever mutated.

use serde::Serialize;
use std::{fmt, time::Duration};

use crate::error::{Result, ZenMatError};

/// Shop product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProductCategory {
    /// Smart yoga mats
    Mats,
    /// Straps, blocks, cleaners
    Accessories,
    /// Clothing
    Apparel,
}

impl ProductCategory {
    /// All categories in display order
    pub const ALL: [Self; 3] = [Self::Mats, Self::Accessories, Self::Apparel];
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mats => write!(f, "Mats"),
            Self::Accessories => write!(f, "Accessories"),
            Self::Apparel => write!(f, "Apparel"),
        }
    }
}

/// Ambient sound category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundCategory {
    /// Field recordings
    Nature,
    /// Guided and meditative audio
    Meditation,
    /// Synthesized soundscapes
    Ambient,
}

impl SoundCategory {
    /// All categories in display order
    pub const ALL: [Self; 3] = [Self::Nature, Self::Meditation, Self::Ambient];
}

impl fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nature => write!(f, "Nature"),
            Self::Meditation => write!(f, "Meditation"),
            Self::Ambient => write!(f, "Ambient"),
        }
    }
}

/// Category selection: everything, or a single category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CategoryFilter<C> {
    /// No filtering
    All,
    /// Only entries of this category
    Only(C),
}

impl<C> Default for CategoryFilter<C> {
    fn default() -> Self {
        Self::All
    }
}

impl<C: PartialEq> CategoryFilter<C> {
    /// Check if an entry of `category` passes the filter
    pub fn admits(&self, category: &C) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }
}

/// Shop product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Catalog identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Price in US dollars
    pub price: f64,
    /// Product image reference
    pub image_url: &'static str,
    /// Average review rating out of 5
    pub rating: f32,
    /// Shown under "New Arrivals"
    pub is_new: bool,
    /// Category tag
    pub category: ProductCategory,
}

impl Product {
    /// Price formatted for display, e.g. `$149.99`
    #[must_use]
    pub fn price_label(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// Ambient sound track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sound {
    /// Catalog identifier
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
    /// Category tag
    pub category: SoundCategory,
    /// Cover image reference
    pub image_url: &'static str,
    /// Track length
    pub duration: Duration,
}

impl Sound {
    /// Duration formatted as `m:ss`
    #[must_use]
    pub fn duration_label(&self) -> String {
        let secs = self.duration.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Icon shown next to a feature card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeatureIcon {
    /// Pulse line
    Activity,
    /// Sparkles
    Sparkles,
    /// Bar chart
    BarChart,
    /// Bluetooth rune
    Bluetooth,
}

/// Home-screen feature card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    /// Card title
    pub title: &'static str,
    /// Card body
    pub description: &'static str,
    /// Card icon
    pub icon: FeatureIcon,
}

/// Base URL of the online store
pub const STORE_URL: &str = "https://example.com/store";

/// Products offered in the shop
pub static PRODUCTS: &[Product] = &[
    Product {
        id: "1",
        name: "ZenMat Pro",
        description: "Our premium smart yoga mat with 1000+ sensors and LED guidance system",
        price: 149.99,
        image_url: "https://images.pexels.com/photos/4056535/pexels-photo-4056535.jpeg",
        rating: 4.8,
        is_new: true,
        category: ProductCategory::Mats,
    },
    Product {
        id: "2",
        name: "ZenMat Travel",
        description: "Portable, foldable smart yoga mat with basic pressure sensing",
        price: 89.99,
        image_url: "https://images.pexels.com/photos/4498482/pexels-photo-4498482.jpeg",
        rating: 4.6,
        is_new: false,
        category: ProductCategory::Mats,
    },
    Product {
        id: "3",
        name: "Mat Carry Strap",
        description: "Adjustable cotton strap for easy mat transport",
        price: 19.99,
        image_url: "https://images.pexels.com/photos/4662438/pexels-photo-4662438.jpeg",
        rating: 4.5,
        is_new: false,
        category: ProductCategory::Accessories,
    },
    Product {
        id: "4",
        name: "ZenMat Cleaner Spray",
        description: "Natural, antibacterial spray specially formulated for smart mats",
        price: 12.99,
        image_url: "https://images.pexels.com/photos/5578218/pexels-photo-5578218.jpeg",
        rating: 4.7,
        is_new: true,
        category: ProductCategory::Accessories,
    },
    Product {
        id: "5",
        name: "Bamboo Yoga Blocks (2)",
        description: "Eco-friendly yoga blocks made from sustainable bamboo",
        price: 29.99,
        image_url: "https://images.pexels.com/photos/4325462/pexels-photo-4325462.jpeg",
        rating: 4.9,
        is_new: false,
        category: ProductCategory::Accessories,
    },
    Product {
        id: "6",
        name: "ZenFlow Yoga Pants",
        description: "High-performance, breathable yoga pants with phone pocket",
        price: 49.99,
        image_url: "https://images.pexels.com/photos/4662356/pexels-photo-4662356.jpeg",
        rating: 4.7,
        is_new: true,
        category: ProductCategory::Apparel,
    },
];

/// Ambient sound library
pub static SOUNDS: &[Sound] = &[
    Sound {
        id: "1",
        title: "Ocean Waves",
        category: SoundCategory::Nature,
        image_url: "https://images.pexels.com/photos/1295138/pexels-photo-1295138.jpeg",
        duration: Duration::from_secs(10 * 60),
    },
    Sound {
        id: "2",
        title: "Forest Ambience",
        category: SoundCategory::Nature,
        image_url:
            "https://images.pexels.com/photos/957024/forest-trees-perspective-bright-957024.jpeg",
        duration: Duration::from_secs(15 * 60),
    },
    Sound {
        id: "3",
        title: "Guided Breathing",
        category: SoundCategory::Meditation,
        image_url: "https://images.pexels.com/photos/3822864/pexels-photo-3822864.jpeg",
        duration: Duration::from_secs(8 * 60),
    },
    Sound {
        id: "4",
        title: "Tibetan Singing Bowls",
        category: SoundCategory::Meditation,
        image_url: "https://images.pexels.com/photos/8964880/pexels-photo-8964880.jpeg",
        duration: Duration::from_secs(12 * 60),
    },
    Sound {
        id: "5",
        title: "Gentle Rain",
        category: SoundCategory::Nature,
        image_url: "https://images.pexels.com/photos/125510/pexels-photo-125510.jpeg",
        duration: Duration::from_secs(20 * 60),
    },
    Sound {
        id: "6",
        title: "Ambient Synthesizer",
        category: SoundCategory::Ambient,
        image_url: "https://images.pexels.com/photos/4571219/pexels-photo-4571219.jpeg",
        duration: Duration::from_secs(18 * 60),
    },
];

/// Feature cards on the home screen
pub static FEATURES: &[Feature] = &[
    Feature {
        title: "Pressure Sensing",
        description: "Real-time posture feedback with 1,000+ pressure sensors",
        icon: FeatureIcon::Activity,
    },
    Feature {
        title: "Guided Sessions",
        description: "Follow personalized yoga routines with interactive LEDs",
        icon: FeatureIcon::Sparkles,
    },
    Feature {
        title: "Progress Tracking",
        description: "Monitor your yoga journey with detailed analytics",
        icon: FeatureIcon::BarChart,
    },
];

/// Look up a product by id
///
/// # Errors
///
/// Returns [`ZenMatError::NotFound`] if no product has this id.
pub fn product(id: &str) -> Result<&'static Product> {
    PRODUCTS
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| ZenMatError::NotFound {
            kind: "product",
            id: id.to_string(),
        })
}

/// Look up a sound by id
///
/// # Errors
///
/// Returns [`ZenMatError::NotFound`] if no sound has this id.
pub fn sound(id: &str) -> Result<&'static Sound> {
    SOUNDS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| ZenMatError::NotFound {
            kind: "sound",
            id: id.to_string(),
        })
}

/// Products passing a category filter, in catalog order
pub fn products_in(
    filter: CategoryFilter<ProductCategory>,
) -> impl Iterator<Item = &'static Product> {
    PRODUCTS.iter().filter(move |p| filter.admits(&p.category))
}

/// Products flagged as new arrivals
pub fn new_arrivals() -> impl Iterator<Item = &'static Product> {
    PRODUCTS.iter().filter(|p| p.is_new)
}

/// Sounds passing a category filter, in catalog order
pub fn sounds_in(filter: CategoryFilter<SoundCategory>) -> impl Iterator<Item = &'static Sound> {
    SOUNDS.iter().filter(move |s| filter.admits(&s.category))
}
