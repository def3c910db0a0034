//! Emoji token selection.
//!
//! Icons are grouped into themed categories; an addition problem shows two
//! different icons from one category so the operands read as related things
//! (two kinds of animals, two kinds of fruit), a subtraction shows a single icon.
//! Randomness comes through [`RandomSource`] so tests can pin the choice.
use crate::layout::{Group, Operator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconCategory {
    Animals,
    Furniture,
    Vehicles,
    Planets,
    Food,
    Nature,
    Toys,
    Sports,
}

impl IconCategory {
    pub const ALL: [IconCategory; 8] = [
        IconCategory::Animals,
        IconCategory::Furniture,
        IconCategory::Vehicles,
        IconCategory::Planets,
        IconCategory::Food,
        IconCategory::Nature,
        IconCategory::Toys,
        IconCategory::Sports,
    ];

    pub fn icons(self) -> &'static [&'static str] {
        match self {
            IconCategory::Animals => &[
                "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵",
            ],
            IconCategory::Furniture => &["🛋️", "🪑", "🛏️", "🚪", "🪟", "🪞", "💡", "🖼️"],
            IconCategory::Vehicles => &[
                "🚗", "🚕", "🚙", "🚌", "🚎", "🏎️", "🚓", "🚑", "🚒", "🚐", "🚚", "🚛", "🚜", "🛴", "🚲",
            ],
            IconCategory::Planets => &[
                "🌍", "🌎", "🌏", "🌕", "🌖", "🌗", "🌘", "🌑", "🌒", "🌓", "🌔", "⭐", "🌟", "✨",
            ],
            IconCategory::Food => &[
                "🍎", "🍌", "🍉", "🍇", "🍓", "🍒", "🍑", "🍊", "🍋", "🍍", "🥭", "🍈", "🍐",
            ],
            IconCategory::Nature => &[
                "🌳", "🌲", "🌴", "🌵", "🌷", "🌹", "🌺", "🌻", "🌼", "🌸", "🌾", "🌿", "🍀",
            ],
            IconCategory::Toys => &["🧸", "🎈", "🎁", "🎀", "🎪", "🎭", "🎨", "🎯", "🎲", "🪀", "🪁"],
            IconCategory::Sports => &[
                "⚽", "🏀", "🏈", "⚾", "🎾", "🏐", "🏉", "🎱", "🏓", "🏸", "🏒", "🏑", "🏏",
            ],
        }
    }

    /// CSS class the renderer attaches to tokens of this category.
    pub fn style_class(self) -> &'static str {
        match self {
            IconCategory::Animals => "icon-animal",
            IconCategory::Furniture => "icon-furniture",
            IconCategory::Vehicles => "icon-vehicle",
            IconCategory::Planets => "icon-planet",
            IconCategory::Food => "icon-food",
            IconCategory::Nature => "icon-nature",
            IconCategory::Toys => "icon-toy",
            IconCategory::Sports => "icon-sport",
        }
    }

    pub fn of(icon: &str) -> Option<IconCategory> {
        IconCategory::ALL.into_iter().find(|c| c.icons().contains(&icon))
    }
}

/// Style class for an arbitrary icon, `icon-default` when it belongs to no category.
pub fn style_class_for(icon: &str) -> &'static str {
    IconCategory::of(icon).map_or("icon-default", IconCategory::style_class)
}

// --- Randomness --------------------------------------------------------------

/// Uniform index picker. Implementations decide where the entropy comes from.
pub trait RandomSource {
    /// Returns a value in `0..len` (0 when `len` is 0).
    fn next_index(&mut self, len: usize) -> usize;

    /// Inclusive integer range; returns `lo` when the range is empty.
    fn next_in_range(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        let span = u64::from(hi) - u64::from(lo) + 1;
        let offset = self.next_index(usize::try_from(span).unwrap_or(usize::MAX)) as u64;
        // offset < span, so lo + offset <= hi
        (u64::from(lo) + offset) as u32
    }

    fn next_bool(&mut self) -> bool {
        self.next_index(2) == 1
    }
}

/// 64-bit linear congruential generator (Knuth MMIX constants).
/// Not crypto secure, only used for picking icons and operands.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn step(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        // high bits have the longest period
        (self.state >> 33) as u32
    }
}

impl RandomSource for Lcg {
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.step() as usize % len
    }
}

// --- Token supply ------------------------------------------------------------

/// Icons for one problem. For subtraction both fields hold the same icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub primary: &'static str,
    pub secondary: &'static str,
}

impl TokenPair {
    pub fn for_group(&self, group: Group) -> &'static str {
        match group {
            Group::Primary => self.primary,
            Group::Secondary => self.secondary,
        }
    }
}

/// Pluggable icon policy, re-queried for every new problem.
pub trait TokenSupplier {
    fn pick(&mut self, operator: Operator) -> TokenPair;
}

/// Default policy: random category, two distinct icons from it for addition.
#[derive(Clone, Debug)]
pub struct CategoryTokens<R> {
    rng: R,
}

impl<R: RandomSource> CategoryTokens<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RandomSource> TokenSupplier for CategoryTokens<R> {
    fn pick(&mut self, operator: Operator) -> TokenPair {
        let category = IconCategory::ALL[self.rng.next_index(IconCategory::ALL.len())];
        let icons = category.icons();
        let first = self.rng.next_index(icons.len());
        let primary = icons[first];
        match operator {
            Operator::Subtract => TokenPair { primary, secondary: primary },
            Operator::Add => {
                // Offset by 1..len so the second pick can never land on the first.
                let offset = 1 + self.rng.next_index(icons.len() - 1);
                let secondary = icons[(first + offset) % icons.len()];
                TokenPair { primary, secondary }
            }
        }
    }
}

/// Always hands out the same icons. Handy for deterministic rendering.
#[derive(Clone, Copy, Debug)]
pub struct FixedTokens(pub TokenPair);

impl TokenSupplier for FixedTokens {
    fn pick(&mut self, operator: Operator) -> TokenPair {
        match operator {
            Operator::Add => self.0,
            Operator::Subtract => TokenPair { primary: self.0.primary, secondary: self.0.primary },
        }
    }
}
