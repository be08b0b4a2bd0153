use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator};

/// A named locomotion or pose state of the model.
///
/// Declaration order is significant: it is the order the pathfinder expands
/// neighbours in and the order hotkeys are assigned.
#[derive(
    Clone, Copy, Debug, Default, Display, EnumCount, EnumIter, EnumString, Eq, Hash, PartialEq,
)]
#[strum(ascii_case_insensitive)]
pub enum GaitState {
    #[default]
    #[strum(to_string = "stand", serialize = "GAIT_STAND")]
    Stand,
    #[strum(to_string = "walk", serialize = "GAIT_WALK")]
    Walk,
    #[strum(to_string = "trot", serialize = "GAIT_TROT")]
    Trot,
    #[strum(to_string = "gallop", serialize = "GAIT_GALLOP")]
    Gallop,
    #[strum(to_string = "sit", serialize = "GAIT_SIT")]
    Sit,
    #[strum(to_string = "reach", serialize = "GAIT_REACH")]
    Reach,
}

impl GaitState {
    /// Every gait in declaration order.
    pub const ALL: [GaitState; GaitState::COUNT] = [
        Self::Stand,
        Self::Walk,
        Self::Trot,
        Self::Gallop,
        Self::Sit,
        Self::Reach,
    ];

    /// Keyword order used when classifying clip names.
    const CLASSIFY_PRIORITY: [GaitState; GaitState::COUNT] = [
        Self::Gallop,
        Self::Trot,
        Self::Walk,
        Self::Sit,
        Self::Reach,
        Self::Stand,
    ];

    /// The lowercase keyword for the gait. Self-loop clips are named after it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stand => "stand",
            Self::Walk => "walk",
            Self::Trot => "trot",
            Self::Gallop => "gallop",
            Self::Sit => "sit",
            Self::Reach => "reach",
        }
    }

    /// Position in declaration order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Map a keyboard digit (`'1'..='6'`) to a gait in declaration order.
    pub fn from_hotkey(key: char) -> Option<Self> {
        let digit = key.to_digit(10)? as usize;
        if digit == 0 {
            return None;
        }
        Self::iter().nth(digit - 1)
    }

    /// The hotkey assigned to the gait.
    pub fn hotkey(self) -> char {
        char::from_digit(self.index() as u32 + 1, 10).unwrap_or('?')
    }
}

/// Classify a clip name by the gait keyword it contains.
///
/// Keywords are checked in the order `gallop, trot, walk, sit, reach, stand`
/// and the first match wins. Names without any keyword keep `previous`.
pub fn derive_gait(clip_name: &str, previous: GaitState) -> GaitState {
    let clip_name = clip_name.to_ascii_lowercase();
    GaitState::CLASSIFY_PRIORITY
        .into_iter()
        .find(|gait| clip_name.contains(gait.name()))
        .unwrap_or(previous)
}
