// Gameplay constants shared by every mode.

use std::time::Duration;

// Session timing
pub const DEFAULT_SESSION_SECONDS: u32 = 60;
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Grace period between a correct answer and the next round.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(500);

/// Number of finished-session scores kept on the high-score board.
pub const HIGH_SCORE_CAPACITY: usize = 6;

// Scoring
pub const TRAIT_POINTS: u32 = 1;
pub const TACTICIAN_FULL_NAME_POINTS: u32 = 3;
pub const TACTICIAN_SHORT_NAME_POINTS: u32 = 1;

// Image locations per mode
pub const TRAIT_IMAGE_BASE: &str = "https://wiki.leagueoflegends.com/en-us/images/";
pub const TRAIT_IMAGE_SUFFIX: &str = "_TFT_icon.svg";
pub const TACTICIAN_IMAGE_BASE: &str =
    "https://ddragon.leagueoflegends.com/cdn/15.1.1/img/tft-tactician/";
pub const AUGMENT_IMAGE_BASE: &str =
    "https://raw.communitydragon.org/pbe/game/assets/maps/tft/icons/augments/choiceui/";
