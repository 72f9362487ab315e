// ABOUTME: Detection of accessibility variants (sign language, audio description) by title.
// ABOUTME: Decides which feed items readChannelWithItems keeps, based on ChannelItemsOptions.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

use crate::models::Item;

const HEARING_IMPAIRED_MARKERS: &[&str] = &["Gebärdensprache"];
const VISION_IMPAIRED_MARKERS: &[&str] = &["Hörfassung", "Audiodeskription"];

static HEARING_IMPAIRED: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(HEARING_IMPAIRED_MARKERS).expect("valid marker patterns"));
static VISION_IMPAIRED: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(VISION_IMPAIRED_MARKERS).expect("valid marker patterns"));

/// Which accessibility variants to keep when reading a channel with its items.
///
/// Both are excluded by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelItemsOptions {
    pub include_vision_impaired: bool,
    pub include_hearing_impaired: bool,
}

/// True if the item is the sign-language version of a broadcast.
pub fn is_for_hearing_impaired(item: &Item) -> bool {
    HEARING_IMPAIRED.is_match(&item.title)
}

/// True if the item is the audio-described version of a broadcast.
pub fn is_for_vision_impaired(item: &Item) -> bool {
    VISION_IMPAIRED.is_match(&item.title)
}

/// True if `item` is an accessibility variant the options do not ask for.
pub fn should_skip_item(item: &Item, options: ChannelItemsOptions) -> bool {
    (is_for_hearing_impaired(item) && !options.include_hearing_impaired)
        || (is_for_vision_impaired(item) && !options.include_vision_impaired)
}
