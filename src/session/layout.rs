use serde::{Deserialize, Serialize};

use crate::store::IMAGE_FILE_SUFFIX;

/// Options whose text is at most this many characters all fit on one row.
pub const SHORT_OPTION_MAX_CHARS: usize = 6;

/// How the five options should be presented.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// At least one option is an image reference.
    ImageGrid,
    /// Every option is short text.
    ShortTextRow,
    LongTextList,
}

/// Whether a single option value references an image file.
///
/// Checked per option, not derived from the dominant layout mode, so image
/// options resolve to URLs even when the layout reason is something else.
pub fn is_image_ref(value: &str) -> bool {
    value.ends_with(IMAGE_FILE_SUFFIX)
}

/// Derives the presentation mode from the option values alone. Recomputed on
/// every question change; holds no state.
pub fn classify(options: &[String; 5]) -> LayoutMode {
    if options.iter().any(|opt| is_image_ref(opt)) {
        LayoutMode::ImageGrid
    } else if options
        .iter()
        .all(|opt| opt.chars().count() <= SHORT_OPTION_MAX_CHARS)
    {
        LayoutMode::ShortTextRow
    } else {
        LayoutMode::LongTextList
    }
}
