use web_sys::Window;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// The visitor's motion preference, read once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPreference {
    Full,
    Reduced,
}

impl MotionPreference {
    pub fn detect(window: &Window) -> Self {
        let reduced = window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .map(|query| query.matches())
            .unwrap_or(false);
        if reduced {
            MotionPreference::Reduced
        } else {
            MotionPreference::Full
        }
    }

    pub fn is_reduced(self) -> bool {
        self == MotionPreference::Reduced
    }
}
