use log::debug;

use crate::dom;
use crate::error::Result;
use crate::motion::MotionPreference;
use crate::observer::{self, Visibility};
use crate::page::Page;

pub const REVEAL_SELECTOR: &str = ".reveal, .reveal--left, .reveal--right, .reveal--scale";
pub const VISIBLE_CLASS: &str = "is-visible";

/// One-shot visibility latch for a revealed element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealState {
    visible: bool,
}

impl RevealState {
    #[cfg(test)]
    pub fn is_visible(self) -> bool {
        self.visible
    }

    /// Feeds one intersection report. Returns `true` only on the transition
    /// to visible, which is when the element should be marked and
    /// unobserved.
    pub fn observe(&mut self, intersecting: bool) -> bool {
        if self.visible || !intersecting {
            return false;
        }
        self.visible = true;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPlan {
    /// Mark every target visible up front; nothing is observed.
    RevealAll,
    Observe,
}

pub fn plan(motion: MotionPreference) -> RevealPlan {
    match motion {
        MotionPreference::Reduced => RevealPlan::RevealAll,
        MotionPreference::Full => RevealPlan::Observe,
    }
}

pub fn init(page: &Page) -> Result<()> {
    let targets = dom::query_all(&page.document, REVEAL_SELECTOR)?;
    if targets.is_empty() {
        return Ok(());
    }

    if plan(page.motion) == RevealPlan::RevealAll {
        for target in &targets {
            target.class_list().add_1(VISIBLE_CLASS)?;
        }
        debug!("reduced motion: revealed {} elements up front", targets.len());
        return Ok(());
    }

    let options = Visibility {
        threshold: page.config.reveal_threshold,
        root_margin: Some(page.config.reveal_root_margin.as_str()),
    };
    // The class is the latch; revealed elements are unobserved right away.
    observer::watch(&targets, options, |target, intersecting, observer| {
        let mut state = RevealState {
            visible: target.class_list().contains(VISIBLE_CLASS),
        };
        if state.observe(intersecting) {
            let _ = target.class_list().add_1(VISIBLE_CLASS);
            observer.unobserve(target);
        }
    })?;
    debug!("scroll reveal observing {} elements", targets.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{plan, RevealPlan, RevealState};
    use crate::motion::MotionPreference;

    #[test]
    fn reduced_motion_reveals_everything_up_front() {
        assert_eq!(plan(MotionPreference::Reduced), RevealPlan::RevealAll);
        assert_eq!(plan(MotionPreference::Full), RevealPlan::Observe);
    }

    #[test]
    fn first_intersection_reveals() {
        let mut state = RevealState::default();
        assert!(!state.observe(false));
        assert!(state.observe(true));
        assert!(state.is_visible());
    }

    #[test]
    fn reveal_fires_exactly_once() {
        let mut state = RevealState::default();
        let fired = [true, true, false, true]
            .into_iter()
            .filter(|&hit| state.observe(hit))
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn losing_visibility_never_hides_again() {
        let mut state = RevealState::default();
        state.observe(true);
        state.observe(false);
        state.observe(false);
        assert!(state.is_visible());
    }
}
