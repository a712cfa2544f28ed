//! # Popup para-layer
//!
//! Bucket that popup windows are reparented into, with a darken veil drawn
//! underneath the topmost active popup.
//!
//! The refresh scans members from the most recently added backwards and keeps
//! the veil if any of them is still active. There is no full z-order; only
//! one popup's activity usually matters at a time.

use log::debug;

use crate::core::screen::ScreenId;

#[derive(Debug, Default)]
pub struct PopupParaLayer {
    members: Vec<ScreenId>,
    darkened: bool,
    veil_under: Option<ScreenId>,
}

impl PopupParaLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reparent a screen into the bucket. Re-adding moves it to the top.
    pub fn add_screen(&mut self, id: &ScreenId) {
        self.members.retain(|member| member != id);
        self.members.push(id.clone());
    }

    pub fn remove_screen(&mut self, id: &str) {
        self.members.retain(|member| member.as_str() != id);
        if self.veil_under.as_ref().is_some_and(|under| under.as_str() == id) {
            self.veil_under = None;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|member| member.as_str() == id)
    }

    /// Turn the veil on under `id`, which is brought above its siblings.
    pub fn darken_background(&mut self, id: &ScreenId) {
        self.add_screen(id);
        self.darkened = true;
        self.veil_under = Some(id.clone());
        debug!("Background darkened under popup '{}'", id);
    }

    /// Keep the veil only while some member is still active.
    pub fn refresh_darken(&mut self, is_active: impl Fn(&str) -> bool) {
        let top_active = self
            .members
            .iter()
            .rev()
            .find(|member| is_active(member.as_str()))
            .cloned();
        let darkened = top_active.is_some();
        if darkened != self.darkened {
            debug!("Popup veil {}", if darkened { "kept" } else { "lifted" });
        }
        self.darkened = darkened;
        self.veil_under = top_active;
    }

    pub fn is_darkened(&self) -> bool {
        self.darkened
    }

    /// The popup the veil sits directly under.
    pub fn veil_under(&self) -> Option<&ScreenId> {
        self.veil_under.as_ref()
    }

    /// Members bottom to top.
    pub fn members(&self) -> &[ScreenId] {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ScreenId {
        ScreenId::from(s)
    }

    #[test]
    fn test_darken_moves_popup_to_top() {
        let mut layer = PopupParaLayer::new();
        layer.add_screen(&id("Confirm"));
        layer.add_screen(&id("Reward"));
        layer.darken_background(&id("Confirm"));
        assert!(layer.is_darkened());
        assert_eq!(layer.members(), &[id("Reward"), id("Confirm")]);
        assert_eq!(layer.veil_under(), Some(&id("Confirm")));
    }

    #[test]
    fn test_refresh_keeps_veil_for_remaining_popup() {
        let mut layer = PopupParaLayer::new();
        layer.darken_background(&id("Reward"));
        layer.darken_background(&id("Confirm"));

        layer.refresh_darken(|member| member == "Reward");
        assert!(layer.is_darkened());
        assert_eq!(layer.veil_under(), Some(&id("Reward")));
    }

    #[test]
    fn test_refresh_lifts_veil_when_nothing_active() {
        let mut layer = PopupParaLayer::new();
        layer.darken_background(&id("Confirm"));
        layer.refresh_darken(|_| false);
        assert!(!layer.is_darkened());
        assert_eq!(layer.veil_under(), None);
    }

    #[test]
    fn test_remove_screen() {
        let mut layer = PopupParaLayer::new();
        layer.darken_background(&id("Confirm"));
        layer.remove_screen("Confirm");
        assert!(!layer.contains("Confirm"));
        assert_eq!(layer.veil_under(), None);
    }
}
