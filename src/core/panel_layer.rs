//! # Panel layer
//!
//! Panels coexist: no queue, no history, any number open at once. The layer
//! only sorts them into one para-layer per priority tier so the host can draw
//! higher tiers above lower ones.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::core::error::NavError;
use crate::core::layer::Layer;
use crate::core::properties::PanelProperties;
use crate::core::registry::{Notice, Registry};
use crate::core::screen::{Panel, PanelPriority, ScreenId, ScreenState};

pub const ALL_PRIORITIES: [PanelPriority; 3] = [
    PanelPriority::Default,
    PanelPriority::Priority,
    PanelPriority::SuperPriority,
];

pub struct PanelLayer {
    registry: Registry<dyn Panel>,
    para_layers: BTreeMap<PanelPriority, Vec<ScreenId>>,
}

impl Default for PanelLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelLayer {
    /// A layer with a para-layer for every priority tier.
    pub fn new() -> Self {
        Self::with_para_layers(ALL_PRIORITIES)
    }

    /// A layer with para-layers only for the given tiers. Registering a panel
    /// of any other tier fails.
    pub fn with_para_layers(tiers: impl IntoIterator<Item = PanelPriority>) -> Self {
        Self {
            registry: Registry::new(),
            para_layers: tiers.into_iter().map(|tier| (tier, Vec::new())).collect(),
        }
    }

    pub fn register(
        &mut self,
        id: impl Into<ScreenId>,
        panel: Box<dyn Panel>,
    ) -> Result<(), NavError> {
        let id = id.into();
        if self.registry.contains(id.as_str()) {
            return Err(NavError::DuplicateId(id));
        }
        let priority = panel.priority();
        if !self.para_layers.contains_key(&priority) {
            error!(
                "Panel '{}' has priority {:?} but no para-layer is configured for it",
                id, priority
            );
            return Err(NavError::UnmappedPriority { id, priority });
        }
        self.registry.register(id.clone(), panel)?;
        self.reparent(&id, priority);
        info!("Registered panel '{}' ({:?})", id, priority);
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) -> Result<(), NavError> {
        self.registry.unregister(id)?;
        for members in self.para_layers.values_mut() {
            members.retain(|member| member.as_str() != id);
        }
        info!("Unregistered panel '{}'", id);
        Ok(())
    }

    fn reparent(&mut self, id: &ScreenId, priority: PanelPriority) {
        if let Some(members) = self.para_layers.get_mut(&priority) {
            members.retain(|member| member != id);
            members.push(id.clone());
            debug!("Panel '{}' reparented into {:?} para-layer", id, priority);
        }
    }

    pub fn is_panel_visible(&self, id: &str) -> bool {
        self.registry.is_open(id)
    }

    pub fn state(&self, id: &str) -> Option<ScreenState> {
        self.registry.state(id)
    }

    pub fn para_layer(&self, priority: PanelPriority) -> Option<&[ScreenId]> {
        self.para_layers.get(&priority).map(Vec::as_slice)
    }

    /// Visible panels, bottom to top: by tier, then registration order.
    pub fn render_order(&self) -> Vec<ScreenId> {
        self.para_layers
            .values()
            .flatten()
            .filter(|id| self.registry.is_visible(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn process_messages(&mut self) {
        let notices = self.registry.drain_messages();
        self.react(notices);
    }

    pub fn expire_transitions(&mut self, now: Instant, timeout: Duration) {
        let notices = self.registry.expire(now, timeout);
        self.react(notices);
    }

    fn react(&mut self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Finished { id, transition } => {
                    debug!("Panel '{}' finished {:?} transition", id, transition);
                }
                Notice::CloseRequested { id, animate } => self.hide_screen(&id, animate),
                Notice::Destroyed { id } => {
                    if let Err(e) = self.unregister(id.as_str()) {
                        warn!("Could not unregister destroyed panel: {}", e);
                    }
                }
            }
        }
    }
}

impl Layer for PanelLayer {
    type Surface = dyn Panel;
    type Properties = PanelProperties;

    fn registry(&self) -> &Registry<dyn Panel> {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut Registry<dyn Panel> {
        &mut self.registry
    }

    fn show_screen(&mut self, id: &ScreenId, properties: PanelProperties) {
        self.registry.issue_show(id.as_str(), properties.data.as_ref());
    }

    fn hide_screen(&mut self, id: &ScreenId, animate: bool) {
        self.registry.issue_hide(id.as_str(), animate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeScreen;

    fn panel(priority: PanelPriority) -> Box<dyn Panel> {
        Box::new(FakeScreen::instant().with_priority(priority))
    }

    #[test]
    fn test_panels_coexist() {
        let mut layer = PanelLayer::new();
        layer.register("Hud", panel(PanelPriority::Default)).unwrap();
        layer.register("Minimap", panel(PanelPriority::Default)).unwrap();

        layer.show_by_id("Hud", PanelProperties::default()).unwrap();
        layer.show_by_id("Minimap", PanelProperties::default()).unwrap();
        layer.process_messages();

        assert!(layer.is_panel_visible("Hud"));
        assert!(layer.is_panel_visible("Minimap"));
    }

    #[test]
    fn test_reparent_by_priority() {
        let mut layer = PanelLayer::new();
        layer.register("Toast", panel(PanelPriority::SuperPriority)).unwrap();
        layer.register("Hud", panel(PanelPriority::Default)).unwrap();
        layer.register("Quest", panel(PanelPriority::Priority)).unwrap();

        assert_eq!(
            layer.para_layer(PanelPriority::SuperPriority),
            Some(&[ScreenId::from("Toast")][..])
        );

        for id in ["Toast", "Hud", "Quest"] {
            layer.show_by_id(id, PanelProperties::default()).unwrap();
        }
        let order: Vec<String> = layer
            .render_order()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(order, vec!["Hud", "Quest", "Toast"]);
    }

    #[test]
    fn test_unmapped_priority_is_rejected() {
        let mut layer = PanelLayer::with_para_layers([PanelPriority::Default]);
        let err = layer
            .register("Toast", panel(PanelPriority::SuperPriority))
            .unwrap_err();
        assert!(matches!(err, NavError::UnmappedPriority { .. }));
        assert!(!layer.is_registered("Toast"));
    }

    #[test]
    fn test_unknown_id_is_not_registered_error() {
        let mut layer = PanelLayer::new();
        assert!(matches!(
            layer.show_by_id("Ghost", PanelProperties::default()),
            Err(NavError::NotRegistered(_))
        ));
        assert!(matches!(
            layer.hide_by_id("Ghost", true),
            Err(NavError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_hide_and_visibility() {
        let mut layer = PanelLayer::new();
        layer.register("Hud", panel(PanelPriority::Default)).unwrap();
        layer.show_by_id("Hud", PanelProperties::default()).unwrap();
        layer.process_messages();
        layer.hide_by_id("Hud", false).unwrap();
        assert!(!layer.is_panel_visible("Hud"));
        layer.process_messages();
        assert_eq!(layer.state("Hud"), Some(ScreenState::Closed));
    }

    #[test]
    fn test_destroyed_panel_unregisters_itself() {
        let mut layer = PanelLayer::new();
        let screen = FakeScreen::instant();
        let probe = screen.probe();
        layer.register("Hud", Box::new(screen)).unwrap();

        probe.lifeline().unwrap().notify_destroyed();
        layer.process_messages();
        assert!(!layer.is_registered("Hud"));
        assert!(layer.para_layer(PanelPriority::Default).unwrap().is_empty());
    }

    #[test]
    fn test_hide_all_panels() {
        let mut layer = PanelLayer::new();
        layer.register("Hud", panel(PanelPriority::Default)).unwrap();
        layer.register("Toast", panel(PanelPriority::SuperPriority)).unwrap();
        layer.show_by_id("Hud", PanelProperties::default()).unwrap();
        layer.show_by_id("Toast", PanelProperties::default()).unwrap();
        layer.process_messages();

        layer.hide_all(true);
        layer.process_messages();
        assert!(layer.render_order().is_empty());
    }
}
