use log::warn;

use crate::core::error::NavError;
use crate::core::registry::Registry;
use crate::core::screen::{Screen, ScreenId};

/// Shared surface of the panel and window layers.
///
/// A layer owns a [`Registry`] and adds its own show/hide policy on top.
/// The by-id operations validate the id and hand over to that policy.
pub trait Layer {
    type Surface: Screen + ?Sized;
    type Properties;

    fn registry(&self) -> &Registry<Self::Surface>;

    fn registry_mut(&mut self) -> &mut Registry<Self::Surface>;

    fn show_screen(&mut self, id: &ScreenId, properties: Self::Properties);

    fn hide_screen(&mut self, id: &ScreenId, animate: bool);

    fn show_by_id(&mut self, id: &str, properties: Self::Properties) -> Result<(), NavError> {
        let id = self.registry().resolve(id)?;
        self.show_screen(&id, properties);
        Ok(())
    }

    fn hide_by_id(&mut self, id: &str, animate: bool) -> Result<(), NavError> {
        let id = self.registry().resolve(id)?;
        self.hide_screen(&id, animate);
        Ok(())
    }

    /// Hide every registered screen, in no particular order.
    fn hide_all(&mut self, animate: bool) {
        let failures = self.registry_mut().hide_each(animate);
        if failures > 0 {
            warn!("{} screen(s) failed to hide", failures);
        }
    }

    fn is_registered(&self, id: &str) -> bool {
        self.registry().contains(id)
    }
}
