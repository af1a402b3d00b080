//! Toast notification.
//!
//! One shared element. Showing a new message replaces the text and restarts
//! the hide timer, so a burst of clicks leaves one toast visible for the full
//! duration after the last click.

use chrono::{DateTime, TimeDelta, Utc};

use crate::dom::{Document, DomError, NodeId};

/// Class present while the toast is visible.
pub const VISIBLE_CLASS: &str = "show";

/// The toast element and its pending hide deadline.
#[derive(Debug, Clone)]
pub struct Toast {
    node: NodeId,
    duration: TimeDelta,
    hide_at: Option<DateTime<Utc>>,
}

impl Toast {
    #[must_use]
    pub const fn new(node: NodeId, duration: TimeDelta) -> Self {
        Self {
            node,
            duration,
            hide_at: None,
        }
    }

    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Display `message`, cancelling any pending hide.
    ///
    /// # Errors
    ///
    /// Returns an error if the toast element is not in `document`.
    pub fn show(
        &mut self,
        document: &mut Document,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomError> {
        document.set_text(self.node, message)?;
        document.add_class(self.node, VISIBLE_CLASS)?;
        // Past the end of the calendar the toast hides at the last instant.
        self.hide_at = Some(
            now.checked_add_signed(self.duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        );
        tracing::debug!(text = message, "Toast shown");
        Ok(())
    }

    /// Hide the toast if its deadline has passed. Returns whether it hid.
    ///
    /// # Errors
    ///
    /// Returns an error if the toast element is not in `document`.
    pub fn tick(&mut self, document: &mut Document, now: DateTime<Utc>) -> Result<bool, DomError> {
        match self.hide_at {
            Some(deadline) if now >= deadline => {
                document.remove_class(self.node, VISIBLE_CLASS)?;
                self.hide_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// When the toast will hide, if it is showing.
    #[must_use]
    pub const fn hide_at(&self) -> Option<DateTime<Utc>> {
        self.hide_at
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.hide_at.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::dom::Element;

    fn setup() -> (Document, Toast, DateTime<Utc>) {
        let mut doc = Document::new();
        let node = doc
            .append(doc.body(), Element::new("div").id("cart-toast"))
            .unwrap();
        let toast = Toast::new(node, TimeDelta::milliseconds(2500));
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        (doc, toast, start)
    }

    #[test]
    fn test_show_then_hide_after_duration() {
        let (mut doc, mut toast, start) = setup();
        toast.show(&mut doc, "Cupcake agregado", start).unwrap();
        assert!(doc.has_class(toast.node(), VISIBLE_CLASS));
        assert_eq!(doc.text(toast.node()), "Cupcake agregado");

        assert!(!toast.tick(&mut doc, start + TimeDelta::milliseconds(2499)).unwrap());
        assert!(doc.has_class(toast.node(), VISIBLE_CLASS));

        assert!(toast.tick(&mut doc, start + TimeDelta::milliseconds(2500)).unwrap());
        assert!(!doc.has_class(toast.node(), VISIBLE_CLASS));
        assert!(!toast.is_pending());
    }

    #[test]
    fn test_second_show_resets_timer() {
        let (mut doc, mut toast, start) = setup();
        toast.show(&mut doc, "uno", start).unwrap();
        let later = start + TimeDelta::milliseconds(2000);
        toast.show(&mut doc, "dos", later).unwrap();

        // The first deadline passes without hiding.
        assert!(!toast.tick(&mut doc, start + TimeDelta::milliseconds(3000)).unwrap());
        assert_eq!(doc.text(toast.node()), "dos");
        assert!(toast.tick(&mut doc, later + TimeDelta::milliseconds(2500)).unwrap());
    }

    #[test]
    fn test_tick_without_toast_is_noop() {
        let (mut doc, mut toast, start) = setup();
        assert!(!toast.tick(&mut doc, start).unwrap());
    }

    #[test]
    fn test_deadline_past_calendar_end_is_clamped() {
        let (mut doc, mut toast, _) = setup();
        let near_end = DateTime::<Utc>::MAX_UTC - TimeDelta::seconds(1);
        toast.show(&mut doc, "fin", near_end).unwrap();
        assert_eq!(toast.hide_at(), Some(DateTime::<Utc>::MAX_UTC));
        assert!(toast.is_pending());
        assert!(toast.tick(&mut doc, DateTime::<Utc>::MAX_UTC).unwrap());
    }
}
