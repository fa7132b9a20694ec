//! Expand/collapse behavior for FAQ entries.

use tracing::{debug, warn};

use crate::{
    dom::{Document, Element},
    event::EventType,
};

pub const TOGGLE_SELECTOR: &str = ".toggle-faq";
pub const HIDDEN_CLASS: &str = "hidden";
/// Shown while the answer is collapsed.
pub const PLUS_ICON: &str = r#"<path d="M12 5v14M5 12h14"></path>"#;
/// Shown while the answer is expanded.
pub const MINUS_ICON: &str = r#"<path d="M5 12h14"></path>"#;

/// Binds a click listener to every toggle control currently in the
/// document. Controls added later are not covered.
pub fn bind(document: &Document) -> usize {
    let controls = document.query_selector_all(TOGGLE_SELECTOR);
    for control in &controls {
        control.add_event_listener(EventType::Click, |event| {
            toggle(event.current_target());
            None
        });
    }
    controls.len()
}

/// Flips the content block that follows `control` and swaps the icon.
/// Returns the new hidden state, or `None` when there is nothing to flip.
pub fn toggle(control: &Element) -> Option<bool> {
    let Some(content) = control.next_element_sibling() else {
        warn!(control = ?control, "toggle control has no content block");
        return None;
    };

    let hidden = content.class_list().toggle(HIDDEN_CLASS);

    match control.query_selector("svg") {
        Some(icon) => {
            let glyph = if hidden { PLUS_ICON } else { MINUS_ICON };
            if let Err(error) = icon.set_inner_html(glyph) {
                warn!(%error, "failed to swap toggle icon");
            }
        }
        None => debug!(control = ?control, "toggle control has no icon"),
    }

    Some(hidden)
}

#[cfg(test)]
#[path = "tests/faq_tests.rs"]
mod tests;
