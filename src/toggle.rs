//! Collapsible report sections.
//!
//! A toggle view is a container with a clickable title bar and a body that
//! is hidden while the container carries the `closed` class. The open/closed
//! state of every rendered section is owned by a [`ToggleViewController`];
//! markup is re-rendered from that state instead of being the state itself.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    Open,
    Closed,
}

impl ToggleState {
    pub fn from_closed(closed: bool) -> Self {
        if closed {
            ToggleState::Closed
        } else {
            ToggleState::Open
        }
    }

    pub fn is_closed(self) -> bool {
        self == ToggleState::Closed
    }

    pub fn toggled(self) -> Self {
        match self {
            ToggleState::Open => ToggleState::Closed,
            ToggleState::Closed => ToggleState::Open,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SectionId(u64);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to the title bar of a rendered section; toggling goes through the
/// section that contains it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TitleRef {
    parent: SectionId,
}

impl TitleRef {
    pub fn parent(&self) -> SectionId {
        self.parent
    }
}

#[derive(Clone, Debug)]
struct Section {
    title_html: String,
    content_html: String,
    state: ToggleState,
}

/// Render a standalone toggle view.
///
/// Neither `title_html` nor `content_html` is escaped; pass untrusted text
/// through [`crate::display::escape_html`] first.
pub fn render_toggle_view(title_html: &str, content_html: &str, closed: bool) -> String {
    render_markup(None, title_html, content_html, ToggleState::from_closed(closed))
}

fn render_markup(
    id: Option<SectionId>,
    title_html: &str,
    content_html: &str,
    state: ToggleState,
) -> String {
    let class = if state.is_closed() {
        "toggleView closed"
    } else {
        "toggleView"
    };
    let data = id
        .map(|id| format!(" data-section=\"{id}\""))
        .unwrap_or_default();
    format!(
        "<div class=\"{class}\"{data}><h4 class=\"toggleViewTitle\" onclick=\"toggleView(this)\"> <span class=\"toggleViewTitlePlus\">+</span><span class=\"toggleViewTitleMinus\">-</span> <span>{title_html}</span></h4><div class=\"togglable\">{content_html}</div></div>"
    )
}

/// Owns the open/closed state of every section it has rendered.
#[derive(Debug, Default)]
pub struct ToggleViewController {
    sections: BTreeMap<SectionId, Section>,
    next_id: u64,
}

impl ToggleViewController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new section and return its id and initial markup.
    pub fn render(
        &mut self,
        title_html: &str,
        content_html: &str,
        closed: bool,
    ) -> (SectionId, String) {
        let id = SectionId(self.next_id);
        self.next_id += 1;
        let section = Section {
            title_html: title_html.to_string(),
            content_html: content_html.to_string(),
            state: ToggleState::from_closed(closed),
        };
        let markup = render_markup(
            Some(id),
            &section.title_html,
            &section.content_html,
            section.state,
        );
        self.sections.insert(id, section);
        (id, markup)
    }

    pub fn title(&self, id: SectionId) -> Option<TitleRef> {
        self.sections
            .contains_key(&id)
            .then_some(TitleRef { parent: id })
    }

    /// Flip the section containing `title`. Returns the new state, or `None`
    /// if the section has been removed.
    pub fn toggle_view(&mut self, title: &TitleRef) -> Option<ToggleState> {
        self.toggle(title.parent)
    }

    pub fn toggle(&mut self, id: SectionId) -> Option<ToggleState> {
        let section = self.sections.get_mut(&id)?;
        section.state = section.state.toggled();
        Some(section.state)
    }

    pub fn state(&self, id: SectionId) -> Option<ToggleState> {
        self.sections.get(&id).map(|section| section.state)
    }

    /// Current markup for a section, reflecting its latest state.
    pub fn markup(&self, id: SectionId) -> Option<String> {
        self.sections.get(&id).map(|section| {
            render_markup(Some(id), &section.title_html, &section.content_html, section.state)
        })
    }

    pub fn remove(&mut self, id: SectionId) -> Option<ToggleState> {
        self.sections.remove(&id).map(|section| section.state)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_open_and_closed_views() {
        let open = render_toggle_view("Steps", "<p>body</p>", false);
        assert!(open.starts_with("<div class=\"toggleView\"><h4 class=\"toggleViewTitle\""));
        assert!(open.contains("<span>Steps</span>"));
        assert!(open.contains("<div class=\"togglable\"><p>body</p></div>"));
        assert!(open.contains("<span class=\"toggleViewTitlePlus\">+</span>"));
        assert!(open.contains("<span class=\"toggleViewTitleMinus\">-</span>"));

        let closed = render_toggle_view("Steps", "", true);
        assert!(closed.starts_with("<div class=\"toggleView closed\">"));
    }

    #[test]
    fn content_is_inserted_verbatim() {
        let html = render_toggle_view("t", "<b>&amp;</b>", false);
        assert!(html.contains("<b>&amp;</b>"));
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut controller = ToggleViewController::new();
        let (id, _) = controller.render("Suite", "body", true);
        let title = controller.title(id).unwrap();

        assert_eq!(controller.toggle_view(&title), Some(ToggleState::Open));
        assert_eq!(controller.toggle_view(&title), Some(ToggleState::Closed));
        assert_eq!(controller.state(id), Some(ToggleState::Closed));
    }

    #[test]
    fn markup_follows_state() {
        let mut controller = ToggleViewController::new();
        let (id, initial) = controller.render("Suite", "body", false);
        assert!(initial.contains("class=\"toggleView\" data-section=\"0\""));

        controller.toggle(id);
        let markup = controller.markup(id).unwrap();
        assert!(markup.contains("class=\"toggleView closed\" data-section=\"0\""));
    }

    #[test]
    fn sections_are_independent() {
        let mut controller = ToggleViewController::new();
        let (a, _) = controller.render("A", "", false);
        let (b, _) = controller.render("B", "", false);
        controller.toggle(a);
        assert_eq!(controller.state(a), Some(ToggleState::Closed));
        assert_eq!(controller.state(b), Some(ToggleState::Open));
    }

    #[test]
    fn removed_sections_stop_toggling() {
        let mut controller = ToggleViewController::new();
        let (id, _) = controller.render("A", "", false);
        let title = controller.title(id).unwrap();
        assert_eq!(controller.remove(id), Some(ToggleState::Open));
        assert_eq!(controller.toggle_view(&title), None);
        assert!(controller.title(id).is_none());
        assert!(controller.is_empty());
    }
}
