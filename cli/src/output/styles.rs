//! Colors for the human renderer.

use owo_colors::Style;

/// One style per role a line plays in human output. Every role is plain
/// text unless the stylesheet was built with color.
#[derive(Default, Clone)]
pub struct Styles {
    /// Valid files, finished mounts, saved settings.
    pub ok: Style,
    /// Advisory findings and read-only mounts.
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    /// Fix hints and inactive state.
    pub muted: Style,
    /// YAML paths and section labels.
    pub emphasis: Style,
    pub title: Style,
}

impl Styles {
    #[must_use]
    pub fn new(color: bool) -> Self {
        if !color {
            return Self::default();
        }
        Self {
            ok: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            info: Style::new().blue(),
            muted: Style::new().dimmed(),
            emphasis: Style::new().bold(),
            title: Style::new().bold().cyan(),
        }
    }
}
