//! Highlight-dependent paint for zone layers.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::PaintConfig;

/// Paint values for a single zone feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePaint {
    pub fill_opacity: f64,
    pub line_width: f64,
    pub line_opacity: f64,
}

/// Paint for zone `id` under the default paint configuration.
///
/// With an empty highlight set every zone gets the default paint; otherwise
/// highlighted zones are emphasized and all others dimmed.
pub fn zone_paint(id: &str, highlighted: &BTreeSet<String>) -> ZonePaint {
    zone_paint_with(&PaintConfig::default(), id, highlighted)
}

pub fn zone_paint_with(config: &PaintConfig, id: &str, highlighted: &BTreeSet<String>) -> ZonePaint {
    let (fill_opacity, line_width) = if highlighted.is_empty() {
        (config.fill_opacity_default, config.line_width_default)
    } else if highlighted.contains(id) {
        (config.fill_opacity_highlighted, config.line_width_highlighted)
    } else {
        (config.fill_opacity_dimmed, config.line_width_dimmed)
    };

    ZonePaint {
        fill_opacity,
        line_width,
        line_opacity: config.line_opacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn no_highlight_uses_default_paint() {
        let paint = zone_paint("OP-1", &BTreeSet::new());
        assert_eq!(paint.fill_opacity, 0.25);
        assert_eq!(paint.line_width, 1.5);
        assert_eq!(paint.line_opacity, 0.9);
    }

    #[test]
    fn highlighted_and_dimmed() {
        let highlighted = set(&["OP-1"]);
        let on = zone_paint("OP-1", &highlighted);
        let off = zone_paint("OP-2", &highlighted);
        assert_eq!((on.fill_opacity, on.line_width), (0.5, 3.0));
        assert_eq!((off.fill_opacity, off.line_width), (0.15, 1.0));
        assert_eq!(on.line_opacity, off.line_opacity);
    }
}
