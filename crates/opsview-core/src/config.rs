//! Compile-time viewer configuration.
//!
//! There is no runtime configuration surface: palette and paint
//! values are fixed here and shared by the projector, session and exports.

/// Operation colors, assigned by upload index and cycled.
pub const OPERATION_PALETTE: [&str; 10] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
    "#6366F1", "#84CC16",
];

/// Every AoR renders in the same color.
pub const AOR_COLOR: &str = "#FFD700";

pub const DEFAULT_ALTITUDE_UNIT: &str = "FT";

pub const UNTITLED_OPERATION: &str = "Untitled Operation";

/// Map layer paint values for the highlight states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintConfig {
    pub fill_opacity_highlighted: f64,
    pub fill_opacity_dimmed: f64,
    pub fill_opacity_default: f64,
    pub line_width_highlighted: f64,
    pub line_width_dimmed: f64,
    pub line_width_default: f64,
    pub line_opacity: f64,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            fill_opacity_highlighted: 0.5,
            fill_opacity_dimmed: 0.15,
            fill_opacity_default: 0.25,
            line_width_highlighted: 3.0,
            line_width_dimmed: 1.0,
            line_width_default: 1.5,
            line_opacity: 0.9,
        }
    }
}

/// Palette color for the entity at `index` in upload order.
pub fn palette_color(index: usize) -> &'static str {
    OPERATION_PALETTE[index % OPERATION_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_by_index() {
        assert_eq!(palette_color(0), OPERATION_PALETTE[0]);
        assert_eq!(palette_color(OPERATION_PALETTE.len()), OPERATION_PALETTE[0]);
        assert_eq!(palette_color(OPERATION_PALETTE.len() + 3), OPERATION_PALETTE[3]);
    }
}
