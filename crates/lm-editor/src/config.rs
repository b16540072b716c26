/// Editor tuning knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom factor per wheel notch.
    pub wheel_zoom_step: f32,
    /// A freehand point is recorded only when its squared distance (percent
    /// units) from the previous one exceeds this.
    pub freehand_min_dist_sq: f32,
    /// Pin handle radius in device pixels.
    pub pin_hit_radius_px: f32,
    /// Maximum undo depth.
    pub history_depth: usize,
    /// Offset (percent) applied to duplicated elements.
    pub duplicate_offset: f32,
    /// Label given to drawn light lines.
    pub default_light_label: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 4.0,
            wheel_zoom_step: 1.1,
            freehand_min_dist_sq: 0.25,
            pin_hit_radius_px: 14.0,
            history_depth: 100,
            duplicate_offset: 2.0,
            default_light_label: "LED strip".to_string(),
        }
    }
}
