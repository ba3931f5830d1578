// src/brief.rs
use crate::color::Color;
use crate::models::{
    AspectRatio, CameraAngle, ColorRole, ReconciledAnalysis, ReferenceImage, StyleTag,
};
use indexmap::IndexSet;
use serde::Serialize;

/// The user's current design brief. Every transition consumes the brief and
/// returns the next one; nothing here validates beyond set semantics.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Brief {
    pub idea: String,
    pub style_tags: IndexSet<StyleTag>,
    pub background_colors: IndexSet<Color>,
    pub object_colors: IndexSet<Color>,
    pub camera: CameraAngle,
    pub ratio: AspectRatio,
    pub reference_image: Option<ReferenceImage>,
}

impl Brief {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idea(mut self, idea: impl Into<String>) -> Self {
        self.idea = idea.into();
        self
    }

    pub fn with_camera(mut self, camera: CameraAngle) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_ratio(mut self, ratio: AspectRatio) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_reference_image(mut self, image: Option<ReferenceImage>) -> Self {
        self.reference_image = image;
        self
    }

    pub fn toggle_style_tag(mut self, tag: StyleTag) -> Self {
        if !self.style_tags.shift_remove(&tag) {
            self.style_tags.insert(tag);
        }
        self
    }

    /// Manual picks are stored exactly as given; they are never snapped to
    /// the palette.
    pub fn toggle_color(mut self, role: ColorRole, color: Color) -> Self {
        let set = match role {
            ColorRole::Background => &mut self.background_colors,
            ColorRole::Object => &mut self.object_colors,
        };
        if !set.shift_remove(&color) {
            set.insert(color);
        }
        self
    }

    /// Style tags and both color sets are cleared and rebuilt from the
    /// analysis. Camera and ratio are only overwritten when the analysis
    /// named a known value.
    pub fn replace_from_analysis(mut self, analysis: &ReconciledAnalysis) -> Self {
        self.style_tags = analysis.style_tags.iter().copied().collect();
        self.background_colors = analysis.background_colors.iter().copied().collect();
        self.object_colors = analysis.object_colors.iter().copied().collect();
        if let Some(camera) = analysis.camera {
            self.camera = camera;
        }
        if let Some(ratio) = analysis.ratio {
            self.ratio = ratio;
        }
        self
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn colors(&self, role: ColorRole) -> &IndexSet<Color> {
        match role {
            ColorRole::Background => &self.background_colors,
            ColorRole::Object => &self.object_colors,
        }
    }

    pub fn has_idea(&self) -> bool {
        !self.idea.trim().is_empty()
    }
}
