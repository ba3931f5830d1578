// src/services/analysis_adapter.rs
use crate::color::{Color, reconcile_many};
use crate::errors::CreatorError;
use crate::models::{
    AnalysisRequest, AnalysisResult, AspectRatio, CameraAngle, ReconciledAnalysis, ReferenceImage,
    StyleCategory, StyleTag,
};
use crate::schema::{self, ANALYSIS_SCHEMA};
use crate::services::{GenerativeBackend, response_validator};
use log::{info, warn};
use std::sync::Arc;

const ANALYSIS_PROMPT: &str = "Analyse the style settings of this image.";

/// Turns a reference image into brief-ready selections. The adapter never
/// touches a brief itself: callers apply the returned analysis, so a failed
/// call leaves their state exactly as it was.
pub struct ImageAnalysisAdapter {
    backend: Arc<dyn GenerativeBackend>,
    threshold: f64,
}

impl ImageAnalysisAdapter {
    pub fn new(backend: Arc<dyn GenerativeBackend>, threshold: f64) -> Self {
        Self { backend, threshold }
    }

    pub async fn analyze(
        &self,
        image: &ReferenceImage,
    ) -> Result<ReconciledAnalysis, CreatorError> {
        let request = analysis_request(image);
        let raw_text = self.backend.analyze_image(&request).await?;
        let raw: AnalysisResult = response_validator::parse_checked(&raw_text, &ANALYSIS_SCHEMA)?;

        let analysis = self.reconcile(&raw);
        info!(
            "{} analysis: {} style tags, {} background / {} object colors",
            self.backend.name(),
            analysis.style_tags.len(),
            analysis.background_colors.len(),
            analysis.object_colors.len()
        );
        Ok(analysis)
    }

    /// Looks enumeration values up and snaps both color lists with the same
    /// threshold. Unknown values are dropped with a warning.
    pub fn reconcile(&self, raw: &AnalysisResult) -> ReconciledAnalysis {
        let style_tags = [
            (StyleCategory::ArtStyle, &raw.art_style),
            (StyleCategory::Texture, &raw.texture),
            (StyleCategory::Lighting, &raw.lighting),
        ]
        .into_iter()
        .filter_map(|(category, value)| style_in_category(category, value))
        .collect();

        ReconciledAnalysis {
            camera: known::<CameraAngle>("camera", &raw.camera),
            ratio: known::<AspectRatio>("ratio", &raw.ratio),
            style_tags,
            background_colors: reconcile_many(
                &parse_colors("bgColors", &raw.bg_colors),
                self.threshold,
            ),
            object_colors: reconcile_many(
                &parse_colors("objColors", &raw.obj_colors),
                self.threshold,
            ),
        }
    }
}

fn analysis_request(image: &ReferenceImage) -> AnalysisRequest {
    let allowed = |category: StyleCategory| {
        StyleTag::in_category(category)
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let cameras = CameraAngle::ALL.map(|c| c.as_str()).join(", ");
    let ratios = AspectRatio::ALL.map(|r| r.as_str()).join(", ");

    let system_instruction = format!(
        "You are an image analysis expert. \
         Extract the values from each category that best fit the provided image.\n\n\
         [Categories & Allowed Values]\n\
         1. camera: {}\n\
         2. ratio: {}\n\
         3. artStyle: {}\n\
         4. texture: {}\n\
         5. lighting: {}\n\
         6. bgColors: array of hex color codes (e.g. [\"#FFFFFF\", \"#000000\"])\n\
         7. objColors: array of hex color codes (e.g. [\"#FF0000\", \"#00FF00\"])\n\n\
         Respond with JSON only.",
        cameras,
        ratios,
        allowed(StyleCategory::ArtStyle),
        allowed(StyleCategory::Texture),
        allowed(StyleCategory::Lighting),
    );

    AnalysisRequest {
        image: image.clone(),
        system_instruction,
        user_prompt: ANALYSIS_PROMPT.to_string(),
        response_schema: schema::to_response_schema(&ANALYSIS_SCHEMA),
    }
}

fn known<T: std::str::FromStr>(field: &str, value: &str) -> Option<T> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        warn!("Ignoring unknown analysis {} `{}`", field, value);
    }
    parsed
}

fn style_in_category(category: StyleCategory, value: &str) -> Option<StyleTag> {
    match value.parse::<StyleTag>() {
        Ok(tag) if tag.category() == category => Some(tag),
        _ => {
            warn!("Ignoring analysis style `{}` for {:?}", value, category);
            None
        }
    }
}

fn parse_colors(field: &str, codes: &[String]) -> Vec<Color> {
    codes
        .iter()
        .filter_map(|code| match code.parse() {
            Ok(color) => Some(color),
            Err(_) => {
                warn!("Ignoring unparsable {} entry `{}`", field, code);
                None
            }
        })
        .collect()
}
