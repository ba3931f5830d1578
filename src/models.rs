// src/models.rs
use crate::color::Color;
use crate::errors::CreatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraAngle {
    #[serde(rename = "Satellite View")]
    SatelliteView,
    #[serde(rename = "Isometric")]
    Isometric,
    #[serde(rename = "High Angle")]
    HighAngle,
    #[default]
    #[serde(rename = "Eye Level")]
    EyeLevel,
    #[serde(rename = "Profile View")]
    ProfileView,
    #[serde(rename = "Low Angle")]
    LowAngle,
    #[serde(rename = "Extreme Close-Up")]
    ExtremeCloseUp,
}

impl CameraAngle {
    pub const ALL: [CameraAngle; 7] = [
        CameraAngle::SatelliteView,
        CameraAngle::Isometric,
        CameraAngle::HighAngle,
        CameraAngle::EyeLevel,
        CameraAngle::ProfileView,
        CameraAngle::LowAngle,
        CameraAngle::ExtremeCloseUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraAngle::SatelliteView => "Satellite View",
            CameraAngle::Isometric => "Isometric",
            CameraAngle::HighAngle => "High Angle",
            CameraAngle::EyeLevel => "Eye Level",
            CameraAngle::ProfileView => "Profile View",
            CameraAngle::LowAngle => "Low Angle",
            CameraAngle::ExtremeCloseUp => "Extreme Close-Up",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "16:9")]
    Wide16x9,
    #[serde(rename = "9:16")]
    Tall9x16,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "2:3")]
    Portrait2x3,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 6] = [
        AspectRatio::Square,
        AspectRatio::Portrait4x5,
        AspectRatio::Wide16x9,
        AspectRatio::Tall9x16,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait2x3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Wide16x9 => "16:9",
            AspectRatio::Tall9x16 => "9:16",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait2x3 => "2:3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleCategory {
    ArtStyle,
    Texture,
    Lighting,
}

/// Every selectable style tag. The three categories are disjoint but a brief
/// holds all selected tags in one flat set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleTag {
    #[serde(rename = "Line Art")]
    LineArt,
    #[serde(rename = "2D Vector")]
    Vector2d,
    #[serde(rename = "2.5D Artwork")]
    Artwork25d,
    #[serde(rename = "3D Render")]
    Render3d,
    #[serde(rename = "3D Paper")]
    Paper3d,
    #[serde(rename = "Real Photo")]
    RealPhoto,
    #[serde(rename = "Matte")]
    Matte,
    #[serde(rename = "Shiny")]
    Shiny,
    #[serde(rename = "Glass")]
    Glass,
    #[serde(rename = "Day")]
    Day,
    #[serde(rename = "Night")]
    Night,
    #[serde(rename = "Mist")]
    Mist,
}

impl StyleTag {
    pub const ALL: [StyleTag; 12] = [
        StyleTag::LineArt,
        StyleTag::Vector2d,
        StyleTag::Artwork25d,
        StyleTag::Render3d,
        StyleTag::Paper3d,
        StyleTag::RealPhoto,
        StyleTag::Matte,
        StyleTag::Shiny,
        StyleTag::Glass,
        StyleTag::Day,
        StyleTag::Night,
        StyleTag::Mist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleTag::LineArt => "Line Art",
            StyleTag::Vector2d => "2D Vector",
            StyleTag::Artwork25d => "2.5D Artwork",
            StyleTag::Render3d => "3D Render",
            StyleTag::Paper3d => "3D Paper",
            StyleTag::RealPhoto => "Real Photo",
            StyleTag::Matte => "Matte",
            StyleTag::Shiny => "Shiny",
            StyleTag::Glass => "Glass",
            StyleTag::Day => "Day",
            StyleTag::Night => "Night",
            StyleTag::Mist => "Mist",
        }
    }

    pub fn category(&self) -> StyleCategory {
        match self {
            StyleTag::LineArt
            | StyleTag::Vector2d
            | StyleTag::Artwork25d
            | StyleTag::Render3d
            | StyleTag::Paper3d
            | StyleTag::RealPhoto => StyleCategory::ArtStyle,
            StyleTag::Matte | StyleTag::Shiny | StyleTag::Glass => StyleCategory::Texture,
            StyleTag::Day | StyleTag::Night | StyleTag::Mist => StyleCategory::Lighting,
        }
    }

    pub fn in_category(category: StyleCategory) -> impl Iterator<Item = StyleTag> {
        Self::ALL
            .into_iter()
            .filter(move |tag| tag.category() == category)
    }
}

macro_rules! impl_name_parsing {
    ($($ty:ident => $what:literal),* $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = CreatorError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let wanted = s.trim();
                    $ty::ALL
                        .into_iter()
                        .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                        .ok_or_else(|| {
                            CreatorError::Validation(format!("Unknown {} `{}`", $what, s))
                        })
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_name_parsing!(
    CameraAngle => "camera angle",
    AspectRatio => "aspect ratio",
    StyleTag => "style tag",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    Background,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLanguage {
    En,
    #[default]
    Ko,
}

impl OutputLanguage {
    pub fn display_name(&self) -> &'static str {
        match self {
            OutputLanguage::En => "English",
            OutputLanguage::Ko => "Korean",
        }
    }
}

/// A validated reference image, base64-encoded for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceImage {
    pub mime_type: String,
    #[serde(skip)]
    pub data: String,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

impl ReferenceImage {
    /// Parses `data:<mime>;base64,<payload>`. A bare payload is accepted as
    /// PNG. Dimensions are unknown for this path and left at zero.
    pub fn from_data_url(url: &str) -> Result<Self, CreatorError> {
        let (mime_type, data) = match url.split_once(',') {
            Some((header, payload)) => {
                let mime = header
                    .strip_prefix("data:")
                    .and_then(|rest| rest.split(';').next())
                    .filter(|m| !m.is_empty())
                    .unwrap_or("image/png");
                (mime.to_string(), payload.to_string())
            }
            None => ("image/png".to_string(), url.to_string()),
        };

        if data.trim().is_empty() {
            return Err(CreatorError::Validation(
                "Reference image payload is empty".to_string(),
            ));
        }

        Ok(Self {
            mime_type,
            byte_len: data.len() / 4 * 3,
            data,
            width: 0,
            height: 0,
        })
    }
}

/// The analysis service's guess about an image, decoded but not yet trusted.
/// Field names follow the analysis contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub camera: String,
    pub ratio: String,
    pub art_style: String,
    pub texture: String,
    pub lighting: String,
    pub bg_colors: Vec<String>,
    pub obj_colors: Vec<String>,
}

/// An [`AnalysisResult`] after enumeration lookup and palette reconciliation.
/// Values that do not belong to a fixed enumeration are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledAnalysis {
    pub camera: Option<CameraAngle>,
    pub ratio: Option<AspectRatio>,
    pub style_tags: Vec<StyleTag>,
    pub background_colors: Vec<Color>,
    pub object_colors: Vec<Color>,
}

/// The outbound request body. Built once per generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    pub idea: String,
    pub style_tags: Vec<String>,
    pub background_colors: Vec<String>,
    pub object_colors: Vec<String>,
    pub camera: String,
    pub ratio: String,
    pub output_language: OutputLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
}

/// Everything one generation call sends: the payload, the instructions and
/// the response shape the service is constrained to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub payload: GenerationPayload,
    #[serde(skip)]
    pub reference_mime_type: Option<String>,
    pub system_instruction: String,
    pub user_prompt: String,
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub image: ReferenceImage,
    pub system_instruction: String,
    pub user_prompt: String,
    pub response_schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub midjourney: String,
    pub dalle: String,
    #[serde(rename = "stableDiffusion")]
    pub stable_diffusion: String,
    #[serde(rename = "designIntent")]
    pub design_intent: String,
    pub insight: InsightDashboard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightDashboard {
    pub visual_balance: VisualBalance,
    pub tone_manner: ToneManner,
    pub texture_density: TextureDensity,
    pub designer_comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualBalance {
    pub vibrancy: f64,
    pub minimalism: f64,
    pub complexity: f64,
    pub softness: f64,
    pub futurism: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneManner {
    pub temperature: String,
    pub dynamism: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureDensity {
    pub reflectivity: f64,
    pub transparency: f64,
    pub roughness: f64,
}

impl InsightDashboard {
    /// Every 0-100 score with its dotted field path.
    pub fn scores(&self) -> [(&'static str, f64); 8] {
        let vb = &self.visual_balance;
        let td = &self.texture_density;
        [
            ("visual_balance.vibrancy", vb.vibrancy),
            ("visual_balance.minimalism", vb.minimalism),
            ("visual_balance.complexity", vb.complexity),
            ("visual_balance.softness", vb.softness),
            ("visual_balance.futurism", vb.futurism),
            ("texture_density.reflectivity", td.reflectivity),
            ("texture_density.transparency", td.transparency),
            ("texture_density.roughness", td.roughness),
        ]
    }
}
