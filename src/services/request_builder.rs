// src/services/request_builder.rs
use crate::brief::Brief;
use crate::color::format_for_request;
use crate::errors::CreatorError;
use crate::models::{
    ColorRole, GenerationPayload, GenerationRequest, OutputLanguage, StyleCategory, StyleTag,
};
use crate::schema::{self, GENERATION_SCHEMA};

const NOT_SPECIFIED: &str = "not specified";

/// Serializes a brief into one generation request. Colors are formatted here
/// and nowhere else, so the brief itself keeps canonical color values.
pub fn build(brief: &Brief, language: OutputLanguage) -> Result<GenerationRequest, CreatorError> {
    if !brief.has_idea() {
        return Err(CreatorError::Validation(
            "Describe your idea before generating".to_string(),
        ));
    }

    let payload = GenerationPayload {
        idea: brief.idea.trim().to_string(),
        style_tags: brief.style_tags.iter().map(|t| t.as_str().to_string()).collect(),
        background_colors: format_for_request(brief.colors(ColorRole::Background)),
        object_colors: format_for_request(brief.colors(ColorRole::Object)),
        camera: brief.camera.as_str().to_string(),
        ratio: brief.ratio.as_str().to_string(),
        output_language: language,
        reference_image: brief.reference_image.as_ref().map(|img| img.data.clone()),
    };

    Ok(GenerationRequest {
        user_prompt: user_prompt(&payload),
        system_instruction: system_instruction(language),
        response_schema: schema::to_response_schema(&GENERATION_SCHEMA),
        reference_mime_type: brief.reference_image.as_ref().map(|img| img.mime_type.clone()),
        payload,
    })
}

fn listed(items: &[String]) -> String {
    if items.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        items.join(", ")
    }
}

fn user_prompt(payload: &GenerationPayload) -> String {
    format!(
        "User idea: \"{}\"\n\
         Selected style options: [{}]\n\
         Background colors: {}\n\
         Object colors: {}\n\
         Camera angle: {}\n\
         Aspect ratio: {}",
        payload.idea,
        payload.style_tags.join(", "),
        listed(&payload.background_colors),
        listed(&payload.object_colors),
        payload.camera,
        payload.ratio,
    )
}

fn style_library(category: StyleCategory) -> String {
    StyleTag::in_category(category)
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn system_instruction(language: OutputLanguage) -> String {
    format!(
        r#"You are "Prompt Creator". Analyse the user's idea and produce optimal image-generation prompts with a soft and fun sensibility, together with a design insight report.

[Style Library]
1. Art Style: {art}.
2. Texture: {texture}.
3. Lighting: {lighting}.
4. Color Palette: use the selected background and object colors harmoniously. Named colors are palette colors; hex codes are exact custom colors.

[Tasks]
1. Generate prompts for Midjourney (v6.0), DALL-E 3 and Stable Diffusion. Prompts are always written in English.
2. Design insight:
   - Visual Balance (0-100): vibrancy, minimalism, complexity, softness, futurism.
   - Tone & Manner: temperature (warm/cool), dynamism (low/medium/high).
   - Texture Density (0-100): reflectivity, transparency, roughness.
   - Write the design intent and the designer comment in {language}.

[Output Format]
Respond with JSON only."#,
        art = style_library(StyleCategory::ArtStyle),
        texture = style_library(StyleCategory::Texture),
        lighting = style_library(StyleCategory::Lighting),
        language = language.display_name(),
    )
}
