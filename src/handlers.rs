// src/handlers.rs
use crate::brief::Brief;
use crate::color::{Color, PALETTE};
use crate::errors::CreatorError;
use crate::models::*;
use crate::services::session_store::Session;
use crate::services::{AnalysisOutcome, request_builder, response_validator};
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use base64::{Engine as _, engine::general_purpose};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use log::{error, info};
use serde::Deserialize;
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

type HandlerResult = Result<HttpResponse, CreatorError>;

#[derive(Debug, Deserialize)]
pub struct IdeaBody {
    pub idea: String,
}

#[derive(Debug, Deserialize)]
pub struct CameraBody {
    pub camera: String,
}

#[derive(Debug, Deserialize)]
pub struct RatioBody {
    pub ratio: String,
}

#[derive(Debug, Deserialize)]
pub struct StyleTagBody {
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct ColorBody {
    pub role: ColorRole,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct DataUrlBody {
    pub data_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    pub lang: Option<OutputLanguage>,
}

pub async fn create_session(data: web::Data<AppState>) -> HandlerResult {
    let session = data.session_store.create().await;
    Ok(HttpResponse::Created().json(&session))
}

pub async fn get_session(path: web::Path<Uuid>, data: web::Data<AppState>) -> HandlerResult {
    let session = data.session_store.get(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(&session))
}

pub async fn delete_session(path: web::Path<Uuid>, data: web::Data<AppState>) -> HandlerResult {
    data.session_store.remove(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn update_brief(
    data: &AppState,
    id: Uuid,
    transition: impl FnOnce(Brief) -> Brief,
) -> HandlerResult {
    let session = data
        .session_store
        .with_session(&id, |session| {
            session.update_brief(transition);
            session.clone()
        })
        .await?;
    Ok(HttpResponse::Ok().json(&session))
}

pub async fn set_idea(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    body: web::Json<IdeaBody>,
) -> HandlerResult {
    let idea = body.into_inner().idea;
    update_brief(&data, path.into_inner(), |brief| brief.with_idea(idea)).await
}

pub async fn set_camera(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    body: web::Json<CameraBody>,
) -> HandlerResult {
    let camera: CameraAngle = body.camera.parse()?;
    update_brief(&data, path.into_inner(), |brief| brief.with_camera(camera)).await
}

pub async fn set_ratio(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    body: web::Json<RatioBody>,
) -> HandlerResult {
    let ratio: AspectRatio = body.ratio.parse()?;
    update_brief(&data, path.into_inner(), |brief| brief.with_ratio(ratio)).await
}

pub async fn toggle_style_tag(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    body: web::Json<StyleTagBody>,
) -> HandlerResult {
    let tag: StyleTag = body.tag.parse()?;
    update_brief(&data, path.into_inner(), |brief| brief.toggle_style_tag(tag)).await
}

pub async fn toggle_color(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    body: web::Json<ColorBody>,
) -> HandlerResult {
    // manual picks are stored as given, never snapped to the palette
    let color: Color = body.color.parse()?;
    let role = body.role;
    update_brief(&data, path.into_inner(), |brief| brief.toggle_color(role, color)).await
}

/// Applies `transition` and makes any analysis still in flight stale, so a
/// late result cannot refill the brief from an image it no longer holds.
async fn update_brief_cancelling_analysis(
    data: &AppState,
    id: Uuid,
    transition: impl FnOnce(Brief) -> Brief,
) -> HandlerResult {
    let session = data
        .session_store
        .with_session(&id, |session| {
            session.cancel_analysis();
            session.update_brief(transition);
            session.clone()
        })
        .await?;
    Ok(HttpResponse::Ok().json(&session))
}

pub async fn reset_brief(path: web::Path<Uuid>, data: web::Data<AppState>) -> HandlerResult {
    update_brief_cancelling_analysis(&data, path.into_inner(), |brief| brief.reset()).await
}

pub async fn clear_reference_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> HandlerResult {
    update_brief_cancelling_analysis(&data, path.into_inner(), |brief| {
        brief.with_reference_image(None)
    })
    .await
}

/// Stores the uploaded image as the brief's reference, then runs analysis.
/// The brief keeps the new image only if the analysis succeeds; a failed
/// analysis restores the previous reference.
pub async fn upload_reference_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    mut payload: Multipart,
) -> HandlerResult {
    let session_id = path.into_inner();

    let mut image_data = BytesMut::new();
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| CreatorError::Validation(format!("Invalid upload: {}", e)))?
    {
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| CreatorError::Validation(format!("Invalid upload: {}", e)))?
        {
            if image_data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(CreatorError::Validation(format!(
                    "Upload exceeds {} bytes",
                    MAX_UPLOAD_BYTES
                )));
            }
            image_data.extend_from_slice(&chunk);
        }
        if !image_data.is_empty() {
            break;
        }
    }

    if image_data.is_empty() {
        return Err(CreatorError::Validation("No image provided".to_string()));
    }

    attach_and_analyze(&data, session_id, &image_data).await
}

/// JSON alternative to the multipart upload: `{ "data_url": "data:image/png;base64,..." }`.
pub async fn set_reference_data_url(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    body: web::Json<DataUrlBody>,
) -> HandlerResult {
    let parsed = ReferenceImage::from_data_url(&body.data_url)?;
    let bytes = general_purpose::STANDARD
        .decode(parsed.data.trim())
        .map_err(|e| CreatorError::Validation(format!("Invalid base64 image: {}", e)))?;

    attach_and_analyze(&data, path.into_inner(), &bytes).await
}

async fn attach_and_analyze(data: &AppState, session_id: Uuid, bytes: &[u8]) -> HandlerResult {
    let image = data.image_processor.encode_reference(bytes)?;
    info!(
        "Session {} uploaded {}x{} {} reference image",
        session_id, image.width, image.height, image.mime_type
    );

    let (token, previous) = data
        .session_store
        .with_session(&session_id, |session| {
            let previous = session.brief.reference_image.clone();
            session.update_brief(|brief| brief.with_reference_image(Some(image.clone())));
            (session.begin_analysis(), previous)
        })
        .await?;

    match data.analysis_adapter.analyze(&image).await {
        Ok(analysis) => {
            let (outcome, session) = data
                .session_store
                .with_session(&session_id, |session| {
                    (session.complete_analysis(token, &analysis), session.clone())
                })
                .await?;
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "session": session,
                "analysis": match outcome {
                    AnalysisOutcome::Applied => "applied",
                    AnalysisOutcome::Stale => "stale",
                }
            })))
        }
        Err(e) => {
            error!("Analysis failed for session {}: {}", session_id, e);
            data.session_store
                .with_session(&session_id, |session| {
                    if session.fail_analysis(token) {
                        session.update_brief(|brief| brief.with_reference_image(previous));
                    }
                })
                .await?;
            Err(e)
        }
    }
}

/// Builds the request, calls the generative service and validates the
/// answer. A failure keeps the previous successful result on the session.
pub async fn generate(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    query: web::Query<GenerateQuery>,
) -> HandlerResult {
    let session_id = path.into_inner();
    let language = query.lang.unwrap_or_default();

    let Session { brief, .. } = data.session_store.get(&session_id).await?;
    let request = request_builder::build(&brief, language)?;

    let raw_text = data.backend.generate(&request).await?;
    let result = response_validator::validate(&raw_text).inspect_err(|e| {
        error!("Rejected generation response for session {}: {}", session_id, e);
    })?;

    let stored = data
        .session_store
        .with_session(&session_id, |session| session.record_result(result).clone())
        .await?;

    info!("Session {} generated prompts via {}", session_id, data.backend.name());
    Ok(HttpResponse::Ok().json(&stored))
}

pub async fn catalog() -> HttpResponse {
    let palette: Vec<_> = PALETTE
        .iter()
        .map(|entry| serde_json::json!({ "name": entry.name, "color": entry.color }))
        .collect();
    let styles = |category: StyleCategory| StyleTag::in_category(category).collect::<Vec<_>>();

    HttpResponse::Ok().json(serde_json::json!({
        "cameras": CameraAngle::ALL,
        "ratios": AspectRatio::ALL,
        "styles": {
            "art_style": styles(StyleCategory::ArtStyle),
            "texture": styles(StyleCategory::Texture),
            "lighting": styles(StyleCategory::Lighting),
        },
        "palette": palette,
        "languages": [OutputLanguage::En, OutputLanguage::Ko],
        "defaults": {
            "camera": CameraAngle::default(),
            "ratio": AspectRatio::default(),
            "language": OutputLanguage::default(),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::mock::MockBackend;
    use crate::services::image_processor::tests::image_bytes;
    use crate::services::response_validator::tests::well_formed;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;
    use std::sync::Arc;

    const ANALYSIS: &str = r##"{"camera":"Isometric","ratio":"3:2","artStyle":"Line Art",
        "texture":"Matte","lighting":"Day","bgColors":["#FFFFFE"],
        "objColors":["#0A7AFF","#445566"]}"##;

    fn state(backend: Arc<MockBackend>) -> AppState {
        AppState::new(backend, 512)
    }

    fn multipart_body(bytes: &[u8]) -> (String, Vec<u8>) {
        let boundary = "----prompt-creator-test";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\n\
                 Content-Disposition: form-data; name=\"image\"; filename=\"ref.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    #[actix_web::test]
    async fn brief_edits_flow_through_the_api() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("")));
        let state = state(backend);
        let id = state.session_store.create().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/sessions/{id}/idea"))
            .set_json(serde_json::json!({ "idea": "a jelly robot" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["brief"]["idea"], "a jelly robot");

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/colors/toggle"))
            .set_json(serde_json::json!({ "role": "object", "color": "#fe0101" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["brief"]["object_colors"], serde_json::json!(["#FE0101"]));

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/style-tags/toggle"))
            .set_json(serde_json::json!({ "tag": "2.5D Artwork" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["brief"]["style_tags"], serde_json::json!(["2.5D Artwork"]));

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/sessions/{id}/camera"))
            .set_json(serde_json::json!({ "camera": "Wide Shot" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/reset"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["brief"]["idea"], "");
        assert_eq!(body["brief"]["camera"], "Eye Level");
        assert_eq!(body["brief"]["ratio"], "1:1");
    }

    #[actix_web::test]
    async fn generate_without_idea_never_calls_the_service() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("{}")));
        let state = state(backend.clone());
        let id = state.session_store.create().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/generate"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.generation_count(), 0);
    }

    #[actix_web::test]
    async fn failed_generation_keeps_previous_result() {
        let valid = well_formed().to_string();
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok(valid.as_str())));
        let state = state(backend.clone());
        let id = state.session_store.create().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/sessions/{id}/idea"))
            .set_json(serde_json::json!({ "idea": "paper whale" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/generate?lang=en"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["result"], well_formed());
        let sent = backend.last_generation.lock().unwrap().clone().unwrap();
        assert_eq!(sent.payload.output_language, OutputLanguage::En);

        backend.set_generation(Ok(r#"{"midjourney":"a"}"#));
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/generate"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        backend.set_generation(Err("connection reset"));
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/generate"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/sessions/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["last_result"]["result"], well_formed());
    }

    #[actix_web::test]
    async fn upload_applies_reconciled_analysis() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("")));
        let state = state(backend);
        let id = state.session_store.create().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/style-tags/toggle"))
            .set_json(serde_json::json!({ "tag": "Night" }))
            .to_request();
        test::call_service(&app, req).await;

        let (content_type, payload) = multipart_body(&image_bytes(16, 16, image::ImageFormat::Png));
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/reference-image"))
            .insert_header(("content-type", content_type))
            .set_payload(payload)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["analysis"], "applied");
        let brief = &body["session"]["brief"];
        assert_eq!(brief["style_tags"], serde_json::json!(["Line Art", "Matte", "Day"]));
        assert_eq!(brief["background_colors"], serde_json::json!(["#FFFFFF"]));
        assert_eq!(brief["object_colors"], serde_json::json!(["#007AFF", "#445566"]));
        assert_eq!(brief["camera"], "Isometric");
        assert_eq!(brief["ratio"], "3:2");
        assert_eq!(brief["reference_image"]["mime_type"], "image/png");
        assert_eq!(body["session"]["analysis_pending"], false);
    }

    #[actix_web::test]
    async fn data_url_upload_runs_the_same_analysis() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("")));
        let state = state(backend.clone());
        let id = state.session_store.create().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes),
        )
        .await;

        let jpeg = image_bytes(12, 6, image::ImageFormat::Jpeg);
        let data_url = format!(
            "data:image/jpeg;base64,{}",
            general_purpose::STANDARD.encode(&jpeg)
        );
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/sessions/{id}/reference-image"))
            .set_json(serde_json::json!({ "data_url": data_url }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["analysis"], "applied");
        assert_eq!(body["session"]["brief"]["reference_image"]["width"], 12);
        assert_eq!(backend.analysis_count(), 1);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/sessions/{id}/reference-image"))
            .set_json(serde_json::json!({ "data_url": "data:image/png;base64,@@@" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.analysis_count(), 1);
    }

    #[actix_web::test]
    async fn failed_analysis_leaves_selections_in_place() {
        let backend = Arc::new(MockBackend::new(Err("upstream timeout"), Ok("")));
        let state = state(backend.clone());
        let id = state.session_store.create().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/colors/toggle"))
            .set_json(serde_json::json!({ "role": "background", "color": "#222222" }))
            .to_request();
        let before: Value = test::call_and_read_body_json(&app, req).await;

        let (content_type, payload) = multipart_body(&image_bytes(8, 8, image::ImageFormat::Png));
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{id}/reference-image"))
            .insert_header(("content-type", content_type))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(backend.analysis_count(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/sessions/{id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["brief"], before["brief"]);
        assert_eq!(body["brief"]["reference_image"], Value::Null);
        assert_eq!(body["brief"]["background_colors"], serde_json::json!(["#222222"]));
        assert_eq!(body["analysis_pending"], false);
    }

    #[actix_web::test]
    async fn reset_and_clear_make_pending_analysis_stale() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("")));
        let state = state(backend);
        let store = state.session_store.clone();
        let id = store.create().await.id;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::routes),
        )
        .await;
        let late = ReconciledAnalysis {
            camera: Some(CameraAngle::HighAngle),
            ratio: None,
            style_tags: vec![StyleTag::Night],
            background_colors: vec![],
            object_colors: vec![],
        };

        for action in ["reset", "reference-image"] {
            let token = store.with_session(&id, |s| s.begin_analysis()).await.unwrap();
            let req = match action {
                "reset" => test::TestRequest::post(),
                _ => test::TestRequest::delete(),
            }
            .uri(&format!("/api/v1/sessions/{id}/{action}"))
            .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["analysis_pending"], false);

            let outcome = store
                .with_session(&id, |s| s.complete_analysis(token, &late))
                .await
                .unwrap();
            assert_eq!(outcome, AnalysisOutcome::Stale);
        }

        let session = store.get(&id).await.unwrap();
        assert!(session.brief.style_tags.is_empty());
        assert_eq!(session.brief.camera, CameraAngle::EyeLevel);
    }

    #[actix_web::test]
    async fn sessions_can_be_created_and_deleted() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("")));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(backend)))
                .configure(crate::routes),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["brief"]["camera"], "Eye Level");
        assert_eq!(body["last_result"], Value::Null);
        let id = body["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/sessions/{id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/sessions/{id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_session_is_not_found() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("")));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(backend)))
                .configure(crate::routes),
        )
        .await;
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/sessions/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn catalog_lists_fixed_vocabularies() {
        let backend = Arc::new(MockBackend::new(Ok(ANALYSIS), Ok("")));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(backend)))
                .configure(crate::routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/v1/catalog").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["cameras"].as_array().unwrap().len(), 7);
        assert_eq!(body["ratios"][2], "16:9");
        assert_eq!(body["styles"]["lighting"], serde_json::json!(["Day", "Night", "Mist"]));
        assert_eq!(body["palette"][2], serde_json::json!({ "name": "Red", "color": "#FF0000" }));
        assert_eq!(body["defaults"]["language"], "ko");
    }
}
