// src/services/mod.rs
pub mod analysis_adapter;
pub mod backend;
pub mod gemini_service;
pub mod image_processor;
pub mod request_builder;
pub mod response_validator;
pub mod session_store;

pub use analysis_adapter::ImageAnalysisAdapter;
pub use backend::GenerativeBackend;
pub use gemini_service::GeminiService;
pub use image_processor::ImageProcessor;
pub use session_store::{AnalysisOutcome, SessionStore};
