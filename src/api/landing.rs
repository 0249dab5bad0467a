//! Public landing information.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::feed::{fallback_documents, FEATURED_TAGS};
use crate::AppState;

const APP_NAME: &str = "Creative Vault";
const APP_DESCRIPTION: &str = "A personal collection of ideas, product visions, AI prompts, \
                               UI breakdowns, and inspiration documents.";

const FEATURES: [(&str, &str); 3] = [
    (
        "Lightning Fast",
        "Create and organize your ideas in seconds with our intuitive interface",
    ),
    (
        "Secure & Private",
        "Your creative work is protected with enterprise-grade security",
    ),
    (
        "Access Anywhere",
        "Sync across all your devices and collaborate from anywhere",
    ),
];

/// A feature blurb on the landing page.
#[derive(Debug, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

/// What unauthenticated visitors see.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub signup_enabled: bool,
    pub features: Vec<Feature>,
    pub featured_tags: Vec<&'static str>,
    pub sample_titles: Vec<String>,
}

/// GET /api/landing - Public app summary; needs no session.
pub async fn get_landing(State(state): State<AppState>) -> ApiResult<LandingInfo> {
    success(LandingInfo {
        name: APP_NAME,
        description: APP_DESCRIPTION,
        version: env!("CARGO_PKG_VERSION"),
        signup_enabled: state.config.allow_signup,
        features: FEATURES
            .iter()
            .map(|&(title, description)| Feature { title, description })
            .collect(),
        featured_tags: FEATURED_TAGS.to_vec(),
        sample_titles: fallback_documents().into_iter().map(|d| d.title).collect(),
    })
}
