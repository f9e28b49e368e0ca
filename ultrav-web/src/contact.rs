//! `/contact` handlers

use crate::pages::{contact_page, ContactView};
use crate::server::AppState;
use crate::validation::{self, ContactSubmission};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::Html;
use axum::Form;

/// Render an empty form in the language the browser prefers
pub async fn show_form(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    if let Some(value) = accept_language {
        tracing::debug!("Accept-Language: {}", value);
    }

    let translation = state.translations.negotiate(accept_language);
    Html(contact_page(&ContactView::empty(translation)))
}

/// Validate a submission and render either the errors or the success message
pub async fn submit_form(
    State(state): State<AppState>,
    Form(submission): Form<ContactSubmission>,
) -> Html<String> {
    let translation = state.translations.for_code(&submission.lang);

    match validation::validate(&submission) {
        Ok(()) => {
            tracing::info!(
                "Contact form accepted from {} <{}> ({} chars)",
                submission.name,
                submission.email,
                submission.message.chars().count()
            );
            Html(contact_page(&ContactView {
                success: true,
                ..ContactView::empty(translation)
            }))
        }
        Err(mut errors) => {
            tracing::warn!(
                "Contact form rejected: {}",
                errors
                    .fields()
                    .map(|field| format!("{}={:?}", field, errors.get(field)))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            errors.translate(translation);
            Html(contact_page(&ContactView {
                errors: Some(&errors),
                submitted: Some(&submission),
                ..ContactView::empty(translation)
            }))
        }
    }
}
