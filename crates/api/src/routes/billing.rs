//! Billing routes for Stripe integration
//!
//! These are browser-facing: outcomes are redirects and rendered pages,
//! not JSON. The webhook receiver is the one machine-facing endpoint.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use ledgerly_shared::Plan;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    pages,
    state::AppState,
};

/// Query parameters for the checkout success redirect
#[derive(Debug, Deserialize)]
pub struct SuccessParams {
    pub session_id: Option<String>,
}

/// Start a hosted checkout for the plan named in the path
///
/// Tags outside the paid plans bounce to pricing without touching Stripe.
/// A Stripe failure renders an error page carrying the raw message.
pub async fn checkout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(plan): Path<String>,
) -> Response {
    let Some(plan) = Plan::from_str(&plan) else {
        return Redirect::to("/pricing").into_response();
    };

    match state
        .billing
        .checkout
        .create_subscription_checkout(auth_user.user_id, &auth_user.email, plan)
        .await
    {
        Ok(session) => match session.url.as_deref() {
            Some(url) => Redirect::to(url).into_response(),
            None => {
                tracing::error!(
                    user_id = %auth_user.user_id,
                    session_id = %session.id,
                    "Checkout session created without a redirect URL"
                );
                pages::checkout_error("checkout session has no redirect URL").into_response()
            }
        },
        Err(e) => {
            tracing::error!(
                user_id = %auth_user.user_id,
                plan = %plan,
                error = %e,
                "Failed to create checkout session"
            );
            pages::checkout_error(&e.to_string()).into_response()
        }
    }
}

/// Landing page after a completed checkout
///
/// Reconciles the profile from the re-fetched session when a session id is
/// present. Failures here are logged and swallowed: Stripe also delivers
/// the webhook, and the user has already paid.
pub async fn checkout_success(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(params): Query<SuccessParams>,
) -> Response {
    if let Some(session_id) = params.session_id.as_deref() {
        if let Err(e) = state
            .billing
            .checkout
            .finalize_for_user(auth_user.user_id, session_id)
            .await
        {
            tracing::warn!(
                user_id = %auth_user.user_id,
                session_id = %session_id,
                error = %e,
                "Failed to reconcile checkout session on success redirect"
            );
        }
    }

    pages::checkout_success().into_response()
}

/// Landing page after an abandoned checkout; nothing to do
pub async fn checkout_cancel() -> Response {
    pages::checkout_cancel().into_response()
}

/// Receive a Stripe webhook event
///
/// Verification failures are the only 400s. Once the event is verified the
/// delivery is acknowledged unconditionally; a reconciler failure is
/// logged, never bounced back to Stripe.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<StatusCode> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Stripe webhook missing signature header");
            ApiError::BadRequest("Missing Stripe signature".to_string())
        })?;

    let event = state
        .billing
        .webhooks
        .verify_event(&body, signature)
        .map_err(|e| {
            tracing::warn!(error = ?e, "Stripe webhook verification failed");
            ApiError::BadRequest("Invalid webhook signature".to_string())
        })?;

    tracing::info!(
        event_type = %event.type_,
        event_id = %event.id,
        "Stripe webhook event verified"
    );

    if let Err(e) = state.billing.webhooks.handle_event(event).await {
        tracing::error!(error = %e, "Webhook handling error");
    }

    Ok(StatusCode::OK)
}

/// Redirect to the Stripe self-service billing portal
///
/// Users without a Stripe customer go to pricing instead; portal failures
/// fall back to the dashboard rather than surfacing an error.
pub async fn customer_portal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Redirect {
    let profile = match state.billing.profiles.get(auth_user.user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(
                user_id = %auth_user.user_id,
                error = %e,
                "Failed to load profile for portal redirect"
            );
            return Redirect::to("/dashboard");
        }
    };

    let Some(profile) = profile else {
        return Redirect::to("/pricing");
    };
    if !profile.has_stripe_customer() {
        return Redirect::to("/pricing");
    }

    match state
        .billing
        .portal
        .create_portal_session(auth_user.user_id, &profile.stripe_customer_id)
        .await
    {
        Ok(session) => Redirect::to(&session.url),
        Err(e) => {
            tracing::warn!(
                user_id = %auth_user.user_id,
                error = %e,
                "Failed to create portal session"
            );
            Redirect::to("/dashboard")
        }
    }
}
