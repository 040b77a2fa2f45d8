// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate middleware for router subtrees.
//!
//! Runs the gate once per request and stores the resulting [`Principal`]
//! in request extensions, where the extractors pick it up.
//!
//! ```rust,ignore
//! let admin = Router::new()
//!     .route("/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_session::<AdminClass>,
//!     ));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::claims::Principal;
use super::gate::authenticate_headers;
use super::roles::IdentityClass;
use crate::state::AppState;

pub async fn require_session<C: IdentityClass>(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate_headers::<C>(&state, request.headers()).await {
        Ok(principal) => {
            request.extensions_mut().insert::<Principal<C>>(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
