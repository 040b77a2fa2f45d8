// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::Request,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::require_session, AdminClass, AdminRole, TenantClass, TenantRole},
    error::ErrorBody,
    models::{
        CreateIdentityRequest, ForgotPasswordRequest, IdentityResponse, LoginRequest,
        LoginResponse, MeResponse, MessageResponse, ResetPasswordRequest, SignupRequest,
        SignupResponse,
    },
    state::AppState,
};

pub mod accounts;
pub mod admin_auth;
pub mod admin_users;
pub mod employees;
pub mod health;
pub mod sub_admins;
pub mod user_auth;


pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/logout", post(admin_auth::logout))
        .route("/me", get(admin_auth::me))
        .route("/sub-admins", post(sub_admins::create_sub_admin))
        .route(
            "/sub-admins/{id}/deactivate",
            put(sub_admins::deactivate_sub_admin),
        )
        .route("/sub-admins/{id}/activate", put(sub_admins::activate_sub_admin))
        .route("/sub-admins/{id}", delete(sub_admins::delete_sub_admin))
        .route("/users/{id}/deactivate", put(admin_users::deactivate_user))
        .route("/users/{id}/activate", put(admin_users::activate_user))
        .route("/users/{id}", delete(admin_users::delete_user))
        .route_layer(from_fn_with_state(
            state.clone(),
            require_session::<AdminClass>,
        ))
        .route("/login", post(admin_auth::login_any))
        .route("/super-admin/login", post(admin_auth::login_super_admin))
        .route("/sub-admin/login", post(admin_auth::login_sub_admin));

    let user_routes = Router::new()
        .route("/logout", post(user_auth::logout))
        .route("/me", get(user_auth::me))
        .route_layer(from_fn_with_state(
            state.clone(),
            require_session::<TenantClass>,
        ))
        .route("/signup", post(user_auth::signup))
        .route("/verify", get(user_auth::verify))
        .route("/login", post(user_auth::login))
        .route("/forgot-password", post(user_auth::forgot_password))
        .route("/reset-password", post(user_auth::reset_password));

    let owner_routes = Router::new()
        .route("/employees", post(employees::create_employee))
        .route(
            "/employees/{id}/deactivate",
            put(employees::deactivate_employee),
        )
        .route("/employees/{id}/activate", put(employees::activate_employee))
        .route("/employees/{id}", delete(employees::delete_employee))
        .route_layer(from_fn_with_state(
            state.clone(),
            require_session::<TenantClass>,
        ));

    let v1_routes = Router::new()
        .nest("/admin", admin_routes)
        .nest("/users", user_routes)
        .nest("/owner", owner_routes);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri().path(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Registers the bearer scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        admin_auth::login_any,
        admin_auth::login_super_admin,
        admin_auth::login_sub_admin,
        admin_auth::logout,
        admin_auth::me,
        sub_admins::create_sub_admin,
        sub_admins::deactivate_sub_admin,
        sub_admins::activate_sub_admin,
        sub_admins::delete_sub_admin,
        admin_users::deactivate_user,
        admin_users::activate_user,
        admin_users::delete_user,
        user_auth::signup,
        user_auth::verify,
        user_auth::login,
        user_auth::forgot_password,
        user_auth::reset_password,
        user_auth::logout,
        user_auth::me,
        employees::create_employee,
        employees::deactivate_employee,
        employees::activate_employee,
        employees::delete_employee
    ),
    components(
        schemas(
            AdminRole,
            TenantRole,
            ErrorBody,
            LoginRequest,
            LoginResponse,
            MeResponse,
            CreateIdentityRequest,
            SignupRequest,
            SignupResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            IdentityResponse,
            MessageResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Admin Auth", description = "Administrator login, logout and identity"),
        (name = "Sub-admins", description = "Sub-admin management (super-admins only)"),
        (name = "Tenant Accounts", description = "Administrative actions on tenant accounts"),
        (name = "User Auth", description = "Owner signup, verification, login, recovery and identity"),
        (name = "Employees", description = "Employee management (owners only)")
    )
)]
pub struct ApiDoc;
