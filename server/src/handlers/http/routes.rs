use std::future::Future;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::{Method, Request, StatusCode};
use serde_json::json;
use tracing::{debug, warn};

use crate::AppState;
use crate::auth::{Authorization, authorize_admin, normalize_path, unix_now};
use crate::error::{ApiError, ApiResult};
use crate::handlers::http::utils::json_response::{HttpResponse, deliver_serialized_json};
use crate::handlers::http::{auth, products, users};

use shared::types::jwt::JwtClaims;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// The access gate runs before any route is looked up, so by the time a
// handler is called the request is either exempt or carries valid claims.
//
//   RouteHandler  : receives (req, state, claims). `claims` is `None` when
//                   the request matched an exemption rule.
//
//   AdminHandler  : receives (req, state, claims) with claims guaranteed
//                   present and `role == admin`.

type HandlerFuture = Pin<Box<dyn Future<Output = ApiResult> + Send>>;

type RouteHandler =
    Box<dyn Fn(Request<Incoming>, AppState, Option<JwtClaims>) -> HandlerFuture + Send + Sync>;

type AdminHandler = Box<dyn Fn(Request<Incoming>, AppState, JwtClaims) -> HandlerFuture + Send + Sync>;

// ---------------------------------------------------------------------------
// RouteKind
// ---------------------------------------------------------------------------

enum RouteKind {
    /// Whatever the gate decided is enough.
    Open(RouteHandler),

    /// Needs claims, and the claims must pass `authorize_admin`.
    Admin(AdminHandler),
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState, Option<JwtClaims>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state, claims| {
                Box::pin(handler(req, state, claims))
            })),
        });
        self
    }

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState, Option<JwtClaims>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState, Option<JwtClaims>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.open(Method::POST, path, handler)
    }

    pub fn put<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState, Option<JwtClaims>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.open(Method::PUT, path, handler)
    }

    /// DELETE restricted to admins.
    pub fn delete_admin<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState, JwtClaims) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::DELETE,
            path: path.to_string(),
            kind: RouteKind::Admin(Box::new(move |req, state, claims| {
                Box::pin(handler(req, state, claims))
            })),
        });
        self
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    pub async fn route(&self, req: Request<Incoming>, state: AppState) -> HttpResponse {
        let method = req.method().clone();
        let path = normalize_path(req.uri().path()).to_string();

        let claims = match state.gate.check(&method, &path, req.headers(), unix_now()) {
            Ok(outcome) => outcome.into_claims(),
            Err(reason) => {
                warn!("Rejected {} {}: {}", method, path, reason);
                return ApiError::Unauthorized.into_response();
            }
        };

        for route in &self.routes {
            if route.method != method || !Self::path_matches(&route.path, &path) {
                continue;
            }

            let result = match &route.kind {
                RouteKind::Open(h) => h(req, state, claims).await,

                RouteKind::Admin(h) => match claims {
                    Some(claims) => match authorize_admin(&claims) {
                        Authorization::Allowed => h(req, state, claims).await,
                        Authorization::Denied => {
                            warn!(
                                "Denied {} {} to {} (role {})",
                                method, path, claims.sub, claims.role
                            );
                            Err(ApiError::Forbidden)
                        }
                    },
                    // Only reachable when the exemption table exempts an
                    // admin route; no claims means no admin.
                    None => {
                        warn!("Admin route {} {} reached without credential", method, path);
                        Err(ApiError::Unauthorized)
                    }
                },
            };

            return result.unwrap_or_else(|err| {
                debug!("{} {} failed: {}", method, path, err);
                err.into_response()
            });
        }

        ApiError::not_found("Endpoint not found").into_response()
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        // Strip query string from incoming request path before comparing.
        let clean = request_path.split('?').next().unwrap_or(request_path);

        // Exact match.
        if route_path == clean {
            return true;
        }

        // Segment-by-segment matching for `:param` wildcards.
        // e.g.  "/products/:id"  matches  "/products/42"
        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return false;
        }

        route_segs
            .iter()
            .zip(path_segs.iter())
            .all(|(r, p)| (r.starts_with(':') && !p.is_empty()) || r == p)
    }
}

// ---------------------------------------------------------------------------
// API router
// ---------------------------------------------------------------------------

/// Every route the storefront serves. `api` is the configured base prefix,
/// e.g. `/api/v1`.
pub fn build_api_router(api: &str) -> Router {
    let users_base = format!("{}/users", api);
    let products_base = format!("{}/products", api);

    Router::new()
        .get("/health", |_req, _state, _claims| handle_health())
        // ── Users ────────────────────────────────────────────────────────────
        .post(&format!("{}/register", users_base), |req, state, _claims| {
            auth::handle_register(req, state)
        })
        .post(&format!("{}/login", users_base), |req, state, _claims| {
            auth::handle_login(req, state)
        })
        .post(&format!("{}/logout", users_base), |_req, _state, _claims| {
            auth::handle_logout()
        })
        .get(&users_base, |_req, state, _claims| users::handle_list_users(state))
        .get(&format!("{}/:id", users_base), |req, state, _claims| {
            users::handle_get_user(req, state)
        })
        .put(&format!("{}/userProfile/:id", users_base), |req, state, _claims| {
            users::handle_update_profile(req, state)
        })
        // ── Products ─────────────────────────────────────────────────────────
        .get(&products_base, |_req, state, _claims| {
            products::handle_list_products(state)
        })
        .post(&products_base, |req, state, _claims| {
            products::handle_create_product(req, state)
        })
        .put(&format!("{}/reactivate/:id", products_base), |req, state, _claims| {
            products::handle_reactivate_product(req, state)
        })
        .put(&format!("{}/:id", products_base), |req, state, _claims| {
            products::handle_update_product(req, state)
        })
        .delete_admin(&format!("{}/:id", products_base), |req, state, claims| {
            products::handle_delete_product(req, state, claims)
        })
}

async fn handle_health() -> ApiResult {
    Ok(deliver_serialized_json(&json!({ "status": "ok" }), StatusCode::OK)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_path_matches() {
        assert!(Router::path_matches("/api/v1/products", "/api/v1/products"));
    }

    #[test]
    fn different_paths_do_not_match() {
        assert!(!Router::path_matches("/api/v1/products", "/api/v1/users"));
    }

    #[test]
    fn trailing_slash_does_not_match_without_slash() {
        // `route` normalizes before matching; the matcher itself is strict.
        assert!(!Router::path_matches("/api/v1/products", "/api/v1/products/"));
    }

    #[test]
    fn root_path_matches_self() {
        assert!(Router::path_matches("/", "/"));
    }

    #[test]
    fn param_segment_matches_any_value() {
        assert!(Router::path_matches("/api/v1/products/:id", "/api/v1/products/42"));
        assert!(Router::path_matches(
            "/api/v1/users/userProfile/:id",
            "/api/v1/users/userProfile/abc-def"
        ));
    }

    #[test]
    fn param_segment_does_not_match_empty() {
        assert!(!Router::path_matches("/api/v1/products/:id", "/api/v1/products/"));
    }

    #[test]
    fn param_does_not_span_segments() {
        assert!(!Router::path_matches("/api/v1/products/:id", "/api/v1/products/a/b"));
    }

    #[test]
    fn reactivate_and_id_routes_are_distinct() {
        assert!(Router::path_matches(
            "/api/v1/products/reactivate/:id",
            "/api/v1/products/reactivate/42"
        ));
        assert!(!Router::path_matches(
            "/api/v1/products/:id",
            "/api/v1/products/reactivate/42"
        ));
    }

    #[test]
    fn query_string_is_ignored() {
        assert!(Router::path_matches("/api/v1/products", "/api/v1/products?page=2"));
    }

    #[test]
    fn api_router_registers_every_route() {
        let router = build_api_router("/api/v1");
        assert_eq!(router.routes.len(), 12);
        assert_eq!(
            router
                .routes
                .iter()
                .filter(|r| matches!(r.kind, RouteKind::Admin(_)))
                .map(|r| (r.method.clone(), r.path.as_str()))
                .collect::<Vec<_>>(),
            vec![(Method::DELETE, "/api/v1/products/:id")]
        );
    }
}
