use axum::{Router, routing::get};

use crate::middleware::pipeline;
use crate::modules::auth::router::init_auth_router;
use crate::state::AppState;

/// Every route served by [`init_routes`], with path parameters as `{name}`.
pub const ROUTE_TEMPLATES: [&str; 7] = [
    "/health",
    "/auth/login",
    "/auth/logout",
    "/auth/password",
    "/auth/forgot-password",
    "/auth/reset-password/{token}",
    "/auth/me",
];

/// Label for paths that match no known route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Maps a request path onto its route template.
///
/// The pipeline runs before routing, so this is what logs and metrics use
/// instead of the raw path. Path parameters (reset tokens among them) never
/// appear in the label, and the label set stays bounded.
pub fn route_label(path: &str) -> &'static str {
    ROUTE_TEMPLATES
        .iter()
        .find(|template| matches_template(template, path))
        .copied()
        .unwrap_or(UNMATCHED_ROUTE)
}

fn matches_template(template: &str, path: &str) -> bool {
    let mut expected = template.split('/');
    let mut actual = path.split('/');

    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(e), Some(a)) if e.starts_with('{') => {
                if a.is_empty() {
                    return false;
                }
            }
            (Some(e), Some(a)) if e == a => {}
            _ => return false,
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Routes without the pipeline.
pub fn init_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", init_auth_router())
        .with_state(state)
}

/// Wraps `routes` in the request pipeline.
pub fn with_pipeline(state: &AppState, routes: Router) -> Router {
    let chain = pipeline(state);
    tracing::debug!(stages = ?chain.request_order(), "Request pipeline assembled");
    Router::new().fallback_service(chain.then(routes))
}

pub fn init_router(state: AppState) -> Router {
    let routes = init_routes(state.clone());
    with_pipeline(&state, routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label_known_routes() {
        assert_eq!(route_label("/health"), "/health");
        assert_eq!(route_label("/auth/login"), "/auth/login");
        assert_eq!(route_label("/auth/me"), "/auth/me");
    }

    #[test]
    fn test_route_label_hides_path_parameters() {
        assert_eq!(
            route_label("/auth/reset-password/871825a8f3c2c7ab"),
            "/auth/reset-password/{token}"
        );
        assert_eq!(route_label("/auth/reset-password/"), UNMATCHED_ROUTE);
    }

    #[test]
    fn test_route_label_unknown_paths_share_one_label() {
        assert_eq!(route_label("/"), UNMATCHED_ROUTE);
        assert_eq!(route_label("/auth/login/extra"), UNMATCHED_ROUTE);
        assert_eq!(route_label("/teachers/42"), UNMATCHED_ROUTE);
    }
}
