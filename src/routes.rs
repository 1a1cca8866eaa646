use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::Rol;
use crate::context::AppContext;
use crate::entities::{EntitySpec, Schema, ENTITIES};
use crate::handlers::{resource, system, usuarios, ResourceState};
use crate::middleware::{require_auth, require_roles, AllowedRoles};

pub fn app(ctx: AppContext) -> Router {
    // Protected API: every entity route passes the auth gate first
    let api = ENTITIES
        .iter()
        .fold(Router::new(), |router, spec| router.merge(resource_routes(&ctx, *spec)))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), require_auth));

    let public = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/api/v1/usuarios/login", post(usuarios::login))
        .with_state(ctx.clone());

    let mut app = public.merge(api).layer(cors_layer(&ctx.config.security.cors_origins));
    if ctx.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn guarded(route: MethodRouter<ResourceState>, roles: &'static [Rol]) -> MethodRouter<ResourceState> {
    route.layer(middleware::from_fn_with_state(AllowedRoles(roles), require_roles))
}

fn resource_routes(ctx: &AppContext, spec: &'static EntitySpec) -> Router {
    let access = &spec.access;
    let (create, update) = match spec.schema {
        Schema::Usuario => (post(usuarios::create), put(usuarios::update)),
        _ => (post(resource::create), put(resource::update)),
    };

    let collection = guarded(get(resource::list), access.read).merge(guarded(create, access.write));
    let mut item = guarded(get(resource::show), access.read).merge(guarded(update, access.write));
    if let Some(roles) = access.delete {
        item = item.merge(guarded(delete(resource::delete), roles));
    }

    Router::new()
        .route(&format!("/api/v1/{}", spec.path), collection)
        .route(&format!("/api/v1/{}/:id", spec.path), item)
        .with_state(ResourceState::new(ctx.clone(), spec))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
