use crate::presentation::http_handlers;
use crate::presentation::middleware::login_required;
use actix_web::middleware::from_fn;
use actix_web::web;

pub const INDEX_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/auth/login";

/// Route table. Expects `load_logged_in_user` to wrap the app so that
/// handlers and the login gate can see the current user.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes - authentication
        .service(
            web::scope("/auth")
                .route("/register", web::get().to(http_handlers::register_form))
                .route("/register", web::post().to(http_handlers::register))
                .route("/login", web::get().to(http_handlers::login_form))
                .route("/login", web::post().to(http_handlers::login))
                .route("/logout", web::get().to(http_handlers::logout)),
        )
        // Public routes - listing
        .route(INDEX_PATH, web::get().to(http_handlers::index))
        // Protected routes - write operations
        .service(
            web::resource("/create")
                .wrap(from_fn(login_required))
                .route(web::get().to(http_handlers::create_form))
                .route(web::post().to(http_handlers::create_post)),
        )
        .service(
            web::resource("/{id}/update")
                .wrap(from_fn(login_required))
                .route(web::get().to(http_handlers::update_form))
                .route(web::post().to(http_handlers::update_post)),
        )
        .service(
            web::resource("/{id}/delete")
                .wrap(from_fn(login_required))
                .route(web::post().to(http_handlers::delete_post))
                .route(web::delete().to(http_handlers::delete_post)),
        );
}
