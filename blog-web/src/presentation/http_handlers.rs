use crate::application::{AuthService, BlogService};
use crate::domain::{BlogError, CredentialsForm, CurrentUser, PostForm};
use crate::presentation::middleware::SESSION_COOKIE;
use crate::presentation::routes::{INDEX_PATH, LOGIN_PATH};
use crate::presentation::views::{self, Page};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

fn render(page: Page<'_>, user: Option<&CurrentUser>, flash: Option<&str>) -> HttpResponse {
    tracing::debug!("Rendering {}", page.name());

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(views::render(&page, user, flash))
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

// ============== Post Handlers ==============

pub async fn index(
    blog_service: web::Data<Arc<BlogService>>,
    user: Option<CurrentUser>,
) -> Result<HttpResponse, BlogError> {
    tracing::info!("Listing posts");

    let posts = blog_service.list_posts().await?;

    Ok(render(Page::Index { posts: &posts }, user.as_ref(), None))
}

pub async fn create_form(user: CurrentUser) -> HttpResponse {
    render(Page::Create, Some(&user), None)
}

pub async fn create_post(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, BlogError> {
    tracing::info!("Creating post for user_id={}", user.id);

    match blog_service.create_post(&user, form.into_inner()).await {
        Ok(_) => Ok(redirect(INDEX_PATH)),
        Err(BlogError::Validation(msg)) => {
            Ok(render(Page::Create, Some(&user), Some(msg.as_str())))
        }
        Err(err) => Err(err),
    }
}

pub async fn update_form(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, BlogError> {
    let post = blog_service.get_post(path.into_inner(), &user, true).await?;

    Ok(render(Page::Update { post: &post }, Some(&user), None))
}

/// The post is looked up before the submitted form is examined, so a
/// missing post or a non-author is rejected ahead of any validation.
pub async fn update_post(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
    path: web::Path<i64>,
    form: Result<web::Form<PostForm>, actix_web::Error>,
) -> actix_web::Result<HttpResponse> {
    let post_id = path.into_inner();

    tracing::info!("Updating post id={} for user_id={}", post_id, user.id);

    let post = blog_service.get_post(post_id, &user, true).await?;
    let form = form?.into_inner();

    match blog_service.update_post(&post, form).await {
        Ok(()) => Ok(redirect(INDEX_PATH)),
        Err(BlogError::Validation(msg)) => {
            Ok(render(Page::Update { post: &post }, Some(&user), Some(msg.as_str())))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_post(
    blog_service: web::Data<Arc<BlogService>>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, BlogError> {
    let post_id = path.into_inner();

    tracing::info!("Deleting post id={} for user_id={}", post_id, user.id);

    blog_service.delete_post(post_id, &user).await?;

    Ok(redirect(INDEX_PATH))
}

// ============== Auth Handlers ==============

pub async fn register_form(user: Option<CurrentUser>) -> HttpResponse {
    render(Page::Register, user.as_ref(), None)
}

pub async fn register(
    auth_service: web::Data<Arc<AuthService>>,
    form: web::Form<CredentialsForm>,
) -> Result<HttpResponse, BlogError> {
    match auth_service.register(form.into_inner()).await {
        Ok(_) => Ok(redirect(LOGIN_PATH)),
        Err(err) if err.is_form_error() => {
            Ok(render(Page::Register, None, Some(err.to_string().as_str())))
        }
        Err(err) => Err(err),
    }
}

pub async fn login_form(user: Option<CurrentUser>) -> HttpResponse {
    render(Page::Login, user.as_ref(), None)
}

pub async fn login(
    auth_service: web::Data<Arc<AuthService>>,
    form: web::Form<CredentialsForm>,
) -> Result<HttpResponse, BlogError> {
    match auth_service.login(form.into_inner()).await {
        Ok((token, _user)) => {
            let cookie = Cookie::build(SESSION_COOKIE, token)
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish();

            Ok(HttpResponse::SeeOther()
                .cookie(cookie)
                .insert_header((header::LOCATION, INDEX_PATH))
                .finish())
        }
        Err(err) if err.is_form_error() => {
            Ok(render(Page::Login, None, Some(err.to_string().as_str())))
        }
        Err(err) => Err(err),
    }
}

pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::SeeOther()
        .cookie(cookie)
        .insert_header((header::LOCATION, INDEX_PATH))
        .finish()
}
