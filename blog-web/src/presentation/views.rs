//! Server-rendered HTML pages.
//!
//! Every handler names a [`Page`] and hands it the data it needs; [`render`]
//! wraps it in the shared layout with the navigation for the current user
//! and any flashed message.

use std::fmt::{self, Display, Formatter};

use crate::domain::{CurrentUser, PostWithAuthor};

pub enum Page<'a> {
    Index { posts: &'a [PostWithAuthor] },
    Create,
    Update { post: &'a PostWithAuthor },
    Login,
    Register,
}

impl Page<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Index { .. } => "blog/index",
            Page::Create => "blog/create",
            Page::Update { .. } => "blog/update",
            Page::Login => "auth/login",
            Page::Register => "auth/register",
        }
    }

    fn write_title(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Page::Index { .. } => f.write_str("Posts"),
            Page::Create => f.write_str("New Post"),
            Page::Update { post } => write!(f, "Edit \"{}\"", Escaped(&post.title)),
            Page::Login => f.write_str("Log In"),
            Page::Register => f.write_str("Register"),
        }
    }
}

pub fn render(page: &Page<'_>, user: Option<&CurrentUser>, flash: Option<&str>) -> String {
    Document { page, user, flash }.to_string()
}

/// A page inside the shared layout.
struct Document<'a> {
    page: &'a Page<'a>,
    user: Option<&'a CurrentUser>,
    flash: Option<&'a str>,
}

impl Display for Document<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>")?;
        self.page.write_title(f)?;
        f.write_str(" - Blog</title></head>\n<body>\n")?;

        f.write_str("<nav>\n  <h1><a href=\"/\">Blog</a></h1>\n  <ul>\n")?;
        match self.user {
            Some(user) => write!(
                f,
                "    <li><span>{}</span></li>\n    <li><a href=\"/auth/logout\">Log Out</a></li>\n",
                Escaped(&user.username)
            )?,
            None => f.write_str(
                "    <li><a href=\"/auth/register\">Register</a></li>\n    <li><a href=\"/auth/login\">Log In</a></li>\n",
            )?,
        }
        f.write_str("  </ul>\n</nav>\n<section class=\"content\">\n")?;

        f.write_str("<header><h1>")?;
        self.page.write_title(f)?;
        f.write_str("</h1>")?;
        if let (Page::Index { .. }, Some(_)) = (self.page, self.user) {
            f.write_str("<a class=\"action\" href=\"/create\">New</a>")?;
        }
        f.write_str("</header>\n")?;

        if let Some(message) = self.flash {
            writeln!(f, "<div class=\"flash\">{}</div>", Escaped(message))?;
        }

        match self.page {
            Page::Index { posts } => index_body(f, posts, self.user)?,
            Page::Create => post_form(f, "", "", "Save")?,
            Page::Update { post } => {
                post_form(f, &post.title, &post.body, "Save")?;
                f.write_str("<hr>\n")?;
                writeln!(
                    f,
                    "<form action=\"/{}/delete\" method=\"post\">\n  <input class=\"danger\" type=\"submit\" value=\"Delete\" onclick=\"return confirm('Are you sure?');\">\n</form>",
                    post.id
                )?;
            }
            Page::Login => credentials_form(f, "Log In")?,
            Page::Register => credentials_form(f, "Register")?,
        }

        f.write_str("</section>\n</body>\n</html>\n")
    }
}

fn index_body(
    f: &mut Formatter<'_>,
    posts: &[PostWithAuthor],
    user: Option<&CurrentUser>,
) -> fmt::Result {
    for (i, post) in posts.iter().enumerate() {
        if i > 0 {
            f.write_str("<hr>\n")?;
        }
        write!(
            f,
            "<article class=\"post\">\n  <header>\n    <div>\n      <h1>{}</h1>\n      <div class=\"about\">by {} on {}</div>\n    </div>\n",
            Escaped(&post.title),
            Escaped(&post.username),
            post.created.format("%Y-%m-%d")
        )?;
        if user.is_some_and(|u| u.id == post.author_id) {
            writeln!(
                f,
                "    <a class=\"action\" href=\"/{}/update\">Edit</a>",
                post.id
            )?;
        }
        write!(
            f,
            "  </header>\n  <p class=\"body\">{}</p>\n</article>\n",
            Escaped(&post.body)
        )?;
    }
    Ok(())
}

fn post_form(f: &mut Formatter<'_>, title: &str, body: &str, submit: &str) -> fmt::Result {
    write!(
        f,
        "<form method=\"post\">\n  <label for=\"title\">Title</label>\n  <input name=\"title\" id=\"title\" value=\"{}\" required>\n  <label for=\"body\">Body</label>\n  <textarea name=\"body\" id=\"body\">{}</textarea>\n  <input type=\"submit\" value=\"{}\">\n</form>\n",
        Escaped(title),
        Escaped(body),
        submit
    )
}

fn credentials_form(f: &mut Formatter<'_>, submit: &str) -> fmt::Result {
    write!(
        f,
        "<form method=\"post\">\n  <label for=\"username\">Username</label>\n  <input name=\"username\" id=\"username\" required>\n  <label for=\"password\">Password</label>\n  <input type=\"password\" name=\"password\" id=\"password\" required>\n  <input type=\"submit\" value=\"{}\">\n</form>\n",
        submit
    )
}

/// Text with the HTML-significant characters replaced by entities.
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..pos])?;
            let entity = match rest.as_bytes()[pos] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            };
            f.write_str(entity)?;
            rest = &rest[pos + 1..];
        }
        f.write_str(rest)
    }
}
