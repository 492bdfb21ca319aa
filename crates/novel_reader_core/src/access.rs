//! crates/novel_reader_core/src/access.rs
//!
//! Client routes and role-based gating.

use crate::domain::Role;
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Novels,
    Novel { id: String },
    Chapter { novel_id: String, chapter_id: String },
    About,
    Contact,
    Library,
    Login,
    Signup,
    /// Any page of the back office; holds the path below `/admin`.
    Admin(String),
    Forbidden,
    NotFound,
}

/// What a route demands from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    SignedIn,
    Role(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// The session is still being restored; show a loading state.
    Pending,
    RedirectToLogin,
    Forbidden,
}

impl Route {
    /// Parses a browser path. Query strings, fragments and trailing slashes are ignored.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["novels"] => Route::Novels,
            ["novel", id] => Route::Novel { id: id.to_string() },
            ["novel", novel_id, "chapter", chapter_id] => Route::Chapter {
                novel_id: novel_id.to_string(),
                chapter_id: chapter_id.to_string(),
            },
            ["about"] => Route::About,
            ["contact"] => Route::Contact,
            ["library"] => Route::Library,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["403"] => Route::Forbidden,
            ["admin", rest @ ..] => Route::Admin(rest.join("/")),
            _ => Route::NotFound,
        }
    }

    pub fn requirement(&self) -> Requirement {
        match self {
            Route::Library => Requirement::SignedIn,
            Route::Admin(_) => Requirement::Role(Role::Admin),
            _ => Requirement::Public,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Novels => "/novels".to_string(),
            Route::Novel { id } => format!("/novel/{}", id),
            Route::Chapter {
                novel_id,
                chapter_id,
            } => format!("/novel/{}/chapter/{}", novel_id, chapter_id),
            Route::About => "/about".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::Library => "/library".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Admin(rest) if rest.is_empty() => "/admin".to_string(),
            Route::Admin(rest) => format!("/admin/{}", rest),
            Route::Forbidden => "/403".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }
}

/// Decides whether the current session may open a route.
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(route: &Route, session: &SessionState) -> Access {
        let requirement = route.requirement();
        if requirement == Requirement::Public {
            return Access::Allow;
        }

        match session {
            SessionState::Unknown => Access::Pending,
            SessionState::Anonymous => Access::RedirectToLogin,
            SessionState::Authenticated(auth) => match requirement {
                Requirement::Role(Role::Admin) if auth.user.role != Role::Admin => Access::Forbidden,
                _ => Access::Allow,
            },
        }
    }
}
