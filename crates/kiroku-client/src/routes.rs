use kiroku_api_types::{CategoryId, PostId};

/// Screens of the blog front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Post(PostId),
    Contact,
    SignIn,
    SignUp,
    AdminPosts,
    AdminNewPost,
    AdminPost(PostId),
    AdminCategories,
    AdminNewCategory,
    AdminCategory(CategoryId),
}

impl Route {
    pub const SIGN_IN_PATH: &'static str = "/sign_in";

    /// Parses a path; trailing slashes and query strings are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Self::Home,
            ["posts", id] => Self::Post(id.parse().ok()?),
            ["contact"] => Self::Contact,
            ["sign_in"] => Self::SignIn,
            ["sign_up"] => Self::SignUp,
            ["admin", "posts"] => Self::AdminPosts,
            ["admin", "posts", "new"] => Self::AdminNewPost,
            ["admin", "posts", id] => Self::AdminPost(id.parse().ok()?),
            ["admin", "categories"] => Self::AdminCategories,
            ["admin", "categories", "new"] => Self::AdminNewCategory,
            ["admin", "categories", id] => Self::AdminCategory(id.parse().ok()?),
            _ => return None,
        };
        Some(route)
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminPosts
                | Self::AdminNewPost
                | Self::AdminPost(_)
                | Self::AdminCategories
                | Self::AdminNewCategory
                | Self::AdminCategory(_)
        )
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Post(id) => format!("/posts/{id}"),
            Self::Contact => "/contact".to_string(),
            Self::SignIn => Self::SIGN_IN_PATH.to_string(),
            Self::SignUp => "/sign_up".to_string(),
            Self::AdminPosts => "/admin/posts".to_string(),
            Self::AdminNewPost => "/admin/posts/new".to_string(),
            Self::AdminPost(id) => format!("/admin/posts/{id}"),
            Self::AdminCategories => "/admin/categories".to_string(),
            Self::AdminNewCategory => "/admin/categories/new".to_string(),
            Self::AdminCategory(id) => format!("/admin/categories/{id}"),
        }
    }
}
