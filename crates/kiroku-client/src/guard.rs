use crate::routes::Route;
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Session not loaded yet; render nothing and do not redirect.
    Pending,
    Redirect(&'static str),
}

/// Keeps guests out of admin screens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(route: &Route, state: &SessionState) -> GuardDecision {
        if !route.is_admin() {
            return GuardDecision::Allow;
        }
        match state {
            SessionState::Unknown => GuardDecision::Pending,
            SessionState::Guest => GuardDecision::Redirect(Route::SIGN_IN_PATH),
            SessionState::Authenticated(_) => GuardDecision::Allow,
        }
    }
}
