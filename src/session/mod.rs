//! Per-visitor interactive state: which page is showing and who is signed in.

mod credentials;
mod store;

pub use credentials::{
    CredentialPolicy, LoginError, default_student_ranges, parse_student_ranges,
};
pub use store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Admin,
    User,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Login => "login",
            Page::Admin => "admin",
            Page::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Landing page for a freshly signed-in role.
    pub fn home_page(&self) -> Page {
        match self {
            Role::Admin => Page::Admin,
            Role::User => Page::User,
        }
    }
}

/// State machine with three states: `login`, `admin` and `user`.
///
/// Only `login` accepts credentials; both signed-in states return to
/// `login` on logout. A failed attempt never changes the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    page: Page,
    authenticated: bool,
    role: Option<Role>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            page: Page::Login,
            authenticated: false,
            role: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.authenticated && self.role == Some(Role::Admin)
    }

    pub fn login(
        &mut self,
        policy: &CredentialPolicy,
        identifier: &str,
        secret: &str,
    ) -> Result<Role, LoginError> {
        if self.page != Page::Login {
            return Err(LoginError::AlreadySignedIn);
        }

        let role = policy.authenticate(identifier, secret)?;
        self.page = role.home_page();
        self.authenticated = true;
        self.role = Some(role);
        Ok(role)
    }

    pub fn logout(&mut self) {
        self.page = Page::Login;
        self.authenticated = false;
        self.role = None;
    }
}
