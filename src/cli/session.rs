use async_trait::async_trait;

/// Calls the owner flow needs from the server.
#[async_trait]
pub trait OwnerApi: Send + Sync {
    async fn is_owner(&self, token: Option<&str>) -> anyhow::Result<bool>;

    /// Password sign-in; returns the access token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, LoginError>;

    async fn sign_out(&self, token: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("{0}")]
    Rejected(String),

    #[error("Login failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Checking,
    Owner,
    Visitor,
}

/// Client-side owner state: `Unauthenticated → Checking → {Owner, Visitor}`.
///
/// The owner flag is only ever the answer to the latest `is-owner` query;
/// every auth change re-asks.
pub struct OwnerSession<A: OwnerApi> {
    api: A,
    token: Option<String>,
    state: SessionState,
    login_open: bool,
}

impl<A: OwnerApi> OwnerSession<A> {
    pub fn new(api: A, token: Option<String>) -> Self {
        Self {
            api,
            token,
            state: SessionState::Unauthenticated,
            login_open: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_owner(&self) -> bool {
        self.state == SessionState::Owner
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn login_open(&self) -> bool {
        self.login_open
    }

    /// What the hidden key chord does.
    pub fn open_login(&mut self) {
        self.login_open = true;
    }

    pub fn close_login(&mut self) {
        self.login_open = false;
    }

    /// Re-query the owner check. A failed query counts as visitor.
    pub async fn refresh(&mut self) -> SessionState {
        self.state = SessionState::Checking;
        self.state = match self.api.is_owner(self.token.as_deref()).await {
            Ok(true) => SessionState::Owner,
            Ok(false) => SessionState::Visitor,
            Err(e) => {
                tracing::warn!("Owner check failed: {}", e);
                SessionState::Visitor
            }
        };
        self.state
    }

    /// Sign in, close the prompt, then re-check ownership. Failures come back
    /// as values and leave the prompt open.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<SessionState, LoginError> {
        let token = self.api.sign_in(email, password).await?;
        self.token = Some(token);
        self.login_open = false;
        Ok(self.refresh().await)
    }

    /// Sign out at the provider (best effort) and drop local state.
    pub async fn logout(&mut self) {
        if let Some(token) = self.token.take() {
            if let Err(e) = self.api.sign_out(&token).await {
                tracing::warn!("Sign-out failed: {}", e);
            }
        }
        self.login_open = false;
        self.state = SessionState::Unauthenticated;
    }
}
