//! Authentication seam.

use crate::error::ClientResult;
use async_trait::async_trait;
use jotpad_core::UserId;
use tokio::sync::watch;

/// An authenticated user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub uid: UserId,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl User {
    pub fn new(uid: UserId, display_name: impl Into<String>) -> Self {
        Self {
            uid,
            display_name: display_name.into(),
            photo_url: None,
        }
    }
}

/// Identity provider.
///
/// Session changes are announced through [`subscribe`](Self::subscribe); the
/// receiver always holds the current session.
#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    async fn sign_in(&self) -> ClientResult<User>;

    async fn sign_out(&self) -> ClientResult<()>;

    fn subscribe(&self) -> watch::Receiver<Option<User>>;
}

/// Auth provider for a single pre-provisioned identity.
pub struct LocalAuth {
    identity: User,
    session: watch::Sender<Option<User>>,
}

impl LocalAuth {
    /// Starts signed out.
    pub fn new(identity: User) -> Self {
        let (session, _) = watch::channel(None);
        Self { identity, session }
    }

    pub fn current(&self) -> Option<User> {
        self.session.borrow().clone()
    }
}

#[async_trait]
impl AuthService for LocalAuth {
    async fn sign_in(&self) -> ClientResult<User> {
        self.session.send_replace(Some(self.identity.clone()));
        tracing::info!(uid = %self.identity.uid, "Signed in");
        Ok(self.identity.clone())
    }

    async fn sign_out(&self) -> ClientResult<()> {
        if self.session.send_replace(None).is_some() {
            tracing::info!(uid = %self.identity.uid, "Signed out");
        }
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_auth_announces_session_changes() {
        let auth = LocalAuth::new(User::new(UserId::parse("u1").unwrap(), "Ada"));
        let mut rx = auth.subscribe();
        assert!(rx.borrow_and_update().is_none());

        let user = auth.sign_in().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref(), Some(&user));

        auth.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(auth.current().is_none());
    }
}
