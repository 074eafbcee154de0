//! # Session State
//!
//! Who is logged in on this terminal, and where the current checkout is.

use std::sync::{Arc, Mutex};

use acaizen_core::checkout::{CheckoutState, Operator};
use acaizen_core::UserAccount;

#[derive(Debug, Default)]
struct Session {
    user: Option<UserAccount>,
    checkout: CheckoutState,
}

/// Operator session plus the checkout state machine.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<Session>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.inner.lock().expect("Session mutex poisoned");
        f(&mut session)
    }

    pub fn current_user(&self) -> Option<UserAccount> {
        self.with(|s| s.user.clone())
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.with(|s| s.user.as_ref().map(|u| u.id.clone()))
    }

    /// The logged-in user as recorded on a sale.
    pub fn operator(&self) -> Option<Operator> {
        self.with(|s| {
            s.user.as_ref().map(|u| Operator {
                id: u.id.clone(),
                name: u.name.clone(),
            })
        })
    }

    /// Replaces the logged-in user and resets the checkout.
    pub fn sign_in(&self, user: UserAccount) {
        self.with(|s| {
            s.user = Some(user);
            s.checkout = CheckoutState::Idle;
        });
    }

    /// Replaces the stored copy of the logged-in user after an edit.
    ///
    /// The checkout is left as it is. Does nothing when `user` is not the
    /// one logged in.
    pub fn refresh_user(&self, user: UserAccount) {
        self.with(|s| {
            if s.user.as_ref().is_some_and(|current| current.id == user.id) {
                s.user = Some(user);
            }
        });
    }

    pub fn sign_out(&self) {
        self.with(|s| {
            s.user = None;
            s.checkout = CheckoutState::Idle;
        });
    }

    pub fn checkout_state(&self) -> CheckoutState {
        self.with(|s| s.checkout.clone())
    }

    /// Starts a checkout attempt; refused while another one is running.
    pub fn begin_checkout(&self) -> acaizen_core::CoreResult<()> {
        self.with(|s| s.checkout.begin())
    }

    pub fn set_checkout(&self, state: CheckoutState) {
        self.with(|s| s.checkout = state);
    }
}
