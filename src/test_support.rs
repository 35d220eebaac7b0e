//! In-memory identity service used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    client::{ClientError, IdentityClient, IssuedToken, TokenPair},
    identity::Identity,
    scopes::Scopes,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Calls {
    pub validate: usize,
    pub authorize: usize,
    pub get_identity: usize,
    pub refresh: usize,
    pub invalidate: usize,
}

struct Account {
    password: String,
    access_token: String,
}

#[derive(Default)]
pub struct FakeIdentityClient {
    identities: HashMap<String, Identity>,
    accounts: HashMap<String, Account>,
    fail_identity: bool,
    fail_validate: bool,
    fail_authorize: bool,
    fail_invalidate: bool,
    validate: AtomicUsize,
    authorize: AtomicUsize,
    get_identity: AtomicUsize,
    refresh: AtomicUsize,
    invalidate: AtomicUsize,
    sent_scopes: Mutex<Vec<String>>,
    invalidated: Mutex<Vec<String>>,
}

fn unavailable(operation: &str) -> ClientError {
    ClientError::Status {
        url: format!("http://identity.test/{operation}"),
        status: 503,
        message: "unavailable".to_string(),
    }
}

fn pair(access_token: &str) -> TokenPair {
    TokenPair {
        access_token: IssuedToken {
            value: access_token.to_string(),
            expires_at: None,
        },
        refresh_token: IssuedToken {
            value: format!("refresh-{access_token}"),
            expires_at: None,
        },
    }
}

impl FakeIdentityClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: &str, identity: Identity) -> Self {
        self.identities.insert(token.to_string(), identity);
        self
    }

    /// Account whose successful authorization issues `access_token`.
    pub fn with_account(mut self, email: &str, password: &str, access_token: &str) -> Self {
        self.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                access_token: access_token.to_string(),
            },
        );
        self
    }

    pub fn failing_identity(mut self) -> Self {
        self.fail_identity = true;
        self
    }

    pub fn failing_validate(mut self) -> Self {
        self.fail_validate = true;
        self
    }

    pub fn failing_authorize(mut self) -> Self {
        self.fail_authorize = true;
        self
    }

    pub fn failing_invalidate(mut self) -> Self {
        self.fail_invalidate = true;
        self
    }

    pub fn calls(&self) -> Calls {
        Calls {
            validate: self.validate.load(Ordering::SeqCst),
            authorize: self.authorize.load(Ordering::SeqCst),
            get_identity: self.get_identity.load(Ordering::SeqCst),
            refresh: self.refresh.load(Ordering::SeqCst),
            invalidate: self.invalidate.load(Ordering::SeqCst),
        }
    }

    pub fn sent_scopes(&self) -> Vec<String> {
        self.sent_scopes.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn check_password(&self, email: &str, password: &str) -> Option<&Account> {
        self.accounts
            .get(email)
            .filter(|account| account.password == password)
    }
}

impl IdentityClient for FakeIdentityClient {
    async fn validate_credentials(&self, email: &str, password: &str) -> Result<bool, ClientError> {
        self.validate.fetch_add(1, Ordering::SeqCst);
        if self.fail_validate {
            return Err(unavailable("validate"));
        }
        Ok(self.check_password(email, password).is_some())
    }

    async fn authorize_by_credentials(
        &self,
        email: &str,
        password: &str,
        scopes: &Scopes,
    ) -> Result<TokenPair, ClientError> {
        self.authorize.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut sent) = self.sent_scopes.lock() {
            sent.push(scopes.serialize());
        }
        if self.fail_authorize {
            return Err(unavailable("authorize"));
        }
        self.check_password(email, password)
            .map(|account| pair(&account.access_token))
            .ok_or_else(|| ClientError::Status {
                url: "http://identity.test/authorize".to_string(),
                status: 401,
                message: "invalid credentials".to_string(),
            })
    }

    async fn get_identity(&self, access_token: &str) -> Result<Option<Identity>, ClientError> {
        self.get_identity.fetch_add(1, Ordering::SeqCst);
        if self.fail_identity {
            return Err(unavailable("identity"));
        }
        Ok(self.identities.get(access_token).cloned())
    }

    async fn refresh_token(
        &self,
        refresh_token: &str,
        _scopes: Option<&Scopes>,
    ) -> Result<TokenPair, ClientError> {
        self.refresh.fetch_add(1, Ordering::SeqCst);
        Ok(pair(&format!("{refresh_token}-renewed")))
    }

    async fn invalidate_token(&self, access_token: &str) -> Result<(), ClientError> {
        self.invalidate.fetch_add(1, Ordering::SeqCst);
        if self.fail_invalidate {
            return Err(unavailable("invalidate"));
        }
        if let Ok(mut invalidated) = self.invalidated.lock() {
            invalidated.push(access_token.to_string());
        }
        Ok(())
    }
}
