//! Authentication lifecycle notifications.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::identity::HasIdentity;

#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent<U> {
    /// A credential login is about to be tried. Passwords are never carried.
    Attempting {
        guard: String,
        email: Option<String>,
        remember: bool,
    },
    Login {
        guard: String,
        user: U,
        remember: bool,
    },
    Logout {
        guard: String,
        user: Option<U>,
    },
}

impl<U> AuthEvent<U> {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Attempting { .. } => "attempting",
            Self::Login { .. } => "login",
            Self::Logout { .. } => "logout",
        }
    }

    #[must_use]
    pub fn guard(&self) -> &str {
        match self {
            Self::Attempting { guard, .. } | Self::Login { guard, .. } | Self::Logout { guard, .. } => {
                guard
            }
        }
    }
}

/// Receives lifecycle events. Fire-and-forget from the guard's side.
pub trait EventSink<U>: Send + Sync {
    fn dispatch(&self, event: AuthEvent<U>);
}

/// Writes every event as a structured `tracing` record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl<U: HasIdentity + Send + Sync> EventSink<U> for TracingEventSink {
    fn dispatch(&self, event: AuthEvent<U>) {
        match &event {
            AuthEvent::Attempting { guard, email, remember } => {
                info!(guard = %guard, email = ?email, remember, "authentication attempt");
            }
            AuthEvent::Login { guard, user, remember } => {
                info!(guard = %guard, user = %user.identifier(), remember, "login");
            }
            AuthEvent::Logout { guard, user } => {
                info!(
                    guard = %guard,
                    user = ?user.as_ref().map(HasIdentity::identifier),
                    "logout"
                );
            }
        }
    }
}

/// Forwards events to an unbounded channel for consumers outside the request.
#[derive(Clone, Debug)]
pub struct ChannelEventSink<U> {
    sender: UnboundedSender<AuthEvent<U>>,
}

impl<U> ChannelEventSink<U> {
    /// A sink and the receiving half of its channel.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<AuthEvent<U>>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl<U: Send + Sync> EventSink<U> for ChannelEventSink<U> {
    fn dispatch(&self, event: AuthEvent<U>) {
        let kind = event.kind();
        if self.sender.send(event).is_err() {
            warn!(kind, "auth event dropped, receiver closed");
        }
    }
}
