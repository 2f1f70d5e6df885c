use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use tillwise_domain::order::OrderStatus;
use tillwise_domain::role::Role;

/// Pure state-machine rejection. Returned by `domain::machine`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Target is not a legal next status in the global graph.
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    /// The edge is legal but the actor's role does not grant it.
    #[error("{role} may not move an order from {from} to {to}")]
    Forbidden {
        role: Role,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Engine error variants surfaced to request handlers.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("order status changed concurrently")]
    StaleState,
    #[error("session not found")]
    SessionNotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("staff invitation not accepted")]
    InvitationNotAccepted,
    #[error("order not found")]
    OrderNotFound,
    #[error("staff not found")]
    StaffNotFound,
    #[error("storage error")]
    Storage(#[from] anyhow::Error),
}

impl From<TransitionError> for EngineError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            forbidden @ TransitionError::Forbidden { .. } => Self::Forbidden(forbidden.to_string()),
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::StaleState => "STALE_STATE",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvitationNotAccepted => "INVITATION_NOT_ACCEPTED",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::StaffNotFound => "STAFF_NOT_FOUND",
            Self::Storage(_) => "STORAGE",
        }
    }

    /// Message shown to staff. Permission and workflow-state problems need
    /// different corrective action, so they never share wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => {
                "This action is not allowed from the order's current state."
            }
            Self::Forbidden(_) => "You do not have permission to do this.",
            Self::StaleState => "The order was changed by someone else. Refresh and try again.",
            Self::SessionNotFound => "Your session has already ended.",
            Self::Unauthorized => "Please sign in again.",
            Self::InvitationNotAccepted => "Accept your staff invitation before clocking in.",
            Self::OrderNotFound => "Order not found.",
            Self::StaffNotFound => "Staff member not found.",
            Self::Storage(_) => "Something went wrong. Please try again.",
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidTransition { .. } | Self::StaleState => StatusCode::CONFLICT,
            Self::Forbidden(_) | Self::InvitationNotAccepted => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::SessionNotFound | Self::OrderNotFound | Self::StaffNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Storage failures carry the anyhow chain; everything else is an expected outcome.
        if let Self::Storage(ref e) = self {
            tracing::error!(error = %e, kind = "STORAGE", "storage error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.user_message(),
        });
        (status, axum::Json(body)).into_response()
    }
}
