//! Core types for the Ledgerly platform

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Plan limits
// =============================================================================

/// Sentinel value meaning "no limit" on a profile counter
pub const UNLIMITED: i32 = -1;

/// Free-tier monthly transaction cap
pub const FREE_TRANSACTION_LIMIT: i32 = 50;

/// Free-tier concurrent budget cap
pub const FREE_BUDGET_LIMIT: i32 = 3;

// =============================================================================
// Enums
// =============================================================================

/// Subscription plan for billing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Default for Plan {
    fn default() -> Self {
        Self::Free
    }
}

impl Plan {
    /// Parse a plan tag from a checkout selector. Only the paid plans are
    /// selectable; "free" and unrecognized tags return None.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pro" => Some(Self::Pro),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Monthly transaction limit for this plan
    pub fn transaction_limit(&self) -> i32 {
        match self {
            Self::Free => FREE_TRANSACTION_LIMIT,
            Self::Pro | Self::Enterprise => UNLIMITED,
        }
    }

    /// Concurrent budget limit for this plan
    pub fn budget_limit(&self) -> i32 {
        match self {
            Self::Free => FREE_BUDGET_LIMIT,
            Self::Pro | Self::Enterprise => UNLIMITED,
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// Per-user subscription profile
///
/// Created lazily on first checkout. The limit columns are always derived
/// from `plan`: free pairs with the bounded defaults, paid plans pair with
/// the unlimited sentinel. Mutations go through single UPDATE statements
/// that set both together, so the pairing holds after every write.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub plan: Plan,
    pub transaction_limit: i32,
    pub budget_limit: i32,
    /// Empty until the first successful checkout
    pub stripe_customer_id: String,
    /// Empty until the first successful checkout; cleared when the
    /// subscription is deleted
    pub stripe_subscription_id: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserProfile {
    pub fn has_stripe_customer(&self) -> bool {
        !self.stripe_customer_id.is_empty()
    }

    /// True when the limit columns match what the plan dictates
    pub fn limits_consistent(&self) -> bool {
        self.transaction_limit == self.plan.transaction_limit()
            && self.budget_limit == self.plan.budget_limit()
    }
}
