use soroban_sdk::{contracttype, Address, BytesN, String};

/// Unit in which a subscription's `period_count` is expressed.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeUnit {
    Month,
    Day,
    Hour,
}

/// Lifecycle of a subscription. `Cancelled` is terminal.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

/// Who has to authorize a provider registration.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegistrationPolicy {
    /// The account being registered signs for itself.
    SelfService,
    /// The contract admin signs every registration.
    AdminOnly,
}

/// Whether a cancelled (subscriber, provider, reference) triple may be reused.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResubscribePolicy {
    Blocked,
    AllowAfterCancel,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Provider {
    pub registered_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscription {
    pub id: BytesN<32>,
    pub subscriber: Address,
    pub provider: Address,
    pub external_reference: String,
    pub amount: i128,
    pub next_payment_date: u64,
    pub time_unit: TimeUnit,
    pub period_count: u32,
    pub token: Address,
    pub status: SubscriptionStatus,
}

/// Outcome of one entry of a batched `execute_payments` call.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaymentResult {
    pub id: BytesN<32>,
    pub success: bool,
    pub error_code: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    PendingAdmin,
    TransferExpiry,
    RegistrationPolicy,
    ResubscribePolicy,
    Provider(Address),                // provider -> Provider
    Subscription(BytesN<32>),         // id -> Subscription
    SubscriberSubscriptions(Address), // subscriber -> Vec<id>
    PaymentLock(BytesN<32>),
}
