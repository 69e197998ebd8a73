use soroban_sdk::{contractevent, Address, BytesN};

use crate::types::{RegistrationPolicy, ResubscribePolicy};

// admin events
#[contractevent]
pub struct AdminTransferInitiated {
    pub new_admin: Address,
}

#[contractevent]
pub struct AdminTransferred {
    pub new_admin: Address,
}

#[contractevent]
pub struct RegistrationPolicyUpdated {
    pub policy: RegistrationPolicy,
}

#[contractevent]
pub struct ResubscribePolicyUpdated {
    pub policy: ResubscribePolicy,
}

// provider events
#[contractevent]
pub struct ProviderRegistered {
    #[topic]
    pub provider: Address,
}

// subscription events
#[contractevent]
pub struct SubscriptionCreated {
    #[topic]
    pub id: BytesN<32>,
    pub subscriber: Address,
    pub provider: Address,
    pub amount: i128,
    pub next_payment_date: u64,
}

#[contractevent]
pub struct SubscriptionCancelled {
    #[topic]
    pub id: BytesN<32>,
}

#[contractevent]
pub struct PaymentExecuted {
    #[topic]
    pub id: BytesN<32>,
    pub amount: i128,
    pub next_payment_date: u64,
}
