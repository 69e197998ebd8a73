#![no_std]

mod error;
mod events;
mod period;
mod registry;
mod store;
mod types;

use soroban_sdk::{contract, contractimpl, log, token, Address, BytesN, Env, String, Vec};

pub use error::Error;
pub use period::next_due_date;
pub use types::{
    PaymentResult, RegistrationPolicy, ResubscribePolicy, Subscription, SubscriptionStatus,
    TimeUnit,
};

use types::DataKey;

// RAII in-flight marker for one subscription - released when dropped.
// Held across the token call so the same id cannot be paid re-entrantly.
struct PaymentGuard<'a> {
    env: &'a Env,
    key: DataKey,
}

impl<'a> PaymentGuard<'a> {
    fn new(env: &'a Env, id: &BytesN<32>) -> Result<Self, Error> {
        let key = DataKey::PaymentLock(id.clone());
        if env.storage().persistent().has(&key) {
            return Err(Error::PaymentInProgress);
        }
        env.storage().persistent().set(&key, &true);
        Ok(PaymentGuard { env, key })
    }
}

impl<'a> Drop for PaymentGuard<'a> {
    fn drop(&mut self) {
        self.env.storage().persistent().remove(&self.key);
    }
}

#[contract]
pub struct SubscriptionEngine;

#[contractimpl]
impl SubscriptionEngine {
    pub fn __constructor(env: Env, admin: Address) {
        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::RegistrationPolicy, &RegistrationPolicy::SelfService);
        env.storage()
            .instance()
            .set(&DataKey::ResubscribePolicy, &ResubscribePolicy::Blocked);
    }

    // Admin functions

    pub fn admin(env: Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::AdminNotSet)
    }

    // Initiate admin transfer (step 1 of 2-step transfer)
    pub fn transfer_admin(
        env: Env,
        new_admin: Address,
        live_until_ledger: u32,
    ) -> Result<(), Error> {
        Self::require_admin(&env)?;

        if let Some(expiry) = env
            .storage()
            .instance()
            .get::<DataKey, u32>(&DataKey::TransferExpiry)
        {
            if env.ledger().sequence() <= expiry {
                return Err(Error::PendingAdminTransferExists);
            }
        }

        env.storage()
            .instance()
            .set(&DataKey::PendingAdmin, &new_admin);
        env.storage()
            .instance()
            .set(&DataKey::TransferExpiry, &live_until_ledger);

        events::AdminTransferInitiated { new_admin }.publish(&env);

        Ok(())
    }

    // Accept admin transfer (step 2 of 2-step transfer)
    pub fn accept_admin(env: Env) -> Result<(), Error> {
        let new_admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::PendingAdmin)
            .ok_or(Error::NoPendingAdminTransfer)?;

        new_admin.require_auth();

        let expiry: u32 = env
            .storage()
            .instance()
            .get(&DataKey::TransferExpiry)
            .ok_or(Error::NoPendingAdminTransfer)?;

        if env.ledger().sequence() > expiry {
            return Err(Error::AdminTransferExpired);
        }

        env.storage().instance().set(&DataKey::Admin, &new_admin);
        env.storage().instance().remove(&DataKey::PendingAdmin);
        env.storage().instance().remove(&DataKey::TransferExpiry);

        events::AdminTransferred { new_admin }.publish(&env);

        Ok(())
    }

    pub fn cancel_admin_transfer(env: Env) -> Result<(), Error> {
        Self::require_admin(&env)?;

        if !env.storage().instance().has(&DataKey::PendingAdmin) {
            return Err(Error::NoPendingAdminTransfer);
        }

        env.storage().instance().remove(&DataKey::PendingAdmin);
        env.storage().instance().remove(&DataKey::TransferExpiry);

        Ok(())
    }

    pub fn set_registration_policy(env: Env, policy: RegistrationPolicy) -> Result<(), Error> {
        Self::require_admin(&env)?;

        env.storage()
            .instance()
            .set(&DataKey::RegistrationPolicy, &policy);

        events::RegistrationPolicyUpdated { policy }.publish(&env);

        Ok(())
    }

    pub fn registration_policy(env: Env) -> RegistrationPolicy {
        env.storage()
            .instance()
            .get(&DataKey::RegistrationPolicy)
            .unwrap_or(RegistrationPolicy::SelfService)
    }

    pub fn set_resubscribe_policy(env: Env, policy: ResubscribePolicy) -> Result<(), Error> {
        Self::require_admin(&env)?;

        env.storage()
            .instance()
            .set(&DataKey::ResubscribePolicy, &policy);

        events::ResubscribePolicyUpdated { policy }.publish(&env);

        Ok(())
    }

    pub fn resubscribe_policy(env: Env) -> ResubscribePolicy {
        env.storage()
            .instance()
            .get(&DataKey::ResubscribePolicy)
            .unwrap_or(ResubscribePolicy::Blocked)
    }

    // Providers

    /// Registers `provider`. Under `SelfService` the provider signs for
    /// itself, under `AdminOnly` the admin signs instead.
    pub fn register(env: Env, provider: Address) -> Result<(), Error> {
        match Self::registration_policy(env.clone()) {
            RegistrationPolicy::SelfService => provider.require_auth(),
            RegistrationPolicy::AdminOnly => Self::require_admin(&env)?,
        }

        if let Err(e) = registry::register(&env, &provider) {
            log!(&env, "provider already registered", provider);
            return Err(e);
        }

        events::ProviderRegistered { provider }.publish(&env);

        Ok(())
    }

    pub fn is_registered(env: Env, account: Address) -> bool {
        registry::is_registered(&env, &account)
    }

    // Subscriptions

    /// Creates a subscription paid by `subscriber` to `provider`.
    ///
    /// No funds move here. The subscriber is expected to have approved this
    /// contract as spender on `token`; the allowance is only checked when a
    /// payment is executed.
    pub fn subscribe(
        env: Env,
        subscriber: Address,
        provider: Address,
        external_reference: String,
        amount: i128,
        start_date: u64,
        time_unit: TimeUnit,
        period_count: u32,
        token: Address,
    ) -> Result<BytesN<32>, Error> {
        subscriber.require_auth();

        if !registry::is_registered(&env, &provider) {
            log!(&env, "provider not registered", provider);
            return Err(Error::ProviderNotRegistered);
        }

        if amount <= 0 || period_count == 0 {
            return Err(Error::InvalidParameters);
        }

        let id = store::compute_id(&env, &subscriber, &provider, &external_reference);

        let subscription = Subscription {
            id: id.clone(),
            subscriber: subscriber.clone(),
            provider: provider.clone(),
            external_reference,
            amount,
            next_payment_date: start_date,
            time_unit,
            period_count,
            token,
            status: SubscriptionStatus::Active,
        };

        if store::exists(&env, &id) {
            let existing = store::get(&env, &id)?;
            let reusable = existing.status == SubscriptionStatus::Cancelled
                && Self::resubscribe_policy(env.clone()) == ResubscribePolicy::AllowAfterCancel;
            if !reusable {
                log!(&env, "duplicate subscription", id);
                return Err(Error::DuplicateSubscription);
            }
            store::update(&env, &subscription)?;
        } else {
            store::insert(&env, &subscription)?;
        }

        events::SubscriptionCreated {
            id: id.clone(),
            subscriber,
            provider,
            amount,
            next_payment_date: start_date,
        }
        .publish(&env);

        Ok(id)
    }

    pub fn cancel_subscription(
        env: Env,
        subscriber: Address,
        id: BytesN<32>,
    ) -> Result<(), Error> {
        subscriber.require_auth();

        let mut subscription = store::get(&env, &id)?;

        if subscription.subscriber != subscriber {
            log!(&env, "cancel rejected", subscriber, id);
            return Err(Error::Unauthorized);
        }

        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(Error::AlreadyCancelled);
        }

        subscription.status = SubscriptionStatus::Cancelled;
        store::update(&env, &subscription)?;

        events::SubscriptionCancelled { id }.publish(&env);

        Ok(())
    }

    /// Charges one billing cycle and moves the due date forward.
    pub fn execute_payment(env: Env, provider: Address, id: BytesN<32>) -> Result<(), Error> {
        provider.require_auth();
        Self::execute_payment_internal(&env, &provider, &id)
    }

    /// Charges several subscriptions for one provider. Every id is attempted
    /// on its own; a failure leaves that subscription untouched and the rest
    /// of the batch carries on. Results are returned in input order.
    pub fn execute_payments(
        env: Env,
        provider: Address,
        ids: Vec<BytesN<32>>,
    ) -> Vec<PaymentResult> {
        provider.require_auth();

        let mut results = Vec::new(&env);
        for id in ids.iter() {
            let result = match Self::execute_payment_internal(&env, &provider, &id) {
                Ok(()) => PaymentResult {
                    id,
                    success: true,
                    error_code: 0,
                },
                Err(e) => PaymentResult {
                    id,
                    success: false,
                    error_code: e as u32,
                },
            };
            results.push_back(result);
        }
        results
    }

    pub fn get_subscription(env: Env, id: BytesN<32>) -> Result<Subscription, Error> {
        store::get(&env, &id)
    }

    pub fn get_subscription_ids(env: Env, subscriber: Address) -> Vec<BytesN<32>> {
        store::list_by_subscriber(&env, &subscriber)
    }

    pub fn compute_id(
        env: Env,
        subscriber: Address,
        provider: Address,
        external_reference: String,
    ) -> BytesN<32> {
        store::compute_id(&env, &subscriber, &provider, &external_reference)
    }

    /// True when `execute_payment` would pass its status and date checks now.
    pub fn is_due(env: Env, id: BytesN<32>) -> Result<bool, Error> {
        let subscription = store::get(&env, &id)?;
        Ok(subscription.status == SubscriptionStatus::Active
            && env.ledger().timestamp() >= subscription.next_payment_date)
    }

    // Helper Functions

    fn require_admin(env: &Env) -> Result<(), Error> {
        let admin = Self::admin(env.clone())?;
        admin.require_auth();
        Ok(())
    }

    // All reads and checks happen before the token call; the record is
    // written only once the transfer has gone through.
    fn execute_payment_internal(
        env: &Env,
        provider: &Address,
        id: &BytesN<32>,
    ) -> Result<(), Error> {
        let mut subscription = store::get(env, id)?;

        if subscription.provider != *provider {
            log!(env, "payment rejected", provider.clone(), id.clone());
            return Err(Error::Unauthorized);
        }

        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(Error::SubscriptionCancelled);
        }

        let now = env.ledger().timestamp();
        if now < subscription.next_payment_date {
            log!(env, "payment not yet due", id.clone(), subscription.next_payment_date);
            return Err(Error::NotYetDue);
        }

        let next_payment_date = period::next_due_date(
            subscription.next_payment_date,
            subscription.time_unit,
            subscription.period_count,
        )?;

        let _guard = PaymentGuard::new(env, id)?;

        let token_client = token::TokenClient::new(env, &subscription.token);
        let transfer = token_client.try_transfer_from(
            &env.current_contract_address(),
            &subscription.subscriber,
            &subscription.provider,
            &subscription.amount,
        );
        if !matches!(transfer, Ok(Ok(()))) {
            log!(env, "transfer failed", id.clone(), subscription.subscriber.clone());
            return Err(Error::TransferFailed);
        }

        subscription.next_payment_date = next_payment_date;
        store::update(env, &subscription)?;

        events::PaymentExecuted {
            id: id.clone(),
            amount: subscription.amount,
            next_payment_date,
        }
        .publish(env);

        Ok(())
    }
}
