//! Subscription records and the per-subscriber index.
//!
//! The store performs no validation beyond id collisions; callers keep the
//! subscription invariants intact before calling `insert` or `update`.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, String, Vec};

use crate::error::Error;
use crate::types::{DataKey, Subscription};

const DAY_IN_LEDGERS: u32 = 17280; // ~24 hours
const LEDGER_TTL_THRESHOLD: u32 = DAY_IN_LEDGERS * 30; // 30 days
const LEDGER_TTL_EXTEND: u32 = DAY_IN_LEDGERS * 365; // 1 year

// Extend TTL for persistent storage entries
pub fn extend_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, LEDGER_TTL_THRESHOLD, LEDGER_TTL_EXTEND);
}

/// Derives the subscription id: sha256 over the XDR of the three fields.
pub fn compute_id(
    env: &Env,
    subscriber: &Address,
    provider: &Address,
    external_reference: &String,
) -> BytesN<32> {
    let mut preimage = Bytes::new(env);
    preimage.append(&subscriber.clone().to_xdr(env));
    preimage.append(&provider.clone().to_xdr(env));
    preimage.append(&external_reference.clone().to_xdr(env));
    env.crypto().sha256(&preimage).to_bytes()
}

pub fn exists(env: &Env, id: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Subscription(id.clone()))
}

pub fn insert(env: &Env, subscription: &Subscription) -> Result<(), Error> {
    if exists(env, &subscription.id) {
        return Err(Error::DuplicateSubscription);
    }

    let key = DataKey::Subscription(subscription.id.clone());
    env.storage().persistent().set(&key, subscription);
    extend_ttl(env, &key);

    let index_key = DataKey::SubscriberSubscriptions(subscription.subscriber.clone());
    let mut ids: Vec<BytesN<32>> = env
        .storage()
        .persistent()
        .get(&index_key)
        .unwrap_or(Vec::new(env));
    ids.push_back(subscription.id.clone());
    env.storage().persistent().set(&index_key, &ids);
    extend_ttl(env, &index_key);

    Ok(())
}

pub fn get(env: &Env, id: &BytesN<32>) -> Result<Subscription, Error> {
    let key = DataKey::Subscription(id.clone());
    let subscription: Subscription = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::NotFound)?;
    extend_ttl(env, &key);
    Ok(subscription)
}

pub fn update(env: &Env, subscription: &Subscription) -> Result<(), Error> {
    if !exists(env, &subscription.id) {
        return Err(Error::NotFound);
    }

    let key = DataKey::Subscription(subscription.id.clone());
    env.storage().persistent().set(&key, subscription);
    extend_ttl(env, &key);
    Ok(())
}

/// Ids created by `subscriber`, oldest first.
pub fn list_by_subscriber(env: &Env, subscriber: &Address) -> Vec<BytesN<32>> {
    let index_key = DataKey::SubscriberSubscriptions(subscriber.clone());
    match env
        .storage()
        .persistent()
        .get::<DataKey, Vec<BytesN<32>>>(&index_key)
    {
        Some(ids) => {
            extend_ttl(env, &index_key);
            ids
        }
        None => Vec::new(env),
    }
}
