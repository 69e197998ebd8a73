//! Provider registry. Registration is one-way: there is no unregister.

use soroban_sdk::{Address, Env};

use crate::error::Error;
use crate::store::extend_ttl;
use crate::types::{DataKey, Provider};

pub fn register(env: &Env, account: &Address) -> Result<(), Error> {
    let key = DataKey::Provider(account.clone());
    if env.storage().persistent().has(&key) {
        return Err(Error::AlreadyRegistered);
    }

    let provider = Provider {
        registered_at: env.ledger().timestamp(),
    };
    env.storage().persistent().set(&key, &provider);
    extend_ttl(env, &key);

    Ok(())
}

pub fn is_registered(env: &Env, account: &Address) -> bool {
    let key = DataKey::Provider(account.clone());
    let registered = env.storage().persistent().has(&key);
    if registered {
        extend_ttl(env, &key);
    }
    registered
}
