use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Authorization errors
    Unauthorized = 1,
    AdminNotSet = 2,

    // Admin transfer errors
    NoPendingAdminTransfer = 5,
    AdminTransferExpired = 6,
    PendingAdminTransferExists = 7,

    // Provider errors
    AlreadyRegistered = 10,
    ProviderNotRegistered = 11,

    // Subscription errors
    InvalidParameters = 20,
    DuplicateSubscription = 21,
    NotFound = 22,
    AlreadyCancelled = 23,
    SubscriptionCancelled = 24,

    // Payment errors
    NotYetDue = 30,
    TransferFailed = 31,
    PaymentInProgress = 32,

    // Date arithmetic
    ArithmeticOverflow = 40,
}
