use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// Token address is unusable (the platform itself or the payment asset)
    InvalidToken = 3,
    /// Round duration must be positive
    InvalidRoundTime = 4,

    // ============================================
    // PHASE ERRORS (10-19)
    // ============================================
    /// Round transition requested from the wrong phase
    InvalidPhase = 10,
    /// Operation not available in the current round
    WrongPhase = 11,

    // ============================================
    // TIMING ERRORS (20-29)
    // ============================================
    /// Current round window has not elapsed (and the sale is not sold out)
    RoundNotElapsed = 20,
    /// First sale round ended without a single purchase
    NothingToTrade = 21,

    // ============================================
    // ARGUMENT ERRORS (30-39)
    // ============================================
    /// Amount must be positive
    ZeroAmount = 30,
    /// No order at this index
    InvalidIndex = 31,
    /// Amount exceeds the tokens left in the order
    InvalidAmount = 32,
    /// Order price must be positive
    InvalidPrice = 33,
    /// Not enough tokens left in the sale round
    InsufficientSupply = 34,
    /// Checked arithmetic overflowed
    ArithmeticOverflow = 35,

    // ============================================
    // FUNDS ERRORS (40-49)
    // ============================================
    /// Offered payment below the cost
    InsufficientFunds = 40,
    /// Seller does not hold enough tokens
    InsufficientTokens = 41,
    /// Seller has not approved enough tokens for the platform
    InsufficientAllowance = 42,

    // ============================================
    // AUTHORIZATION ERRORS (50-59)
    // ============================================
    /// Caller is not the seller of the order
    NotSeller = 50,
    /// Participant cannot refer itself
    SelfReferral = 51,
    /// Referrer is not a registered referrer
    UnknownReferrer = 52,
    /// Participant already registered
    AlreadyReferrer = 53,

    // ============================================
    // STATE ERRORS (60-69)
    // ============================================
    /// Order already closed
    ClosedOrder = 60,
}
