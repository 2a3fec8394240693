use anchor_lang::prelude::*;

#[error_code]
pub enum MerkleAirdropError {
    // 6000
    #[msg("PublicKeyMismatch")]
    PublicKeyMismatch,
    // 6001
    #[msg("UninitializedAccount")]
    UninitializedAccount,
    // 6002
    #[msg("NumericalOverflow")]
    NumericalOverflow,
    // 6003
    #[msg("Wrong account owner")]
    WrongAccountOwner,
    // 6004
    #[msg("Recipient has already claimed")]
    AlreadyClaimed,
    // 6005
    #[msg("Claim authorization is not valid for recipient")]
    InvalidAuthorization,
    // 6006
    #[msg("Merkle proof does not match root")]
    InvalidProof,
    // 6007
    #[msg("Transfer from the airdrop pool failed")]
    TransferFailed,
    // 6008
    #[msg("Airdrop pool balance is insufficient")]
    InsufficientPoolBalance,
    // 6009
    #[msg("Merkle root is not configured")]
    UnconfiguredRoot,
    // 6010
    #[msg("Allow-list is empty")]
    EmptyAllowList,
    // 6011
    #[msg("Allow-list contains a duplicate recipient")]
    DuplicateRecipient,
    // 6012
    #[msg("Recipient is not in the allow-list")]
    RecipientNotInAllowList,
    // 6013
    #[msg("Malformed ed25519 instruction")]
    MalformedEd25519Instruction,
}
