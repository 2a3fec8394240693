use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    ed25519_program,
    instruction::Instruction,
    sysvar::instructions::{load_current_index_checked, load_instruction_at_checked},
};

use crate::MerkleAirdropError;

pub const CLAIM_MESSAGE_PREFIX: &[u8] = b"merkle-airdrop:claim";

// Layout of the ed25519 native program instruction data.
const SIGNATURE_OFFSETS_START: usize = 2;
const SIGNATURE_OFFSETS_SERIALIZED_SIZE: usize = 14;
const DATA_START: usize = SIGNATURE_OFFSETS_START + SIGNATURE_OFFSETS_SERIALIZED_SIZE;
const PUBKEY_SERIALIZED_SIZE: usize = 32;
const SIGNATURE_SERIALIZED_SIZE: usize = 64;
const CURRENT_INSTRUCTION: u16 = u16::MAX;

/// Proof that `signer` approved a claim. The claim is only honoured when
/// `signer` is the recipient itself, so whoever submits the transaction
/// cannot redirect funds.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimAuthorization {
    pub signer: Pubkey,
    pub signature: [u8; 64],
}

/// Bytes the recipient signs: prefix || root || recipient || amount (LE).
pub fn claim_message(root: &[u8; 32], recipient: &Pubkey, amount: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(CLAIM_MESSAGE_PREFIX.len() + 32 + 32 + 8);
    message.extend_from_slice(CLAIM_MESSAGE_PREFIX);
    message.extend_from_slice(root);
    message.extend_from_slice(recipient.as_ref());
    message.extend_from_slice(&amount.to_le_bytes());
    message
}

pub trait ClaimAuthorizer {
    fn is_authorized(
        &self,
        recipient: &Pubkey,
        message: &[u8],
        authorization: &ClaimAuthorization,
    ) -> bool;
}

/// Signature, public key and message carried by a single-signature ed25519
/// program instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519SignedMessage<'a> {
    pub pubkey: Pubkey,
    pub signature: [u8; 64],
    pub message: &'a [u8],
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Builds ed25519 program instruction data for one signature whose public
/// key, signature and message are all stored in the instruction itself.
pub fn ed25519_instruction_data(
    pubkey: &Pubkey,
    signature: &[u8; 64],
    message: &[u8],
) -> std::result::Result<Vec<u8>, MerkleAirdropError> {
    let public_key_offset = DATA_START;
    let signature_offset = public_key_offset + PUBKEY_SERIALIZED_SIZE;
    let message_data_offset = signature_offset + SIGNATURE_SERIALIZED_SIZE;
    let message_data_size =
        u16::try_from(message.len()).map_err(|_| MerkleAirdropError::NumericalOverflow)?;

    let mut data = Vec::with_capacity(message_data_offset + message.len());
    data.extend_from_slice(&[1, 0]);
    for field in [
        signature_offset as u16,
        CURRENT_INSTRUCTION,
        public_key_offset as u16,
        CURRENT_INSTRUCTION,
        message_data_offset as u16,
        message_data_size,
        CURRENT_INSTRUCTION,
    ] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(pubkey.as_ref());
    data.extend_from_slice(signature);
    data.extend_from_slice(message);
    Ok(data)
}

pub fn new_ed25519_instruction(
    pubkey: &Pubkey,
    signature: &[u8; 64],
    message: &[u8],
) -> std::result::Result<Instruction, MerkleAirdropError> {
    Ok(Instruction {
        program_id: ed25519_program::ID,
        accounts: vec![],
        data: ed25519_instruction_data(pubkey, signature, message)?,
    })
}

/// Inverse of [`ed25519_instruction_data`]. Anything else, including
/// multi-signature instructions and offsets pointing into other
/// instructions, is rejected.
pub fn parse_ed25519_instruction(
    data: &[u8],
) -> std::result::Result<Ed25519SignedMessage<'_>, MerkleAirdropError> {
    if data.len() < DATA_START || data[0] != 1 {
        return Err(MerkleAirdropError::MalformedEd25519Instruction);
    }

    let field = |index: usize| read_u16(data, SIGNATURE_OFFSETS_START + index * 2);
    let (
        Some(signature_offset),
        Some(signature_instruction_index),
        Some(public_key_offset),
        Some(public_key_instruction_index),
        Some(message_data_offset),
        Some(message_data_size),
        Some(message_instruction_index),
    ) = (field(0), field(1), field(2), field(3), field(4), field(5), field(6))
    else {
        return Err(MerkleAirdropError::MalformedEd25519Instruction);
    };

    if [
        signature_instruction_index,
        public_key_instruction_index,
        message_instruction_index,
    ]
    .iter()
    .any(|index| *index != CURRENT_INSTRUCTION)
    {
        return Err(MerkleAirdropError::MalformedEd25519Instruction);
    }

    let slice = |offset: u16, len: usize| data.get(offset as usize..offset as usize + len);
    let (Some(pubkey), Some(signature), Some(message)) = (
        slice(public_key_offset, PUBKEY_SERIALIZED_SIZE),
        slice(signature_offset, SIGNATURE_SERIALIZED_SIZE),
        slice(message_data_offset, message_data_size as usize),
    ) else {
        return Err(MerkleAirdropError::MalformedEd25519Instruction);
    };

    let pubkey = Pubkey::try_from(pubkey).map_err(|_| MerkleAirdropError::MalformedEd25519Instruction)?;
    let signature: [u8; 64] = signature
        .try_into()
        .map_err(|_| MerkleAirdropError::MalformedEd25519Instruction)?;

    Ok(Ed25519SignedMessage {
        pubkey,
        signature,
        message,
    })
}

/// True if `ix` is an ed25519 program instruction over exactly
/// (`recipient`, `signature`, `message`).
pub fn matches_signed_claim(
    ix: &Instruction,
    recipient: &Pubkey,
    message: &[u8],
    signature: &[u8; 64],
) -> bool {
    if ix.program_id != ed25519_program::ID {
        return false;
    }
    match parse_ed25519_instruction(&ix.data) {
        Ok(signed) => {
            signed.pubkey == *recipient && signed.signature == *signature && signed.message == message
        }
        Err(err) => {
            msg!("Skipping ed25519 instruction: {}", err);
            false
        }
    }
}

/// On-chain authorizer. The runtime only lets a transaction through if every
/// ed25519 program instruction in it verified, so it is enough to find one
/// preceding the claim that covers this recipient, message and signature.
pub struct Ed25519InstructionAuthorizer<'a, 'info> {
    instructions_sysvar: &'a AccountInfo<'info>,
}

impl<'a, 'info> Ed25519InstructionAuthorizer<'a, 'info> {
    pub fn new(instructions_sysvar: &'a AccountInfo<'info>) -> Self {
        Self {
            instructions_sysvar,
        }
    }
}

impl<'a, 'info> ClaimAuthorizer for Ed25519InstructionAuthorizer<'a, 'info> {
    fn is_authorized(
        &self,
        recipient: &Pubkey,
        message: &[u8],
        authorization: &ClaimAuthorization,
    ) -> bool {
        if authorization.signer != *recipient {
            return false;
        }
        let current_index = match load_current_index_checked(self.instructions_sysvar) {
            Ok(index) => index as usize,
            Err(err) => {
                msg!("Cannot read instructions sysvar: {}", err);
                return false;
            }
        };

        (0..current_index).any(|index| {
            load_instruction_at_checked(index, self.instructions_sysvar)
                .map(|ix| matches_signed_claim(&ix, recipient, message, &authorization.signature))
                .unwrap_or(false)
        })
    }
}

#[cfg(not(target_os = "solana"))]
pub use self::host::*;

#[cfg(not(target_os = "solana"))]
mod host {
    use anchor_lang::prelude::Pubkey;
    use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signature, SignatureError, Signer};

    use super::{claim_message, ClaimAuthorization, ClaimAuthorizer};

    /// Verifies claim signatures directly, for relayers and tests running off
    /// chain.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Ed25519Authorizer;

    impl ClaimAuthorizer for Ed25519Authorizer {
        fn is_authorized(
            &self,
            recipient: &Pubkey,
            message: &[u8],
            authorization: &ClaimAuthorization,
        ) -> bool {
            if authorization.signer != *recipient {
                return false;
            }
            let Ok(public) = PublicKey::from_bytes(recipient.as_ref()) else {
                return false;
            };
            let Ok(signature) = Signature::try_from(&authorization.signature[..]) else {
                return false;
            };
            public.verify_strict(message, &signature).is_ok()
        }
    }

    pub fn keypair_from_seed(seed: &[u8; 32]) -> Result<Keypair, SignatureError> {
        let secret = SecretKey::from_bytes(seed)?;
        let public = PublicKey::from(&secret);
        Ok(Keypair { secret, public })
    }

    pub fn keypair_pubkey(keypair: &Keypair) -> Pubkey {
        Pubkey::new_from_array(keypair.public.to_bytes())
    }

    /// Signs the claim message for `keypair`'s own allocation.
    pub fn sign_claim(keypair: &Keypair, root: &[u8; 32], amount: u64) -> ClaimAuthorization {
        let recipient = keypair_pubkey(keypair);
        let signature = keypair.sign(&claim_message(root, &recipient, amount));
        ClaimAuthorization {
            signer: recipient,
            signature: signature.to_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::{
        sysvar::{
            self,
            instructions::{construct_instructions_data, BorrowedAccountMeta, BorrowedInstruction},
        },
    };
    use ed25519_dalek::Signer;

    fn signer(seed: u8) -> ed25519_dalek::Keypair {
        keypair_from_seed(&[seed; 32]).unwrap()
    }

    fn claim_instruction() -> Instruction {
        Instruction {
            program_id: crate::ID,
            accounts: vec![],
            data: vec![],
        }
    }

    /// Serialises `instructions` the way the runtime lays out the
    /// instructions sysvar, with `current` as the executing index.
    fn instructions_sysvar_data(instructions: &[Instruction], current: u16) -> Vec<u8> {
        let borrowed: Vec<BorrowedInstruction> = instructions
            .iter()
            .map(|ix| BorrowedInstruction {
                program_id: &ix.program_id,
                accounts: ix
                    .accounts
                    .iter()
                    .map(|meta| BorrowedAccountMeta {
                        pubkey: &meta.pubkey,
                        is_signer: meta.is_signer,
                        is_writable: meta.is_writable,
                    })
                    .collect(),
                data: &ix.data,
            })
            .collect();
        let mut data = construct_instructions_data(&borrowed);
        let len = data.len();
        data[len - 2..].copy_from_slice(&current.to_le_bytes());
        data
    }

    fn authorized_in_transaction(
        instructions: &[Instruction],
        current: u16,
        recipient: &Pubkey,
        message: &[u8],
        authorization: &ClaimAuthorization,
    ) -> bool {
        let key = sysvar::instructions::ID;
        let owner = sysvar::ID;
        let mut lamports = 0u64;
        let mut data = instructions_sysvar_data(instructions, current);
        let account = AccountInfo::new(
            &key,
            false,
            false,
            &mut lamports,
            &mut data,
            &owner,
            false,
            0,
        );
        Ed25519InstructionAuthorizer::new(&account).is_authorized(recipient, message, authorization)
    }

    struct SignedClaim {
        recipient: Pubkey,
        root: [u8; 32],
        amount: u64,
        authorization: ClaimAuthorization,
        ed25519_ix: Instruction,
    }

    fn signed_claim(seed: u8) -> SignedClaim {
        let keypair = signer(seed);
        let recipient = keypair_pubkey(&keypair);
        let root = [6u8; 32];
        let amount = 1_000;
        let authorization = sign_claim(&keypair, &root, amount);
        let ed25519_ix = new_ed25519_instruction(
            &recipient,
            &authorization.signature,
            &claim_message(&root, &recipient, amount),
        )
        .unwrap();
        SignedClaim {
            recipient,
            root,
            amount,
            authorization,
            ed25519_ix,
        }
    }

    #[test]
    fn test_claim_message_layout() {
        let root = [9u8; 32];
        let recipient = Pubkey::new_unique();
        let message = claim_message(&root, &recipient, 42);

        assert_eq!(message.len(), CLAIM_MESSAGE_PREFIX.len() + 72);
        assert!(message.starts_with(CLAIM_MESSAGE_PREFIX));
        assert_eq!(&message[message.len() - 8..], &42u64.to_le_bytes());
    }

    #[test]
    fn test_ed25519_authorizer_accepts_recipient_signature() {
        let keypair = signer(1);
        let recipient = keypair_pubkey(&keypair);
        let root = [3u8; 32];
        let authorization = sign_claim(&keypair, &root, 500);

        assert!(Ed25519Authorizer.is_authorized(
            &recipient,
            &claim_message(&root, &recipient, 500),
            &authorization
        ));
    }

    #[test]
    fn test_ed25519_authorizer_rejects_other_amount() {
        let keypair = signer(1);
        let recipient = keypair_pubkey(&keypair);
        let root = [3u8; 32];
        let authorization = sign_claim(&keypair, &root, 500);

        assert!(!Ed25519Authorizer.is_authorized(
            &recipient,
            &claim_message(&root, &recipient, 501),
            &authorization
        ));
    }

    #[test]
    fn test_ed25519_authorizer_rejects_foreign_signer() {
        let recipient = keypair_pubkey(&signer(1));
        let relayer = signer(2);
        let root = [3u8; 32];

        // Relayer signs the recipient's message with its own key.
        let message = claim_message(&root, &recipient, 500);
        let forged = ClaimAuthorization {
            signer: recipient,
            signature: relayer.sign(&message).to_bytes(),
        };
        assert!(!Ed25519Authorizer.is_authorized(&recipient, &message, &forged));

        let own = sign_claim(&relayer, &root, 500);
        assert!(!Ed25519Authorizer.is_authorized(&recipient, &message, &own));
    }

    #[test]
    fn test_ed25519_instruction_data_parses_back() {
        let keypair = signer(4);
        let pubkey = keypair_pubkey(&keypair);
        let message = claim_message(&[1u8; 32], &pubkey, 10);
        let signature = keypair.sign(&message).to_bytes();

        let data = ed25519_instruction_data(&pubkey, &signature, &message).unwrap();
        assert_eq!(data.len(), DATA_START + 32 + 64 + message.len());

        let parsed = parse_ed25519_instruction(&data).unwrap();
        assert_eq!(parsed.pubkey, pubkey);
        assert_eq!(parsed.signature, signature);
        assert_eq!(parsed.message, &message[..]);
    }

    #[test]
    fn test_parse_rejects_truncated_and_foreign_offsets() {
        let pubkey = Pubkey::new_unique();
        let data = ed25519_instruction_data(&pubkey, &[7u8; 64], b"hello").unwrap();

        assert!(matches!(
            parse_ed25519_instruction(&data[..DATA_START - 1]),
            Err(MerkleAirdropError::MalformedEd25519Instruction)
        ));
        assert!(parse_ed25519_instruction(&data[..data.len() - 1]).is_err());

        let mut two_signatures = data.clone();
        two_signatures[0] = 2;
        assert!(parse_ed25519_instruction(&two_signatures).is_err());

        // Public key read from instruction 0 instead of this one.
        let mut foreign = data;
        foreign[SIGNATURE_OFFSETS_START + 6..SIGNATURE_OFFSETS_START + 8]
            .copy_from_slice(&0u16.to_le_bytes());
        assert!(parse_ed25519_instruction(&foreign).is_err());
    }

    #[test]
    fn test_matches_signed_claim() {
        let keypair = signer(5);
        let recipient = keypair_pubkey(&keypair);
        let message = claim_message(&[2u8; 32], &recipient, 77);
        let signature = keypair.sign(&message).to_bytes();
        let ix = new_ed25519_instruction(&recipient, &signature, &message).unwrap();

        assert!(matches_signed_claim(&ix, &recipient, &message, &signature));
        assert!(!matches_signed_claim(&ix, &Pubkey::new_unique(), &message, &signature));
        assert!(!matches_signed_claim(&ix, &recipient, &message[1..], &signature));

        let mut wrong_program = ix.clone();
        wrong_program.program_id = Pubkey::new_unique();
        assert!(!matches_signed_claim(&wrong_program, &recipient, &message, &signature));
    }

    #[test]
    fn test_instruction_authorizer_accepts_preceding_ed25519_instruction() {
        let claim = signed_claim(7);
        let message = claim_message(&claim.root, &claim.recipient, claim.amount);

        assert!(authorized_in_transaction(
            &[claim.ed25519_ix.clone(), claim_instruction()],
            1,
            &claim.recipient,
            &message,
            &claim.authorization,
        ));

        // Unrelated instructions in between do not matter.
        assert!(authorized_in_transaction(
            &[claim.ed25519_ix.clone(), claim_instruction(), claim_instruction()],
            2,
            &claim.recipient,
            &message,
            &claim.authorization,
        ));
    }

    #[test]
    fn test_instruction_authorizer_ignores_current_and_later_instructions() {
        let claim = signed_claim(7);
        let message = claim_message(&claim.root, &claim.recipient, claim.amount);

        // Signature check placed after the claim.
        assert!(!authorized_in_transaction(
            &[claim_instruction(), claim.ed25519_ix.clone()],
            0,
            &claim.recipient,
            &message,
            &claim.authorization,
        ));

        // Signature check sitting at the executing index itself.
        assert!(!authorized_in_transaction(
            &[claim.ed25519_ix.clone(), claim_instruction()],
            0,
            &claim.recipient,
            &message,
            &claim.authorization,
        ));

        assert!(!authorized_in_transaction(
            &[claim_instruction()],
            0,
            &claim.recipient,
            &message,
            &claim.authorization,
        ));
    }

    #[test]
    fn test_instruction_authorizer_requires_recipient_as_signer() {
        let claim = signed_claim(7);
        let other = signed_claim(8);
        let message = claim_message(&claim.root, &claim.recipient, claim.amount);

        let mut relayed = claim.authorization;
        relayed.signer = other.recipient;
        assert!(!authorized_in_transaction(
            &[claim.ed25519_ix.clone(), claim_instruction()],
            1,
            &claim.recipient,
            &message,
            &relayed,
        ));

        // A valid ed25519 instruction from someone else does not cover the recipient.
        assert!(!authorized_in_transaction(
            &[other.ed25519_ix.clone(), claim_instruction()],
            1,
            &claim.recipient,
            &message,
            &other.authorization,
        ));
    }

    #[test]
    fn test_instruction_authorizer_binds_root_and_amount() {
        let claim = signed_claim(7);
        let instructions = [claim.ed25519_ix.clone(), claim_instruction()];

        let other_root = claim_message(&[9u8; 32], &claim.recipient, claim.amount);
        assert!(!authorized_in_transaction(
            &instructions,
            1,
            &claim.recipient,
            &other_root,
            &claim.authorization,
        ));

        let other_amount = claim_message(&claim.root, &claim.recipient, claim.amount + 1);
        assert!(!authorized_in_transaction(
            &instructions,
            1,
            &claim.recipient,
            &other_amount,
            &claim.authorization,
        ));
    }
}
