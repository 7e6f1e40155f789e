//! Ledger wire model: instructions, messages, transactions, account records.
//!
//! # Transaction layout
//!
//! A [`Message`] is the signed payload: fee payer, recent blockhash, and an
//! ordered list of [`Instruction`]s. Its digest is `sha256` over the
//! canonical encoding below. A [`Transaction`] pairs the message with one
//! Schnorr signature per required signer, in [`Message::required_signers`]
//! order. The fee payer always signs first, so the first signature is the
//! transaction id.
//!
//! ```text
//! message     := version:u8 fee_payer:32 blockhash:32 count:u16 instruction*
//! instruction := tag:u8 fields...
//! option      := 0x00 | 0x01 address:32
//! integers    := big-endian
//! transaction := message signature_count:u16 signature:64*
//! ```
//!
//! A message holds at most [`MAX_INSTRUCTIONS`] instructions. Every
//! instruction names at most one signer, so both counts fit in a `u16`.
//!
//! # Holding accounts
//!
//! Each (owner, token type) pair has exactly one holding account, at the
//! address returned by [`holding_account_address`]. The address is a hash,
//! not a public key, so nobody can sign for it: only its owner may move its
//! balance.

use bitcoin::hashes::{Hash, HashEngine, sha256};
use bytes::{BufMut, Bytes, BytesMut};
use sdk_core::{Address, Blockhash, TxSignature};
use serde::{Deserialize, Serialize};
use signer::Signer;

use crate::TransportError;

/// Version byte prefixed to every encoded message.
pub const MESSAGE_VERSION: u8 = 1;

/// Upper bound on instructions per message, enforced when signing.
pub const MAX_INSTRUCTIONS: usize = 64;

/// Domain separator for holding account derivation.
const HOLDING_ACCOUNT_SEED: &[u8] = b"mint-drop/holding-account";

// ---------------------------------------------------------------------------
// Account records
// ---------------------------------------------------------------------------

/// On-ledger record of a fungible token type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenType {
    /// Address of the token type.
    pub address: Address,
    /// Fractional-unit precision.
    pub decimals: u8,
    /// Total issued base units.
    pub supply: u64,
    /// Identity allowed to issue supply. `None` once revoked.
    pub issuance_authority: Option<Address>,
    /// Identity allowed to freeze holdings. Always `None` for mint drops.
    pub freeze_authority: Option<Address>,
}

/// On-ledger record of one owner's balance of one token type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingAccount {
    /// Derived address of this account.
    pub address: Address,
    /// Identity that may transfer out of this account.
    pub owner: Address,
    /// Token type held.
    pub token_type: Address,
    /// Balance in base units.
    pub amount: u64,
}

/// Derive the holding account address for an (owner, token type) pair.
pub fn holding_account_address(owner: &Address, token_type: &Address) -> Address {
    let mut engine = sha256::Hash::engine();
    engine.input(HOLDING_ACCOUNT_SEED);
    engine.input(owner.as_bytes());
    engine.input(token_type.as_bytes());
    Address::from_bytes(sha256::Hash::from_engine(engine).to_byte_array())
}

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// A single ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Allocate a new token type. The token type address must co-sign.
    CreateTokenType {
        token_type: Address,
        decimals: u8,
        issuance_authority: Address,
        freeze_authority: Option<Address>,
    },

    /// Allocate the holding account for `(owner, token_type)`, paid by the
    /// fee payer. The owner does not need to sign.
    CreateHoldingAccount { owner: Address, token_type: Address },

    /// Issue `amount` base units into `destination`.
    IssueSupply {
        token_type: Address,
        destination: Address,
        authority: Address,
        amount: u64,
    },

    /// Replace (or clear, with `None`) the issuance authority.
    SetIssuanceAuthority {
        token_type: Address,
        current_authority: Address,
        new_authority: Option<Address>,
    },

    /// Move `amount` base units between two holding accounts of one token type.
    Transfer {
        source: Address,
        destination: Address,
        owner: Address,
        amount: u64,
    },
}

impl Instruction {
    const TAG_CREATE_TOKEN_TYPE: u8 = 0;
    const TAG_CREATE_HOLDING_ACCOUNT: u8 = 1;
    const TAG_ISSUE_SUPPLY: u8 = 2;
    const TAG_SET_ISSUANCE_AUTHORITY: u8 = 3;
    const TAG_TRANSFER: u8 = 4;

    /// Addresses whose signatures this instruction requires.
    pub fn signers(&self) -> Vec<Address> {
        match self {
            Self::CreateTokenType { token_type, .. } => vec![*token_type],
            Self::CreateHoldingAccount { .. } => vec![],
            Self::IssueSupply { authority, .. } => vec![*authority],
            Self::SetIssuanceAuthority {
                current_authority, ..
            } => vec![*current_authority],
            Self::Transfer { owner, .. } => vec![*owner],
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::CreateTokenType {
                token_type,
                decimals,
                issuance_authority,
                freeze_authority,
            } => {
                buf.put_u8(Self::TAG_CREATE_TOKEN_TYPE);
                buf.put_slice(token_type.as_bytes());
                buf.put_u8(*decimals);
                buf.put_slice(issuance_authority.as_bytes());
                put_option(buf, freeze_authority.as_ref());
            }
            Self::CreateHoldingAccount { owner, token_type } => {
                buf.put_u8(Self::TAG_CREATE_HOLDING_ACCOUNT);
                buf.put_slice(owner.as_bytes());
                buf.put_slice(token_type.as_bytes());
            }
            Self::IssueSupply {
                token_type,
                destination,
                authority,
                amount,
            } => {
                buf.put_u8(Self::TAG_ISSUE_SUPPLY);
                buf.put_slice(token_type.as_bytes());
                buf.put_slice(destination.as_bytes());
                buf.put_slice(authority.as_bytes());
                buf.put_u64(*amount);
            }
            Self::SetIssuanceAuthority {
                token_type,
                current_authority,
                new_authority,
            } => {
                buf.put_u8(Self::TAG_SET_ISSUANCE_AUTHORITY);
                buf.put_slice(token_type.as_bytes());
                buf.put_slice(current_authority.as_bytes());
                put_option(buf, new_authority.as_ref());
            }
            Self::Transfer {
                source,
                destination,
                owner,
                amount,
            } => {
                buf.put_u8(Self::TAG_TRANSFER);
                buf.put_slice(source.as_bytes());
                buf.put_slice(destination.as_bytes());
                buf.put_slice(owner.as_bytes());
                buf.put_u64(*amount);
            }
        }
    }
}

fn put_option(buf: &mut BytesMut, address: Option<&Address>) {
    match address {
        Some(a) => {
            buf.put_u8(1);
            buf.put_slice(a.as_bytes());
        }
        None => buf.put_u8(0),
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// The signed payload of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identity charged the transaction fee. Always the first signer.
    pub fee_payer: Address,
    /// Recent ledger state reference.
    pub recent_blockhash: Blockhash,
    /// Instructions, executed in order and atomically.
    pub instructions: Vec<Instruction>,
}

impl Message {
    /// Creates a message from its parts.
    pub fn new(fee_payer: Address, recent_blockhash: Blockhash, instructions: Vec<Instruction>) -> Self {
        Self {
            fee_payer,
            recent_blockhash,
            instructions,
        }
    }

    /// Required signers: the fee payer, then each instruction's signers in
    /// first-appearance order, without duplicates.
    pub fn required_signers(&self) -> Vec<Address> {
        let mut signers = vec![self.fee_payer];
        for address in self.instructions.iter().flat_map(Instruction::signers) {
            if !signers.contains(&address) {
                signers.push(address);
            }
        }
        signers
    }

    /// Canonical binary encoding.
    ///
    /// Only meaningful for messages within [`MAX_INSTRUCTIONS`];
    /// [`Transaction::new_signed`] refuses anything larger.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(67 + self.instructions.len() * 105);
        self.encode_into(&mut buf);
        buf.freeze()
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u8(MESSAGE_VERSION);
        buf.put_slice(self.fee_payer.as_bytes());
        buf.put_slice(self.recent_blockhash.as_bytes());
        // Lossless within MAX_INSTRUCTIONS.
        buf.put_u16(self.instructions.len() as u16);
        for instruction in &self.instructions {
            instruction.encode(buf);
        }
    }

    /// The 32-byte digest every signer signs.
    pub fn digest(&self) -> [u8; 32] {
        sha256::Hash::hash(&self.encode()).to_byte_array()
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A message plus one signature per required signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// The signed payload.
    pub message: Message,
    /// Signatures aligned with [`Message::required_signers`].
    pub signatures: Vec<[u8; 64]>,
}

impl Transaction {
    /// Signs `message` with the given signers.
    ///
    /// `signers` may be in any order and may include extra signers; only the
    /// required ones are used.
    ///
    /// # Errors
    ///
    /// - [`TransportError::MessageTooLarge`] if the message exceeds
    ///   [`MAX_INSTRUCTIONS`]
    /// - [`TransportError::MissingSigner`] if a required signer is absent
    pub fn new_signed(message: Message, signers: &[&dyn Signer]) -> Result<Self, TransportError> {
        if message.instructions.len() > MAX_INSTRUCTIONS {
            return Err(TransportError::MessageTooLarge(message.instructions.len()));
        }
        let digest = message.digest();
        let signatures = message
            .required_signers()
            .into_iter()
            .map(|required| {
                signers
                    .iter()
                    .find(|s| s.address() == required)
                    .map(|s| s.sign_digest(&digest))
                    .ok_or(TransportError::MissingSigner(required))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            message,
            signatures,
        })
    }

    /// The transaction id: the fee payer's signature.
    pub fn signature(&self) -> Option<TxSignature> {
        self.signatures.first().map(|s| TxSignature::from_bytes(*s))
    }

    /// Canonical binary encoding (message followed by signatures).
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(256 + self.signatures.len() * 64);
        self.message.encode_into(&mut buf);
        // At most MAX_INSTRUCTIONS + 1 signers.
        buf.put_u16(self.signatures.len() as u16);
        for signature in &self.signatures {
            buf.put_slice(signature);
        }
        buf.freeze()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use signer::Keypair;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    fn transfer(owner: Address) -> Instruction {
        Instruction::Transfer {
            source: addr(1),
            destination: addr(2),
            owner,
            amount: 10,
        }
    }

    #[test]
    fn holding_address_is_deterministic_and_pair_specific() {
        let a = holding_account_address(&addr(1), &addr(2));
        assert_eq!(a, holding_account_address(&addr(1), &addr(2)));
        assert_ne!(a, holding_account_address(&addr(2), &addr(1)));
        assert_ne!(a, holding_account_address(&addr(1), &addr(3)));
    }

    #[test]
    fn fee_payer_signs_first_and_signers_dedupe() {
        let payer = addr(9);
        let message = Message::new(
            payer,
            Blockhash::from_bytes([0; 32]),
            vec![
                Instruction::CreateTokenType {
                    token_type: addr(5),
                    decimals: 9,
                    issuance_authority: payer,
                    freeze_authority: None,
                },
                transfer(payer),
            ],
        );
        assert_eq!(message.required_signers(), vec![payer, addr(5)]);
    }

    #[test]
    fn digest_commits_to_every_field() {
        let base = Message::new(addr(1), Blockhash::from_bytes([0; 32]), vec![transfer(addr(1))]);

        let mut other_hash = base.clone();
        other_hash.recent_blockhash = Blockhash::from_bytes([1; 32]);

        let mut other_amount = base.clone();
        other_amount.instructions = vec![Instruction::Transfer {
            source: addr(1),
            destination: addr(2),
            owner: addr(1),
            amount: 11,
        }];

        assert_ne!(base.digest(), other_hash.digest());
        assert_ne!(base.digest(), other_amount.digest());
    }

    #[test]
    fn option_encoding_distinguishes_none() {
        let with = Instruction::SetIssuanceAuthority {
            token_type: addr(1),
            current_authority: addr(2),
            new_authority: Some(addr(0)),
        };
        let without = Instruction::SetIssuanceAuthority {
            token_type: addr(1),
            current_authority: addr(2),
            new_authority: None,
        };
        let m = |i: Instruction| Message::new(addr(2), Blockhash::from_bytes([0; 32]), vec![i]);
        assert_ne!(m(with).digest(), m(without).digest());
    }

    #[test]
    fn new_signed_orders_signatures_by_required_signers() {
        let payer = Keypair::generate();
        let token = Keypair::generate();
        let message = Message::new(
            payer.address(),
            Blockhash::from_bytes([7; 32]),
            vec![Instruction::CreateTokenType {
                token_type: token.address(),
                decimals: 9,
                issuance_authority: payer.address(),
                freeze_authority: None,
            }],
        );

        // Signers supplied in reverse order.
        let tx = Transaction::new_signed(message.clone(), &[&token, &payer]).unwrap();
        let digest = message.digest();

        assert_eq!(tx.signatures.len(), 2);
        assert_eq!(tx.signatures[0], payer.sign_digest(&digest));
        assert_eq!(tx.signatures[1], token.sign_digest(&digest));
        assert_eq!(tx.signature(), Some(TxSignature::from_bytes(tx.signatures[0])));
    }

    #[test]
    fn new_signed_reports_missing_signer() {
        let payer = Keypair::generate();
        let owner = Keypair::generate();
        let message = Message::new(
            payer.address(),
            Blockhash::from_bytes([7; 32]),
            vec![transfer(owner.address())],
        );

        assert_eq!(
            Transaction::new_signed(message, &[&payer]),
            Err(TransportError::MissingSigner(owner.address()))
        );
    }

    #[test]
    fn new_signed_refuses_oversized_messages() {
        let payer = Keypair::generate();
        let message = Message::new(
            payer.address(),
            Blockhash::from_bytes([7; 32]),
            vec![transfer(payer.address()); MAX_INSTRUCTIONS + 1],
        );

        assert_eq!(
            Transaction::new_signed(message, &[&payer]),
            Err(TransportError::MessageTooLarge(MAX_INSTRUCTIONS + 1))
        );
    }

    #[test]
    fn new_signed_accepts_the_instruction_cap() {
        let payer = Keypair::generate();
        let message = Message::new(
            payer.address(),
            Blockhash::from_bytes([7; 32]),
            vec![transfer(payer.address()); MAX_INSTRUCTIONS],
        );

        let tx = Transaction::new_signed(message, &[&payer]).unwrap();
        let count = u16::from_be_bytes([tx.encode()[65], tx.encode()[66]]);
        assert_eq!(usize::from(count), MAX_INSTRUCTIONS);
    }

    #[test]
    fn encoded_transaction_ends_with_signatures() {
        let payer = Keypair::generate();
        let message = Message::new(payer.address(), Blockhash::from_bytes([3; 32]), vec![]);
        let tx = Transaction::new_signed(message.clone(), &[&payer]).unwrap();

        let encoded = tx.encode();
        let message_len = message.encode().len();
        assert_eq!(encoded.len(), message_len + 2 + 64);
        assert_eq!(&encoded[message_len + 2..], &tx.signatures[0][..]);
    }
}
