//! Shared fixtures: federation signers, block builders and a wired
//! chain manager.

use fed_consensus::{BlockProofVerifier, ChainManager, StaticTransactionValidator};
use fed_signature_verification::{EcdsaSigner, ProofVerifier, SchnorrSigner};
use rand::rngs::OsRng;
use shared_types::{AggPubKey, Block, BlockHeader, Hash, XField, BLOCK_FEATURES};

/// Install a subscriber once so `RUST_LOG=debug cargo test` shows the
/// pipeline's tracing output. Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Port adapter wiring the real proof verifier into the pipeline, the way
/// a node runtime would.
pub struct Verifier(pub ProofVerifier);

impl Verifier {
    pub fn new() -> Self {
        Self(ProofVerifier::new())
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockProofVerifier for Verifier {
    fn verify_block_proof(&self, digest: &Hash, proof: &[u8], key: &AggPubKey) -> bool {
        self.0.verify_block_proof(digest, proof, key)
    }
}

/// A federation signer under either scheme. Rotating between variants
/// also exercises scheme inference on the verifying side.
pub enum FedSigner {
    Schnorr(SchnorrSigner),
    Ecdsa(EcdsaSigner),
}

impl FedSigner {
    pub fn schnorr() -> Self {
        Self::Schnorr(SchnorrSigner::random(&mut OsRng))
    }

    pub fn ecdsa() -> Self {
        Self::Ecdsa(EcdsaSigner::random(&mut OsRng))
    }

    pub fn aggregate_pubkey(&self) -> AggPubKey {
        match self {
            Self::Schnorr(signer) => signer.aggregate_pubkey(),
            Self::Ecdsa(signer) => signer.aggregate_pubkey(),
        }
    }

    pub fn sign(&self, digest: &Hash) -> Vec<u8> {
        match self {
            Self::Schnorr(signer) => signer.sign(digest),
            Self::Ecdsa(signer) => signer.sign(digest),
        }
    }
}

/// Build and sign a block. `seed` makes sibling blocks distinct;
/// `padding` adds one opaque transaction of that many bytes.
pub fn signed_block(
    parent: Hash,
    seed: u8,
    xfield: XField,
    signer: &FedSigner,
    padding: usize,
) -> Block {
    let mut header = BlockHeader {
        features: BLOCK_FEATURES,
        prev_hash: parent,
        merkle_root: [seed; 32],
        im_merkle_root: [seed; 32],
        time: 1_700_000_000 + seed as u32,
        xfield,
        proof: vec![],
    };
    header.proof = signer.sign(&header.hash_for_sign());
    let transactions = if padding > 0 {
        vec![vec![0xAB; padding]]
    } else {
        vec![]
    };
    Block {
        header,
        transactions,
    }
}

/// Build a signed block whose serialized size is exactly `target` bytes.
pub fn block_of_exact_size(parent: Hash, seed: u8, signer: &FedSigner, target: usize) -> Block {
    let mut padding = target.saturating_sub(300).max(1);
    loop {
        let block = signed_block(parent, seed, XField::None, signer, padding);
        let size = block.serialized_size();
        if size == target {
            return block;
        }
        padding = (padding + target - size).max(1);
    }
}

/// A genesis block declaring the signer's key, signed by itself.
pub fn genesis_block(signer: &FedSigner) -> Block {
    signed_block(
        [0u8; 32],
        0x01,
        XField::AggregatePubKey(signer.aggregate_pubkey()),
        signer,
        0,
    )
}

/// A chain manager wired with the real verifier and a permissive
/// transaction validator.
pub fn new_manager(signer: &FedSigner) -> ChainManager<Verifier, StaticTransactionValidator> {
    ChainManager::new(
        genesis_block(signer),
        Verifier::new(),
        StaticTransactionValidator::default(),
    )
    .expect("genesis is valid")
}
