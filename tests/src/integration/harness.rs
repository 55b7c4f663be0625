//! Shared fixture: a fully wired engine with generated oracle keys and a
//! helper that produces signed wire reports the way a real reporting network
//! would.

use k256::ecdsa::SigningKey;

use ocr_aggregator::adapters::memory::{AccessRegistry, MemoryFeeToken};
use ocr_aggregator::{Aggregator, BillingParams, CreditPolicy, EngineSettings};
use ocr_report_codec::{encode, AggregateAnswer, Observation, Report};
use ocr_signature_verification::test_helpers::{generate_keypair, sign};
use ocr_signature_verification::{address_from_pubkey, keccak256, EcdsaSignature, QuorumRule};
use shared_types::Address;

pub const ADMIN: Address = [0x01; 20];
pub const VAULT_FUNDING: u64 = 1_000_000_000_000;

pub struct Network {
    pub engine: Aggregator<MemoryFeeToken, AccessRegistry>,
    pub keys: Vec<SigningKey>,
    pub signers: Vec<Address>,
    pub transmitters: Vec<Address>,
}

/// Billing parameters of the observed two-signer deployment.
pub fn deployment_billing() -> BillingParams {
    BillingParams {
        maximum_gas_price: 1,
        reasonable_gas_price: 10,
        micro_fee_token_per_native_unit: 1_000_000,
        fee_units_per_observation: 500,
        fee_units_per_transmission: 300,
    }
}

/// Spin up an engine with `oracle_count` generated oracles and an installed
/// first configuration epoch.
pub fn network(oracle_count: usize, quorum: u8) -> Network {
    network_with_funding(oracle_count, quorum, VAULT_FUNDING)
}

/// Like [`network`], with an explicit vault funding.
pub fn network_with_funding(oracle_count: usize, quorum: u8, funding: u64) -> Network {
    let mut keys = Vec::with_capacity(oracle_count);
    let mut signers = Vec::with_capacity(oracle_count);
    let mut transmitters = Vec::with_capacity(oracle_count);
    for i in 0..oracle_count {
        let (private_key, public_key) = generate_keypair();
        signers.push(address_from_pubkey(&public_key));
        keys.push(private_key);
        transmitters.push([0x10 + i as u8; 20]);
    }

    let settings = EngineSettings {
        instance_salt: [0x5a; 32],
        quorum_rule: QuorumRule::Threshold(quorum),
        credit_policy: CreditPolicy::SubmitterOnly,
        billing: deployment_billing(),
    };
    let mut engine = Aggregator::new(
        settings,
        MemoryFeeToken::funded(funding),
        AccessRegistry::allow_all(),
    );
    engine
        .install_config(ADMIN, 1, signers.clone(), transmitters.clone(), vec![])
        .unwrap();
    engine.take_events();

    Network {
        engine,
        keys,
        signers,
        transmitters,
    }
}

impl Network {
    /// Encode a report under the active configuration digest and sign its
    /// wire bytes with the given oracle keys.
    pub fn signed_report(
        &self,
        round_id: u64,
        answer: &[u8],
        observations: &[&[u8]],
        signer_indices: &[usize],
    ) -> (Vec<u8>, Vec<EcdsaSignature>) {
        let digest = self.engine.latest_config().unwrap().digest;
        let report = Report {
            config_digest: digest,
            round_id,
            answer: AggregateAnswer::from_value(answer).unwrap(),
            observer_order: (0..observations.len() as u8).collect(),
            observations: observations
                .iter()
                .map(|bytes| Observation(bytes.to_vec()))
                .collect(),
        };
        let bytes = encode(&report).unwrap();
        let hash = keccak256(&bytes);
        let signatures = signer_indices
            .iter()
            .map(|&i| sign(&hash, &self.keys[i]))
            .collect();
        (bytes, signatures)
    }
}
