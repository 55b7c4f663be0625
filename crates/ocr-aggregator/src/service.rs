//! # Aggregation Engine Service
//!
//! [`Aggregator`] wires the domain logic to the outbound ports and owns all
//! mutable state. Every operation is an all-or-nothing transition: each
//! fallible check runs before the first write, so a rejected call leaves the
//! round history, ledger and event buffer untouched.

use std::collections::BTreeMap;

use tracing::info;

use ocr_report_codec::{decode, ReportError};
use ocr_signature_verification::{keccak256, verify_quorum, EcdsaSignature};
use shared_types::{Address, ConfigDigest};

use crate::domain::billing::compute_payment;
use crate::domain::config::{derive_digest, validate_oracle_set};
use crate::domain::entities::{
    BillingParams, CreditPolicy, EngineSettings, LeftoverPayment, OracleConfig, OracleLedger,
    Round,
};
use crate::domain::errors::AggregatorError;
use crate::events::AggregatorEvent;
use crate::ports::outbound::{AccessGateway, FeeTokenGateway, OperationTag};

/// The oracle-report aggregation engine.
///
/// Generic over the fee-token ledger and the administrative allow-list; both
/// are injected at construction and owned by the engine.
pub struct Aggregator<T: FeeTokenGateway, A: AccessGateway> {
    settings: EngineSettings,
    token: T,
    access: A,
    config: Option<OracleConfig>,
    /// Install counter; the next install becomes epoch `self.epoch + 1`.
    epoch: u32,
    /// Index-parallel with the active configuration's oracle lists.
    ledger: Vec<OracleLedger>,
    /// Unpaid balances of transmitters dropped by reconfiguration.
    leftovers: Vec<LeftoverPayment>,
    rounds: BTreeMap<u64, Round>,
    latest_round_id: u64,
    /// Replay counter: highest report round id committed so far.
    latest_report_round_id: u64,
    /// Outstanding forced-round request, if any.
    pending_round: Option<u64>,
    billing: BillingParams,
    events: Vec<AggregatorEvent>,
}

impl<T: FeeTokenGateway, A: AccessGateway> Aggregator<T, A> {
    /// Create an engine with no active configuration.
    pub fn new(settings: EngineSettings, token: T, access: A) -> Self {
        let billing = settings.billing;
        Aggregator {
            settings,
            token,
            access,
            config: None,
            epoch: 0,
            ledger: Vec::new(),
            leftovers: Vec::new(),
            rounds: BTreeMap::new(),
            latest_round_id: 0,
            latest_report_round_id: 0,
            pending_round: None,
            billing,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Install a new configuration epoch, superseding the active one.
    /// Returns the new epoch's digest.
    ///
    /// The ledger follows transmitter identity across installs: a surviving
    /// transmitter keeps its slot contents, a removed transmitter's unpaid
    /// balance becomes a [`LeftoverPayment`], and a returning transmitter
    /// reclaims its leftover into the fresh slot.
    pub fn install_config(
        &mut self,
        caller: Address,
        version: u64,
        signers: Vec<Address>,
        transmitters: Vec<Address>,
        encoded_extra: Vec<u8>,
    ) -> Result<ConfigDigest, AggregatorError> {
        if !self.access.is_authorized(&caller, OperationTag::InstallConfig) {
            return Err(AggregatorError::Unauthorized);
        }
        validate_oracle_set(&signers, &transmitters)?;

        let current = self.config.as_ref().map(|c| c.version).unwrap_or(0);
        if version <= current {
            return Err(AggregatorError::NonMonotonicVersion { version, current });
        }
        if !self.settings.quorum_rule.satisfiable(signers.len()) {
            return Err(AggregatorError::QuorumUnsatisfiable {
                required: self.settings.quorum_rule.required(),
                signers: signers.len(),
            });
        }

        let epoch = self.epoch + 1;
        let digest = derive_digest(
            &self.settings.instance_salt,
            epoch,
            version,
            &signers,
            &transmitters,
            &encoded_extra,
        );

        self.carry_ledger(&transmitters);
        self.epoch = epoch;
        self.config = Some(OracleConfig {
            version,
            epoch,
            signers,
            transmitters,
            encoded_extra,
            digest,
            quorum: self.settings.quorum_rule.required(),
        });

        info!(%digest, version, epoch, "configuration installed");
        self.events.push(AggregatorEvent::ConfigInstalled {
            digest,
            version,
            epoch,
        });
        Ok(digest)
    }

    /// The active configuration epoch, if one has been installed.
    pub fn latest_config(&self) -> Option<&OracleConfig> {
        self.config.as_ref()
    }

    /// Rebuild the ledger for a new transmitter list, preserving balances
    /// across the install.
    fn carry_ledger(&mut self, transmitters: &[Address]) {
        let old_transmitters = self
            .config
            .as_ref()
            .map(|c| c.transmitters.clone())
            .unwrap_or_default();
        let old_ledger = std::mem::take(&mut self.ledger);

        // Transmitters not carried into the new set keep their balance
        // withdrawable as a leftover. The payee registration survives even
        // at zero balance, so a returning transmitter's payee never
        // silently resets.
        for (transmitter, slot) in old_transmitters.iter().zip(&old_ledger) {
            if !transmitters.contains(transmitter)
                && (slot.owed_payment > 0 || slot.payee.is_some())
            {
                self.leftovers.push(LeftoverPayment {
                    transmitter: *transmitter,
                    payee: slot.payee,
                    amount: slot.owed_payment,
                });
            }
        }

        self.ledger = transmitters
            .iter()
            .map(|transmitter| {
                let mut slot = old_transmitters
                    .iter()
                    .position(|t| t == transmitter)
                    .map(|i| old_ledger[i].clone())
                    .unwrap_or_default();

                // A returning transmitter reclaims any leftover from an
                // earlier removal.
                if let Some(i) = self
                    .leftovers
                    .iter()
                    .position(|l| l.transmitter == *transmitter)
                {
                    let leftover = self.leftovers.remove(i);
                    slot.owed_payment = slot.owed_payment.saturating_add(leftover.amount);
                    if slot.payee.is_none() {
                        slot.payee = leftover.payee;
                    }
                }
                slot
            })
            .collect();
    }

    // ------------------------------------------------------------------
    // Billing administration
    // ------------------------------------------------------------------

    /// Replace the billing parameters; applies to subsequent transmissions.
    pub fn set_billing(
        &mut self,
        caller: Address,
        params: BillingParams,
    ) -> Result<(), AggregatorError> {
        if !self.access.is_authorized(&caller, OperationTag::SetBilling) {
            return Err(AggregatorError::Unauthorized);
        }
        self.billing = params;
        self.events.push(AggregatorEvent::BillingUpdated { params });
        Ok(())
    }

    /// The billing parameters currently in force.
    pub fn billing(&self) -> BillingParams {
        self.billing
    }

    /// Assign withdrawal destinations for transmitters.
    ///
    /// Validates the whole batch before applying any of it; a transmitter
    /// may appear at most once per batch. A payee is settable once; only the
    /// current payee may redirect it afterwards.
    pub fn set_payees(
        &mut self,
        caller: Address,
        transmitters: &[Address],
        payees: &[Address],
    ) -> Result<(), AggregatorError> {
        if !self.access.is_authorized(&caller, OperationTag::SetPayees) {
            return Err(AggregatorError::Unauthorized);
        }
        if transmitters.len() != payees.len() {
            return Err(AggregatorError::PayeeListMismatch {
                transmitters: transmitters.len(),
                payees: payees.len(),
            });
        }
        let config = self.config.as_ref().ok_or(AggregatorError::NoActiveConfig)?;

        let mut indices = Vec::with_capacity(transmitters.len());
        for (position, transmitter) in transmitters.iter().enumerate() {
            if transmitters[..position].contains(transmitter) {
                return Err(AggregatorError::DuplicateOracle {
                    address: *transmitter,
                });
            }
            let index = config.transmitter_index(transmitter).ok_or(
                AggregatorError::UnknownTransmitter {
                    transmitter: *transmitter,
                },
            )?;
            match self.ledger[index].payee {
                Some(current) if current != caller => {
                    return Err(AggregatorError::AlreadySet {
                        transmitter: *transmitter,
                    });
                }
                _ => indices.push(index),
            }
        }

        for (index, payee) in indices.into_iter().zip(payees) {
            self.ledger[index].payee = Some(*payee);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rounds
    // ------------------------------------------------------------------

    /// Request an extra round outside the regular reporting cadence.
    ///
    /// Returns the round id the next accepted report will be committed under.
    pub fn request_new_round(&mut self, caller: Address) -> Result<u64, AggregatorError> {
        if !self
            .access
            .is_authorized(&caller, OperationTag::RequestNewRound)
        {
            return Err(AggregatorError::Unauthorized);
        }
        if self.config.is_none() {
            return Err(AggregatorError::NoActiveConfig);
        }

        let round_id = self.latest_round_id + 1;
        self.pending_round = Some(round_id);
        self.events.push(AggregatorEvent::RoundRequested {
            requester: caller,
            round_id,
        });
        Ok(round_id)
    }

    /// Submit a signed report for commitment.
    ///
    /// The full pipeline, in order: the bytes must decode; the caller must
    /// be an active transmitter; the signature set must meet quorum over the
    /// Keccak-256 hash of the exact wire bytes; the report must echo the
    /// active configuration digest and advance the replay counter; and every
    /// observer index must fit the active oracle set. Only then does the
    /// engine commit the round and accrue payment.
    pub fn transmit(
        &mut self,
        caller: Address,
        report_bytes: &[u8],
        signatures: &[EcdsaSignature],
        observed_gas_price: u64,
    ) -> Result<u64, AggregatorError> {
        let config = self.config.as_ref().ok_or(AggregatorError::NoActiveConfig)?;
        let report = decode(report_bytes)?;
        let transmitter_index = config
            .transmitter_index(&caller)
            .ok_or(AggregatorError::Unauthorized)?;

        // Authenticate the exact wire bytes, never a re-encoding.
        let message_hash = keccak256(report_bytes);
        verify_quorum(&message_hash, signatures, &config.signers, config.quorum)?;

        if report.config_digest != config.digest {
            return Err(AggregatorError::StaleConfig);
        }
        if report.round_id <= self.latest_report_round_id {
            return Err(AggregatorError::StaleConfig);
        }

        let oracle_count = config.signers.len() as u8;
        for &index in &report.observer_order {
            if index >= oracle_count {
                return Err(AggregatorError::MalformedReport(
                    ReportError::ObserverIndexOutOfRange {
                        index,
                        limit: oracle_count,
                    },
                ));
            }
        }

        // All checks passed; commit.
        let round_id = self.latest_round_id + 1;
        self.latest_round_id = round_id;
        self.latest_report_round_id = report.round_id;
        if self.pending_round == Some(round_id) {
            self.pending_round = None;
        }

        let payment = compute_payment(report.observer_count(), &self.billing, observed_gas_price);
        self.ledger[transmitter_index].owed_payment = self.ledger[transmitter_index]
            .owed_payment
            .saturating_add(payment);
        self.credit_observations(transmitter_index, &report.observer_order);

        let round = Round {
            round_id,
            report_round_id: report.round_id,
            answer: report.answer,
            observer_order: report.observer_order,
            observations: report.observations,
            transmitter: caller,
        };
        info!(
            round_id,
            report_round_id = round.report_round_id,
            payment,
            "round committed"
        );
        self.events.push(AggregatorEvent::NewRound {
            round_id,
            answer: round.answer,
            transmitter: caller,
        });
        self.rounds.insert(round_id, round);
        Ok(round_id)
    }

    /// Advance observation counts per the configured credit policy.
    fn credit_observations(&mut self, transmitter_index: usize, observer_order: &[u8]) {
        match self.settings.credit_policy {
            CreditPolicy::SubmitterOnly => {
                self.ledger[transmitter_index].observation_count += 1;
            }
            CreditPolicy::ObserverSet => {
                // Bitmask dedupe: a submitter listed in the observer order is
                // credited once.
                let mut credited = 0u32;
                for &index in observer_order {
                    credited |= 1 << index;
                }
                credited |= 1 << transmitter_index;
                for (index, slot) in self.ledger.iter_mut().enumerate() {
                    if credited & (1 << index) != 0 {
                        slot.observation_count += 1;
                    }
                }
            }
        }
    }

    /// The most recently committed round.
    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.get(&self.latest_round_id)
    }

    /// A committed round by engine round id.
    pub fn round(&self, round_id: u64) -> Option<&Round> {
        self.rounds.get(&round_id)
    }

    /// Engine round id of the most recently committed round (0 before the
    /// first commit).
    pub fn latest_round_id(&self) -> u64 {
        self.latest_round_id
    }

    /// The round id an outstanding forced-round request is waiting on.
    pub fn pending_round(&self) -> Option<u64> {
        self.pending_round
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    /// Pay out a transmitter's accrued balance to its registered payee.
    ///
    /// Only the payee itself may withdraw. The external transfer runs before
    /// the ledger is zeroed, so a failed transfer leaves the balance owed.
    pub fn withdraw_payment(
        &mut self,
        caller: Address,
        transmitter: Address,
    ) -> Result<u64, AggregatorError> {
        // Active slot first, then leftovers from earlier epochs.
        if let Some(index) = self
            .config
            .as_ref()
            .and_then(|c| c.transmitter_index(&transmitter))
        {
            let payee = self.ledger[index].payee.ok_or(AggregatorError::NoPayee)?;
            if payee != caller {
                return Err(AggregatorError::Unauthorized);
            }
            let amount = self.ledger[index].owed_payment;
            self.token.transfer_to(&payee, amount)?;
            self.ledger[index].owed_payment = 0;
            self.events.push(AggregatorEvent::PaymentWithdrawn {
                transmitter,
                payee,
                amount,
            });
            return Ok(amount);
        }

        if let Some(index) = self
            .leftovers
            .iter()
            .position(|l| l.transmitter == transmitter)
        {
            let payee = self.leftovers[index].payee.ok_or(AggregatorError::NoPayee)?;
            if payee != caller {
                return Err(AggregatorError::Unauthorized);
            }
            let amount = self.leftovers[index].amount;
            self.token.transfer_to(&payee, amount)?;
            self.leftovers.remove(index);
            self.events.push(AggregatorEvent::PaymentWithdrawn {
                transmitter,
                payee,
                amount,
            });
            return Ok(amount);
        }

        Err(AggregatorError::UnknownTransmitter { transmitter })
    }

    /// Unpaid balance accrued by `transmitter`, active or leftover.
    pub fn owed_payment(&self, transmitter: &Address) -> u64 {
        if let Some(index) = self
            .config
            .as_ref()
            .and_then(|c| c.transmitter_index(transmitter))
        {
            return self.ledger[index].owed_payment;
        }
        self.leftovers
            .iter()
            .find(|l| l.transmitter == *transmitter)
            .map(|l| l.amount)
            .unwrap_or(0)
    }

    /// Rounds `transmitter` has been credited with under the active
    /// configuration.
    pub fn observation_count(&self, transmitter: &Address) -> u32 {
        self.config
            .as_ref()
            .and_then(|c| c.transmitter_index(transmitter))
            .map(|index| self.ledger[index].observation_count)
            .unwrap_or(0)
    }

    /// Registered withdrawal destination for `transmitter`.
    pub fn payee_of(&self, transmitter: &Address) -> Option<Address> {
        self.config
            .as_ref()
            .and_then(|c| c.transmitter_index(transmitter))
            .and_then(|index| self.ledger[index].payee)
    }

    // ------------------------------------------------------------------
    // Observability
    // ------------------------------------------------------------------

    /// Drain the buffered events in emission order.
    pub fn take_events(&mut self) -> Vec<AggregatorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Borrow the fee-token gateway, mainly for assertions in tests.
    pub fn token(&self) -> &T {
        &self.token
    }
}
