//! # Billing Flows
//!
//! Fee accrual across transmissions, withdrawal authorization and the
//! conservation property: every unit accrued is either still owed or sits in
//! a payee's balance, never both and never neither.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{
        deployment_billing, network, network_with_funding, ADMIN, VAULT_FUNDING,
    };
    use ocr_aggregator::{AggregatorError, BillingParams, FeeTokenGateway};

    const PAYEE_A: [u8; 20] = [0xa1; 20];
    const PAYEE_B: [u8; 20] = [0xa2; 20];

    #[test]
    fn deployment_rate_accrues_per_accepted_report() {
        let mut net = network(2, 2);
        let transmitter = net.transmitters[0];

        for round in 1..=3u64 {
            let (bytes, signatures) = net.signed_report(round, b"42", &[b"41"], &[0, 1]);
            net.engine
                .transmit(transmitter, &bytes, &signatures, 1)
                .unwrap();
        }

        // (300 + 500) * 1e6 / 10 per report.
        assert_eq!(net.engine.owed_payment(&transmitter), 3 * 80_000_000);
        assert_eq!(net.engine.observation_count(&transmitter), 3);
    }

    #[test]
    fn rejected_reports_accrue_nothing() {
        let mut net = network(2, 2);
        let transmitter = net.transmitters[0];

        // Below quorum.
        let (bytes, signatures) = net.signed_report(1, b"42", &[], &[0]);
        assert!(net
            .engine
            .transmit(transmitter, &bytes, &signatures, 1)
            .is_err());
        assert_eq!(net.engine.owed_payment(&transmitter), 0);
        assert_eq!(net.engine.observation_count(&transmitter), 0);
    }

    #[test]
    fn gas_price_is_capped_at_the_billing_maximum() {
        let mut net = network(2, 2);
        let transmitter = net.transmitters[0];

        let (bytes, signatures) = net.signed_report(1, b"42", &[], &[0, 1]);
        net.engine
            .transmit(transmitter, &bytes, &signatures, u64::MAX)
            .unwrap();

        let expected = {
            let p = deployment_billing();
            // Capped at maximum_gas_price = 1.
            (p.fee_units_per_transmission + p.fee_units_per_observation)
                * p.micro_fee_token_per_native_unit
                / p.reasonable_gas_price
        };
        assert_eq!(net.engine.owed_payment(&transmitter), expected);
    }

    #[test]
    fn billing_update_takes_effect_for_subsequent_reports() {
        let mut net = network(2, 2);
        let transmitter = net.transmitters[0];

        let (bytes, signatures) = net.signed_report(1, b"42", &[], &[0, 1]);
        net.engine
            .transmit(transmitter, &bytes, &signatures, 1)
            .unwrap();
        let before = net.engine.owed_payment(&transmitter);

        net.engine
            .set_billing(
                ADMIN,
                BillingParams {
                    fee_units_per_transmission: 600,
                    ..deployment_billing()
                },
            )
            .unwrap();

        let (bytes, signatures) = net.signed_report(2, b"42", &[], &[0, 1]);
        net.engine
            .transmit(transmitter, &bytes, &signatures, 1)
            .unwrap();

        // (600 + 500) * 1e6 / 10 for the second report only.
        assert_eq!(
            net.engine.owed_payment(&transmitter),
            before + 110_000_000
        );
    }

    #[test]
    fn withdrawal_conserves_total_value() {
        let mut net = network(3, 2);
        let [tx_a, tx_b] = [net.transmitters[0], net.transmitters[1]];

        let (bytes, signatures) = net.signed_report(1, b"a", &[], &[0, 1]);
        net.engine.transmit(tx_a, &bytes, &signatures, 1).unwrap();
        let (bytes, signatures) = net.signed_report(2, b"b", &[], &[0, 1]);
        net.engine.transmit(tx_b, &bytes, &signatures, 1).unwrap();

        net.engine
            .set_payees(ADMIN, &[tx_a, tx_b], &[PAYEE_A, PAYEE_B])
            .unwrap();

        let owed_a = net.engine.owed_payment(&tx_a);
        let owed_b = net.engine.owed_payment(&tx_b);
        net.engine.withdraw_payment(PAYEE_A, tx_a).unwrap();
        net.engine.withdraw_payment(PAYEE_B, tx_b).unwrap();

        assert_eq!(net.engine.owed_payment(&tx_a), 0);
        assert_eq!(net.engine.owed_payment(&tx_b), 0);
        assert_eq!(net.engine.token().balance_of(&PAYEE_A), owed_a);
        assert_eq!(net.engine.token().balance_of(&PAYEE_B), owed_b);
        assert_eq!(
            net.engine.token().vault_balance(),
            VAULT_FUNDING - owed_a - owed_b
        );
    }

    #[test]
    fn double_withdrawal_pays_nothing_extra() {
        let mut net = network(2, 2);
        let transmitter = net.transmitters[0];
        let (bytes, signatures) = net.signed_report(1, b"42", &[], &[0, 1]);
        net.engine
            .transmit(transmitter, &bytes, &signatures, 1)
            .unwrap();
        net.engine
            .set_payees(ADMIN, &[transmitter], &[PAYEE_A])
            .unwrap();

        let first = net.engine.withdraw_payment(PAYEE_A, transmitter).unwrap();
        let second = net.engine.withdraw_payment(PAYEE_A, transmitter).unwrap();

        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(net.engine.token().balance_of(&PAYEE_A), first);
    }

    #[test]
    fn failed_transfer_leaves_the_balance_owed() {
        // Vault too small to cover the accrued payment.
        let mut net = network_with_funding(2, 2, 100);
        let transmitter = net.transmitters[0];
        let (bytes, signatures) = net.signed_report(1, b"42", &[], &[0, 1]);
        net.engine
            .transmit(transmitter, &bytes, &signatures, 1)
            .unwrap();
        net.engine
            .set_payees(ADMIN, &[transmitter], &[PAYEE_A])
            .unwrap();
        let owed = net.engine.owed_payment(&transmitter);
        assert!(owed > 100);

        for _ in 0..2 {
            assert!(matches!(
                net.engine.withdraw_payment(PAYEE_A, transmitter),
                Err(AggregatorError::TransferFailed(_))
            ));
            assert_eq!(net.engine.owed_payment(&transmitter), owed);
            assert_eq!(net.engine.token().balance_of(&PAYEE_A), 0);
            assert_eq!(net.engine.token().vault_balance(), 100);
        }
    }

    #[test]
    fn withdrawal_requires_the_registered_payee() {
        let mut net = network(2, 2);
        let transmitter = net.transmitters[0];
        net.engine
            .set_payees(ADMIN, &[transmitter], &[PAYEE_A])
            .unwrap();

        assert_eq!(
            net.engine.withdraw_payment(PAYEE_B, transmitter),
            Err(AggregatorError::Unauthorized)
        );
        assert_eq!(
            net.engine.withdraw_payment(PAYEE_A, net.transmitters[1]),
            Err(AggregatorError::NoPayee)
        );
    }
}
