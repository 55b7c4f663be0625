//! # Submit-Report Pipeline
//!
//! End-to-end flows through decode, quorum authentication and round
//! commitment, exercised exactly as a transmitting oracle would drive them.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{network, ADMIN};
    use ocr_aggregator::{AggregatorError, AggregatorEvent};
    use ocr_signature_verification::test_helpers::{generate_keypair, sign};
    use ocr_signature_verification::keccak256;

    #[test]
    fn full_pipeline_commits_authenticated_report() {
        let mut net = network(4, 3);
        let transmitter = net.transmitters[0];
        let (bytes, signatures) =
            net.signed_report(10, b"1 : 5", &[b"1 : 4", b"1 : 5", b"1 : 6"], &[0, 1, 2]);

        let round_id = net
            .engine
            .transmit(transmitter, &bytes, &signatures, 1)
            .unwrap();
        assert_eq!(round_id, 1);

        let round = net.engine.latest_round().unwrap();
        assert_eq!(round.answer.value(), b"1 : 5");
        assert_eq!(round.observations.len(), 3);
        assert_eq!(round.observations[1].as_bytes(), b"1 : 5");
        assert_eq!(round.transmitter, transmitter);

        let events = net.engine.take_events();
        assert!(matches!(
            events.as_slice(),
            [AggregatorEvent::NewRound { round_id: 1, .. }]
        ));
    }

    #[test]
    fn quorum_is_enforced_over_distinct_signers() {
        let mut net = network(4, 3);
        let transmitter = net.transmitters[0];

        // Two distinct signatures plus a duplicate of the first: three
        // signatures, two distinct signers, quorum of three.
        let (bytes, mut signatures) = net.signed_report(10, b"7", &[], &[0, 1]);
        signatures.push(signatures[0].clone());

        assert!(matches!(
            net.engine.transmit(transmitter, &bytes, &signatures, 1),
            Err(AggregatorError::DuplicateSigner { index: 0 })
        ));
        assert_eq!(net.engine.latest_round_id(), 0);
    }

    #[test]
    fn signature_by_stranger_is_rejected() {
        let mut net = network(3, 2);
        let transmitter = net.transmitters[0];
        let (bytes, mut signatures) = net.signed_report(10, b"7", &[], &[0]);

        let (stranger, _) = generate_keypair();
        signatures.push(sign(&keccak256(&bytes), &stranger));

        assert!(matches!(
            net.engine.transmit(transmitter, &bytes, &signatures, 1),
            Err(AggregatorError::UnknownSigner { .. })
        ));
    }

    #[test]
    fn tampered_wire_bytes_fail_authentication() {
        let mut net = network(3, 2);
        let transmitter = net.transmitters[0];
        let (mut bytes, signatures) = net.signed_report(10, b"42", &[], &[0, 1]);

        // Flip one bit of the answer word after signing. The signatures
        // still recover to some addresses, just not to known signers.
        bytes[33] ^= 0x01;

        assert!(matches!(
            net.engine.transmit(transmitter, &bytes, &signatures, 1),
            Err(AggregatorError::UnknownSigner { .. }) | Err(AggregatorError::Unauthorized)
        ));
        assert_eq!(net.engine.latest_round_id(), 0);
    }

    #[test]
    fn replayed_report_is_rejected_even_from_another_transmitter() {
        let mut net = network(3, 2);
        let (bytes, signatures) = net.signed_report(10, b"42", &[], &[0, 1]);

        net.engine
            .transmit(net.transmitters[0], &bytes, &signatures, 1)
            .unwrap();
        assert_eq!(
            net.engine
                .transmit(net.transmitters[1], &bytes, &signatures, 1),
            Err(AggregatorError::StaleConfig)
        );
    }

    #[test]
    fn report_round_ids_may_skip_but_never_regress() {
        let mut net = network(3, 2);
        let transmitter = net.transmitters[0];

        let (bytes, signatures) = net.signed_report(10, b"a", &[], &[0, 1]);
        net.engine
            .transmit(transmitter, &bytes, &signatures, 1)
            .unwrap();

        // Skipping ahead is fine; the engine round id still advances by one.
        let (bytes, signatures) = net.signed_report(100, b"b", &[], &[0, 1]);
        assert_eq!(
            net.engine.transmit(transmitter, &bytes, &signatures, 1),
            Ok(2)
        );

        // Regressing below the committed counter is a replay.
        let (bytes, signatures) = net.signed_report(50, b"c", &[], &[0, 1]);
        assert_eq!(
            net.engine.transmit(transmitter, &bytes, &signatures, 1),
            Err(AggregatorError::StaleConfig)
        );
    }

    #[test]
    fn rejection_is_idempotent() {
        let mut net = network(3, 2);
        let transmitter = net.transmitters[0];
        let (bytes, signatures) = net.signed_report(10, b"42", &[], &[0]);

        let first = net.engine.transmit(transmitter, &bytes, &signatures, 1);
        let second = net.engine.transmit(transmitter, &bytes, &signatures, 1);
        assert_eq!(first, Err(AggregatorError::Unauthorized));
        assert_eq!(second, first);
        assert_eq!(net.engine.latest_round_id(), 0);
    }

    #[test]
    fn garbage_bytes_fail_at_decode() {
        let mut net = network(3, 2);
        assert!(matches!(
            net.engine.transmit(net.transmitters[0], &[0u8; 16], &[], 1),
            Err(AggregatorError::MalformedReport(_))
        ));
    }

    #[test]
    fn forced_round_flow() {
        let mut net = network(3, 2);
        let target = net.engine.request_new_round(ADMIN).unwrap();
        assert_eq!(net.engine.pending_round(), Some(target));
        assert!(matches!(
            net.engine.take_events().as_slice(),
            [AggregatorEvent::RoundRequested { round_id: 1, .. }]
        ));

        let (bytes, signatures) = net.signed_report(10, b"42", &[], &[0, 1]);
        let committed = net
            .engine
            .transmit(net.transmitters[0], &bytes, &signatures, 1)
            .unwrap();
        assert_eq!(committed, target);
        assert_eq!(net.engine.pending_round(), None);
    }

    #[test]
    fn round_history_is_queryable_by_id() {
        let mut net = network(3, 2);
        for (report_round, answer) in [(10u64, b"a"), (11, b"b"), (12, b"c")] {
            let (bytes, signatures) = net.signed_report(report_round, answer, &[], &[0, 1]);
            net.engine
                .transmit(net.transmitters[0], &bytes, &signatures, 1)
                .unwrap();
        }

        assert_eq!(net.engine.latest_round_id(), 3);
        assert_eq!(net.engine.round(2).unwrap().answer.value(), b"b");
        assert_eq!(net.engine.round(2).unwrap().report_round_id, 11);
        assert!(net.engine.round(4).is_none());
    }
}
