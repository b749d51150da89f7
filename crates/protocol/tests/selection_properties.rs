//! Property tests for protocol selection.

use proptest::prelude::*;
use protocol::{
    NegotiationOutcome, NextProtocolProvider, ProtocolName, ProtocolPriorityList,
    ProtocolSelector,
};

const VOCABULARY: &[&str] = &["spdy/3.1", "spdy/3", "http/1.1", "h2", "spdy/2", ""];

fn offered_names() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::collection::vec(proptest::sample::select(VOCABULARY), 0..=8)
}

/// Straightforward restatement of the selection rule.
fn reference_selection(offered: &[&str]) -> NegotiationOutcome {
    for candidate in ["spdy/3.1", "spdy/3"] {
        if offered.contains(&candidate) {
            return NegotiationOutcome::Protocol(ProtocolName::new(candidate));
        }
    }
    NegotiationOutcome::Fallback
}

proptest! {
    #[test]
    fn selection_matches_reference(offered in offered_names()) {
        let selector = ProtocolSelector::new(ProtocolPriorityList::default());
        selector.select_protocol(&offered);
        prop_assert_eq!(selector.outcome(), reference_selection(&offered));
    }

    #[test]
    fn selection_ignores_offer_order(mut offered in offered_names()) {
        let forward = ProtocolSelector::new(ProtocolPriorityList::default());
        let forward_name = forward.select_protocol(&offered);

        offered.reverse();
        let reversed = ProtocolSelector::new(ProtocolPriorityList::default());
        let reversed_name = reversed.select_protocol(&offered);

        prop_assert_eq!(forward_name, reversed_name);
        prop_assert_eq!(forward.outcome(), reversed.outcome());
    }

    #[test]
    fn first_decision_is_never_reverted(
        first in offered_names(),
        later in proptest::collection::vec(offered_names(), 0..=4),
        peer_unsupported in any::<bool>(),
    ) {
        let selector = ProtocolSelector::new(ProtocolPriorityList::default());
        let announced = selector.select_protocol(&first);
        let settled = selector.outcome();

        if peer_unsupported {
            selector.unsupported();
        }
        for offer in &later {
            prop_assert_eq!(selector.select_protocol(offer), announced.clone());
        }
        prop_assert_eq!(selector.outcome(), settled);
    }

    #[test]
    fn announced_name_is_always_from_the_priority_list(offered in offered_names()) {
        let list = ProtocolPriorityList::default();
        let selector = ProtocolSelector::new(list.clone());
        let announced = selector.select_protocol(&offered);
        prop_assert!(list.iter().any(|entry| *entry == announced));
    }
}

#[test]
fn documented_priority_examples() {
    let cases: [(&[&str], NegotiationOutcome); 3] = [
        (
            &["http/1.1", "spdy/3"],
            NegotiationOutcome::Protocol(ProtocolName::SPDY_3),
        ),
        (&["http/1.1"], NegotiationOutcome::Fallback),
        (&[], NegotiationOutcome::Fallback),
    ];

    for (offered, expected) in cases {
        let selector = ProtocolSelector::new(ProtocolPriorityList::default());
        selector.select_protocol(offered);
        assert_eq!(selector.outcome(), expected, "offered {offered:?}");
    }
}
