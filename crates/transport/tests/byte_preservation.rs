//! Property tests for replay fidelity and decision confluence.

use std::io::{self, Read};
use std::sync::Arc;

use proptest::prelude::*;
use protocol::ProtocolName;
use test_support::{CompletionSlot, RecordingExtension, ScriptedConnection, Step};
use transport::{ConnectionOutcome, EngineStatus, HandoffConfig, HandoffEngine, HandoffResult};

fn drain(outcome: ConnectionOutcome<ScriptedConnection>) -> Vec<u8> {
    let mut stream = outcome.into_stream();
    let mut bytes = Vec::new();
    let mut chunk = [0u8; 97];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return bytes,
            Ok(n) => bytes.extend_from_slice(&chunk[..n]),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => return bytes,
            Err(err) => panic!("unexpected read error: {err}"),
        }
    }
}

/// Runs the engine over `steps` until it finishes, pumping one event per step.
fn run(
    steps: Vec<Step>,
    extension: &RecordingExtension,
    decide_early: impl FnOnce(&RecordingExtension),
) -> HandoffResult<ScriptedConnection> {
    let events = steps.len() + 1;
    let connection = ScriptedConnection::with_steps(steps);
    let slot: CompletionSlot<HandoffResult<ScriptedConnection>> = CompletionSlot::new();
    let mut engine = HandoffEngine::begin(
        connection,
        extension,
        HandoffConfig::default(),
        slot.callback(),
    );
    decide_early(extension);

    for _ in 0..events {
        if engine.on_readable() == EngineStatus::Finished {
            break;
        }
    }
    slot.take_single()
}

#[derive(Clone, Debug)]
enum EarlyDecision {
    Unsupported,
    Offer(Vec<&'static str>),
}

impl EarlyDecision {
    fn apply(&self, extension: &RecordingExtension) {
        match self {
            Self::Unsupported => {
                extension.unsupported();
            }
            Self::Offer(offer) => {
                extension.select(offer);
            }
        }
    }

    fn expected(&self) -> Option<ProtocolName> {
        match self {
            Self::Unsupported => None,
            Self::Offer(offer) => ["spdy/3.1", "spdy/3"]
                .into_iter()
                .find(|name| offer.contains(name))
                .map(ProtocolName::from),
        }
    }
}

fn early_decision() -> impl Strategy<Value = EarlyDecision> {
    let names = prop::sample::select(vec!["spdy/3.1", "spdy/3", "http/1.1", "h2"]);
    prop_oneof![
        Just(EarlyDecision::Unsupported),
        prop::collection::vec(names, 0..4).prop_map(EarlyDecision::Offer),
    ]
}

fn script() -> impl Strategy<Value = (usize, Vec<Vec<u8>>)> {
    (
        0usize..4,
        prop::collection::vec(prop::collection::vec(any::<u8>(), 1..300), 1..5),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn probed_bytes_precede_the_untouched_stream(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..300), 1..5),
        capacity in 1usize..=256,
        select_during_probe in any::<bool>(),
    ) {
        let expected: Vec<u8> = chunks.concat();
        let connection = ScriptedConnection::with_steps(chunks.into_iter().map(Step::Data));
        let extension = Arc::new(RecordingExtension::new());
        let slot: CompletionSlot<HandoffResult<ScriptedConnection>> = CompletionSlot::new();
        let config = HandoffConfig::default().with_probe_capacity(capacity);
        let mut engine = HandoffEngine::begin(connection.clone(), &*extension, config, slot.callback());

        if select_during_probe {
            let hook = Arc::clone(&extension);
            connection.after_next_read(move || {
                hook.select(&["spdy/3"]);
            });
        }

        prop_assert_eq!(engine.on_readable(), EngineStatus::Finished);
        let outcome = slot.take_single().unwrap();
        prop_assert_eq!(outcome.is_fallback(), !select_during_probe);
        prop_assert_eq!(drain(outcome), expected);
    }

    #[test]
    fn early_decision_alone_determines_the_result(
        decision in early_decision(),
        (pending, chunks) in script(),
    ) {
        let mut steps: Vec<Step> = std::iter::repeat_n(Step::Pending, pending).collect();
        steps.extend(chunks.into_iter().map(Step::Data));

        let extension = RecordingExtension::new();
        let outcome = run(steps, &extension, |ext| decision.apply(ext)).unwrap();

        prop_assert_eq!(outcome.protocol().cloned(), decision.expected());
    }

    #[test]
    fn fixed_interleaving_is_deterministic(
        decision in early_decision(),
        (pending, chunks) in script(),
    ) {
        let steps: Vec<Step> = std::iter::repeat_n(Step::Pending, pending)
            .chain(chunks.into_iter().map(Step::Data))
            .collect();

        let first = run(steps.clone(), &RecordingExtension::new(), |ext| decision.apply(ext)).unwrap();
        let second = run(steps, &RecordingExtension::new(), |ext| decision.apply(ext)).unwrap();

        prop_assert_eq!(first.protocol(), second.protocol());
        prop_assert_eq!(drain(first), drain(second));
    }
}
