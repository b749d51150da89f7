//! Workspace-level checks through the facade crate.

use std::io::Read;

use npn_handoff::protocol::NextProtocolProvider;
use npn_handoff::transport::{EngineStatus, HandoffResult};
use npn_handoff::{
    ConnectionOutcome, HandoffConfig, HandoffEngine, NegotiationOutcome, ProtocolName,
    ProtocolPriorityList, ProtocolSelector,
};
use test_support::{CompletionSlot, RecordingExtension, ScriptedConnection, Step};

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

#[test]
fn fallback_handoff_through_facade() {
    let connection = ScriptedConnection::with_steps([
        Step::Data(b"GET / HTTP/1.1\r\n".to_vec()),
        Step::Data(b"Host: example.com\r\n\r\n".to_vec()),
        Step::Eof,
    ]);
    let extension = RecordingExtension::new();
    let slot: CompletionSlot<HandoffResult<ScriptedConnection>> = CompletionSlot::new();

    let mut engine = HandoffEngine::begin(
        connection,
        &extension,
        HandoffConfig::default(),
        slot.callback(),
    );
    assert_eq!(engine.on_readable(), EngineStatus::Finished);

    let ConnectionOutcome::Fallback(mut stream) = slot.take_single().unwrap() else {
        panic!("expected fallback");
    };
    let mut request = String::new();
    stream.read_to_string(&mut request).unwrap();
    assert_eq!(request, "GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
}
