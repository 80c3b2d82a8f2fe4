//! Integration tests for graphwire.
//!
//! These tests verify the integration between different modules: options
//! resolution feeding the request shape, the failure taxonomy crossing the
//! wire, and the reassembly of response streams from arbitrary chunkings.

use graphwire::codec::{encode_envelope, EnvelopeDeserializer, ResponseDeserializer};
use graphwire::connection::{spawn_response_reader, ConnectionConfig};
use graphwire::options::{resolve, OptionsStrategy, Query, RequestOptions};
use graphwire::protocol::{tokens, ErrorKind, GraphError, RequestMessage, ResponseMessage};
use graphwire::ResponseReassembler;
use serde_json::json;

fn batch(values: &[i64]) -> ResponseMessage {
    ResponseMessage::batch(values.iter().map(|v| json!(v)).collect())
}

/// Resolving a bare query enables bulking; an empty options value does not.
#[test]
fn test_bulking_default_asymmetry() {
    let resolved = resolve(&Query::new("g.V()"));
    assert!(resolved.bulking());

    assert!(!RequestOptions::EMPTY.bulking());
    assert!(!RequestOptions::builder().build().bulking());
}

/// A reserved parameter binding wins over anything the strategies set.
#[test]
fn test_reserved_parameter_binding_wins() {
    let query = Query::new("g.V().out()")
        .strategy(
            OptionsStrategy::new()
                .option(tokens::LANGUAGE, json!("strategy-lang"))
                .option(tokens::BATCH_SIZE, json!(100)),
        )
        .parameter("g", json!("social"))
        .parameter("language", json!("parameter-lang"));

    let options = resolve(&query);

    assert_eq!(options.source_alias(), Some("social"));
    assert_eq!(options.language(), Some("parameter-lang"));
    // Non-reserved fields keep the strategy value.
    assert_eq!(options.batch_size(), Some(100));
    // Reserved names are still ordinary bindings as well.
    let parameters = options.parameters().unwrap();
    assert_eq!(parameters["g"], json!("social"));
    assert_eq!(parameters["language"], json!("parameter-lang"));
}

/// Resolved options survive the full trip onto a request and across the wire.
#[test]
fn test_resolved_options_cross_the_wire() {
    let query = Query::new("g.V().has('name', name)")
        .strategy(
            OptionsStrategy::new()
                .option(tokens::EVAL_TIMEOUT, json!(2_500))
                .option(tokens::MATERIALIZE_PROPERTIES, json!("tokens")),
        )
        .parameter("name", json!("marko"));

    let request = RequestMessage::new(query.text()).with_options(&resolve(&query));

    let wire = encode_envelope(&request).unwrap();
    let mut session = EnvelopeDeserializer::<RequestMessage>::new();
    let decoded = session.feed(&wire).unwrap().unwrap();

    assert_eq!(decoded.query, "g.V().has('name', name)");
    assert_eq!(decoded.evaluation_timeout, Some(2_500));
    assert_eq!(decoded.materialize_properties.as_deref(), Some("tokens"));
    assert_eq!(decoded.bulking, Some(true));
    assert_eq!(decoded.bindings.unwrap()["name"], json!("marko"));
}

/// Every failure the taxonomy can produce stays inside the closed sets.
#[test]
fn test_taxonomy_closed_sets() {
    let request = RequestMessage::new("g.V().count()");
    let cause = std::io::Error::new(std::io::ErrorKind::Other, "boom");

    let errors = [
        GraphError::malformed_request(&request),
        GraphError::unknown_operation("frame"),
        GraphError::invalid_bindings(),
        GraphError::reserved_bindings(&["g"]),
        GraphError::excess_bindings(300, 255),
        GraphError::unresolved_alias("social"),
        GraphError::missing_source(),
        GraphError::unconfigured_source("social"),
        GraphError::unsupported_function(&cause),
        GraphError::query_deserialization(&cause),
        GraphError::timeout(&request),
        GraphError::timed_interrupt(),
        GraphError::rate_limited(),
        GraphError::serialization(&cause),
        GraphError::frame_too_large(&cause),
        GraphError::request_too_large(&request),
        GraphError::fail_step("stop here"),
        GraphError::evaluation(&cause),
        GraphError::general(&cause),
    ];

    for error in &errors {
        assert!(!error.message().is_empty());
        assert!(matches!(error.code(), 400 | 413 | 429 | 500));
        assert!(ErrorKind::ALL.contains(&error.kind()));
    }
    assert_eq!(ErrorKind::ALL.len(), 8);
}

/// A classified failure crosses the wire with its kind intact.
#[test]
fn test_error_kind_survives_the_wire() {
    let cause = std::io::Error::new(std::io::ErrorKind::Other, "vertex storage offline");
    let terminal = ResponseMessage::from_error(GraphError::evaluation(&cause));

    let wire = encode_envelope(&terminal).unwrap();
    let mut session = EnvelopeDeserializer::<ResponseMessage>::new();
    let decoded = session.feed(&wire).unwrap().unwrap();

    let status = decoded.status.unwrap();
    assert_eq!(status.code, 500);
    assert_eq!(status.exception, Some(ErrorKind::ServerEvaluation));
    assert_eq!(status.message, "vertex storage offline");
}

/// Two complete messages in one chunk come out as exactly two, in order.
#[test]
fn test_coalesced_chunk_emits_two_messages_once() {
    let mut chunk = encode_envelope(&batch(&[1])).unwrap();
    chunk.extend_from_slice(&encode_envelope(&batch(&[2])).unwrap());

    let mut reassembler = ResponseReassembler::new(EnvelopeDeserializer::new());
    let mut out: Vec<ResponseMessage> = Vec::new();
    reassembler.on_chunk(&chunk, &mut out).unwrap();

    assert_eq!(out, vec![batch(&[1]), batch(&[2])]);

    // Exhausted session keeps answering "nothing" on further takes.
    let mut session = reassembler.into_session();
    for _ in 0..4 {
        assert!(session.try_take().unwrap().is_none());
    }
}

/// A message split across two chunks emits nothing, then exactly one.
#[test]
fn test_split_message_emits_zero_then_one() {
    let wire = encode_envelope(&batch(&[7, 8, 9])).unwrap();
    let half = wire.len() / 2;

    let mut reassembler = ResponseReassembler::new(EnvelopeDeserializer::new());
    let mut out: Vec<ResponseMessage> = Vec::new();

    reassembler.on_chunk(&wire[..half], &mut out).unwrap();
    assert!(out.is_empty());

    reassembler.on_chunk(&wire[half..], &mut out).unwrap();
    assert_eq!(out, vec![batch(&[7, 8, 9])]);
}

/// Any chunking of an exchange stream reassembles the same message sequence.
#[test]
fn test_reassembly_is_chunking_independent() {
    let mut stream = Vec::new();
    stream.extend_from_slice(&encode_envelope(&batch(&[1, 1, 2])).unwrap());
    stream.extend_from_slice(&encode_envelope(&batch(&[3])).unwrap());
    stream.extend_from_slice(&encode_envelope(&ResponseMessage::ok(vec![json!(4)])).unwrap());

    for chunk_size in [1, 2, 3, 5, 7, 16, 64, stream.len()] {
        let mut reassembler = ResponseReassembler::new(EnvelopeDeserializer::new());
        let mut out: Vec<ResponseMessage> = Vec::new();

        for chunk in stream.chunks(chunk_size) {
            reassembler.on_chunk(chunk, &mut out).unwrap();
        }

        assert_eq!(out.len(), 3, "chunk_size={}", chunk_size);
        assert_eq!(out[0], batch(&[1, 1, 2]));
        assert_eq!(out[1], batch(&[3]));
        assert!(out[2].is_terminal());
    }
}

/// The oversized-request preview stays capped no matter the request size.
#[test]
fn test_request_preview_is_always_capped() {
    let mut previous_len = 0;
    for repeat in [1usize, 10, 1_000, 10_000] {
        let request = RequestMessage::new("g.inject('x').".repeat(repeat));
        let message_len = GraphError::request_too_large(&request).message().len();
        assert!(message_len >= previous_len);
        assert!(message_len < graphwire::protocol::REQUEST_PREVIEW_LIMIT + 256);
        previous_len = message_len;
    }
}

/// A corrupt envelope ends the exchange with one classified terminal error.
#[tokio::test]
async fn test_decode_fault_surfaces_as_classified_response() {
    use tokio::io::AsyncWriteExt;

    let (mut server, client) = tokio::io::duplex(4096);
    let (mut responses, task) = spawn_response_reader(client, ConnectionConfig::default());

    server
        .write_all(&encode_envelope(&batch(&[10, 20])).unwrap())
        .await
        .unwrap();

    let garbage = [0xc1u8; 16]; // 0xc1 is never valid MessagePack
    server
        .write_all(&(garbage.len() as u32).to_be_bytes())
        .await
        .unwrap();
    server.write_all(&garbage).await.unwrap();

    assert_eq!(responses.recv().await.unwrap(), batch(&[10, 20]));

    let terminal = responses.recv().await.unwrap();
    let status = terminal.status.expect("fault must be terminal");
    assert_eq!(status.code, 500);
    assert_eq!(status.exception, Some(ErrorKind::ServerSerialization));

    assert!(responses.recv().await.is_none());
    assert!(task.await.unwrap().is_err());
}
