//! End-to-end scenario tests driving the fetch/push/ls drivers against a
//! scripted in-memory `HttpClient`, mirroring the fixture style of
//! `gix-upload-pack/tests/compatibility.rs` (hand-built request/response
//! pairs, no snapshot framework).

use std::cell::RefCell;
use std::collections::BTreeSet;

use bstr::BString;
use gix_hash::ObjectId;
use gix_smart_http::endpoint::{Endpoint, Scheme, Service, Uri};
use gix_smart_http::error::Error;
use gix_smart_http::model::Command;
use gix_smart_http::negotiator::FlatNegotiator;
use gix_smart_http::pack_generator::FixedPack;
use gix_smart_http::store::MemoryStore;
use gix_smart_http::transport::{BufferedBody, HttpClient, HttpRequest, HttpResponse, Method};
use gix_smart_http::ClientOptions;

fn data_line(buf: &mut Vec<u8>, text: &str) {
    let mut line = text.as_bytes().to_vec();
    line.push(b'\n');
    gix_packetline_blocking::encode::data_to_write(&line, buf).unwrap();
}

fn flush(buf: &mut Vec<u8>) {
    gix_packetline_blocking::encode::flush_to_write(buf).unwrap();
}

fn banded(buf: &mut Vec<u8>, channel: u8, payload: &[u8]) {
    let mut line = vec![channel];
    line.extend_from_slice(payload);
    gix_packetline_blocking::encode::data_to_write(&line, buf).unwrap();
}

fn oid(byte: u8) -> ObjectId {
    ObjectId::from_hex(format!("{byte:02x}").repeat(20).as_bytes()).unwrap()
}

fn endpoint() -> Endpoint {
    Endpoint::new(
        Uri { scheme: Scheme::Https, userinfo: None, host: Some("example.com".into()), port: None, path: "/repo.git".into() },
        vec![],
    )
}

fn advertisement_bytes(service: Service, refs: &[(ObjectId, &str)]) -> Vec<u8> {
    let caps = match service {
        Service::UploadPack => "multi_ack_detailed side-band-64k ofs-delta report-status agent=git/test-server",
        // No side-band here: the report-status scenarios exercise the
        // unwrapped report path, side-band wrapping is covered directly by
        // wire::report_status's own unit tests.
        Service::ReceivePack => "report-status ofs-delta agent=git/test-server",
    };
    let mut buf = Vec::new();
    data_line(&mut buf, &format!("# service={}", service.name()));
    flush(&mut buf);
    for (i, (id, name)) in refs.iter().enumerate() {
        if i == 0 {
            data_line(&mut buf, &format!("{} {}\0{}", id.to_hex(), name, caps));
        } else {
            data_line(&mut buf, &format!("{} {}", id.to_hex(), name));
        }
    }
    flush(&mut buf);
    buf
}

/// A client that replays a fixed script of responses in call order.
struct ScriptedClient {
    responses: RefCell<Vec<(u16, Vec<u8>)>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Vec<u8>>) -> Self {
        Self {
            responses: RefCell::new(responses.into_iter().map(|b| (200, b)).collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn with_statuses(responses: Vec<(u16, Vec<u8>)>) -> Self {
        Self { responses: RefCell::new(responses), requests: RefCell::new(Vec::new()) }
    }
}

impl HttpClient for ScriptedClient {
    fn call(&self, request: HttpRequest) -> gix_smart_http::error::Result<HttpResponse> {
        self.requests.borrow_mut().push(HttpRequest {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            timeout: request.timeout,
        });
        let (status, bytes) = self.responses.borrow_mut().remove(0);
        Ok(HttpResponse { status, body: Box::new(BufferedBody::whole(bytes)) })
    }
}

#[test]
fn discovery_only_ls_lists_refs_without_negotiating() {
    let refs = vec![(oid(0xaa), "refs/heads/main"), (oid(0xbb), "refs/heads/dev")];
    let client = ScriptedClient::new(vec![advertisement_bytes(Service::UploadPack, &refs)]);
    let options = ClientOptions::default();
    let advertisement = gix_smart_http::ls::ls(&client, &endpoint(), &options, Service::UploadPack).unwrap();

    assert_eq!(advertisement.refs.len(), 2);
    assert_eq!(advertisement.refs[0].name, "refs/heads/main");
    assert_eq!(client.requests.borrow().len(), 1);
    assert_eq!(client.requests.borrow()[0].method, Method::Get);
}

#[test]
fn clone_with_empty_haves_sends_a_single_done_round() {
    let refs = vec![(oid(0xaa), "refs/heads/main")];
    let mut negotiation_response = Vec::new();
    data_line(&mut negotiation_response, "NAK");
    banded(&mut negotiation_response, 1, b"PACK-bytes-one");
    banded(&mut negotiation_response, 1, b"PACK-bytes-two");
    flush(&mut negotiation_response);

    let client = ScriptedClient::new(vec![advertisement_bytes(Service::UploadPack, &refs), negotiation_response]);
    let options = ClientOptions::default();
    let mut store = MemoryStore::default();
    let mut negotiator = FlatNegotiator::new(BTreeSet::new());

    let outcome = gix_smart_http::clone(
        &client,
        &endpoint(),
        &options,
        &mut store,
        &mut negotiator,
        bstr::BStr::new("refs/heads/main"),
    )
    .unwrap();

    assert_eq!(outcome.rounds, 1);
    assert_eq!(outcome.object_count, 2);
    // The remote ref and the symbolic HEAD pointing at it.
    assert_eq!(store.refs.len(), 2);
    assert_eq!(client.requests.borrow().len(), 2);
    let negotiation_body = client.requests.borrow()[1].body.clone().unwrap();
    assert!(String::from_utf8_lossy(&negotiation_body).contains("done\n"));
}

#[test]
fn done_round_carries_forward_common_haves_from_earlier_rounds() {
    let refs = vec![(oid(0xaa), "refs/heads/main")];

    // Round one: the negotiator offers its one have, the server
    // acknowledges it as common but does not yet say `ready`.
    let mut round_one = Vec::new();
    data_line(&mut round_one, &format!("ACK {} common", oid(0xcc).to_hex()));
    flush(&mut round_one);

    // Round two: the negotiator has nothing left to offer and signals
    // `Done`. The terminal `done` POST must still carry the `have` from
    // round one even though the mailbox would otherwise start empty for
    // this round.
    let mut round_two = Vec::new();
    data_line(&mut round_two, "NAK");
    banded(&mut round_two, 1, b"PACKBYTES");
    flush(&mut round_two);

    let client = ScriptedClient::new(vec![advertisement_bytes(Service::UploadPack, &refs), round_one, round_two]);
    let options = ClientOptions::default();
    let mut store = MemoryStore::default();
    let mut haves = BTreeSet::new();
    haves.insert(oid(0xcc));
    let mut negotiator = FlatNegotiator::new(haves);

    let outcome = gix_smart_http::clone(
        &client,
        &endpoint(),
        &options,
        &mut store,
        &mut negotiator,
        bstr::BStr::new("refs/heads/main"),
    )
    .unwrap();
    assert_eq!(outcome.rounds, 2);

    let done_round_body = client.requests.borrow()[2].body.clone().unwrap();
    let text = String::from_utf8_lossy(&done_round_body);
    assert!(text.contains(&format!("have {}", oid(0xcc).to_hex())));
    assert!(text.contains("done\n"));
}

#[test]
fn multi_round_fetch_stops_at_ready_ack() {
    let refs = vec![(oid(0xaa), "refs/heads/main")];

    let mut round_one = Vec::new();
    data_line(&mut round_one, &format!("ACK {} common", oid(0xcc).to_hex()));
    flush(&mut round_one);

    let mut round_two = Vec::new();
    data_line(&mut round_two, &format!("ACK {} ready", oid(0xcc).to_hex()));
    banded(&mut round_two, 1, b"PACKBYTES");
    flush(&mut round_two);

    let client = ScriptedClient::new(vec![advertisement_bytes(Service::UploadPack, &refs), round_one, round_two]);
    let options = ClientOptions::default();
    let mut store = MemoryStore::default();
    let mut haves = BTreeSet::new();
    haves.insert(oid(0xcc));
    let mut negotiator = FlatNegotiator::new(haves);

    let outcome = gix_smart_http::clone(
        &client,
        &endpoint(),
        &options,
        &mut store,
        &mut negotiator,
        bstr::BStr::new("refs/heads/main"),
    )
    .unwrap();

    assert_eq!(outcome.rounds, 2);
    assert_eq!(outcome.object_count, 1);
}

#[test]
fn push_creates_and_updates_refs_and_reports_success() {
    let refs = vec![(oid(0xaa), "refs/heads/main")];
    let mut report = Vec::new();
    data_line(&mut report, "unpack ok");
    data_line(&mut report, "ok refs/heads/main");
    data_line(&mut report, "ok refs/heads/feature");
    flush(&mut report);

    let client = ScriptedClient::new(vec![advertisement_bytes(Service::ReceivePack, &refs), report]);
    let options = ClientOptions::default();
    let mut generator = FixedPack(b"PACKDATA".to_vec());

    let outcome = gix_smart_http::push(&client, &endpoint(), &options, &mut generator, |advertisement| {
        let mut commands = Vec::new();
        for entry in &advertisement.refs {
            commands.push(Command::Update { old: entry.target, new: oid(0xdd), name: entry.name.clone() });
        }
        commands.push(Command::Create { new: oid(0xee), name: BString::from("refs/heads/feature") });
        commands
    })
    .unwrap();

    let report = outcome.report.expect("report-status was negotiated");
    assert!(report.unpack.is_ok());
    assert_eq!(report.commands.len(), 2);
    assert!(report.commands.iter().all(|(_, status)| status.is_ok()));
}

#[test]
fn discovery_failure_surfaces_server_payload_as_sync_error() {
    let client = ScriptedClient::with_statuses(vec![(503, b"Service Temporarily Unavailable".to_vec())]);
    let options = ClientOptions::default();
    let err = gix_smart_http::ls::ls(&client, &endpoint(), &options, Service::UploadPack).unwrap_err();
    match err {
        Error::Sync(msg) => assert!(msg.contains("Service Temporarily Unavailable")),
        other => panic!("expected Sync, got {other:?}"),
    }
}

#[test]
fn push_report_status_surfaces_per_ref_failure() {
    let refs = vec![(oid(0xaa), "refs/heads/main")];
    let mut report = Vec::new();
    data_line(&mut report, "unpack ok");
    data_line(&mut report, "ng refs/heads/main non-fast-forward");
    flush(&mut report);

    let client = ScriptedClient::new(vec![advertisement_bytes(Service::ReceivePack, &refs), report]);
    let options = ClientOptions::default();
    let mut generator = FixedPack(Vec::new());

    let outcome = gix_smart_http::push(&client, &endpoint(), &options, &mut generator, |advertisement| {
        vec![Command::Update { old: advertisement.refs[0].target, new: oid(0xdd), name: advertisement.refs[0].name.clone() }]
    })
    .unwrap();

    let report = outcome.report.unwrap();
    assert!(report.unpack.is_ok());
    assert_eq!(report.commands[0].1.as_ref().unwrap_err(), "non-fast-forward");
}
