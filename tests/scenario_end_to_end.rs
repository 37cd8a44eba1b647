//! Exercises the envelope/session-key contract end to end (scenario 6),
//! standing a trivial in-test closure in for the out-of-scope plugin
//! dispatcher so the codec's own contract can be demonstrated without
//! shipping a dispatcher implementation.

use eamuse_codec::charset::TextCharset;
use eamuse_codec::envelope::{self, Compression, PacketFormat};
use eamuse_codec::node::Node;

/// Stand-in for the `{game, action} -> handler` registry: resolves only
/// `services.get` and otherwise returns `None`, mirroring `HandlerAbsent`.
fn dispatch_stub(action: &str, _request: &Node) -> Option<Node> {
    match action {
        "services.get" => {
            let mut response = Node::void("response");
            let mut services = Node::void("services");
            services.set_attribute("status", "0");
            response.add_child(services);
            Some(response)
        }
        _ => None,
    }
}

#[test]
fn end_to_end_handler_echo() {
    let mut call = Node::void("call");
    call.set_attribute("model", "NBT:J:A:A:2024050100");

    let inbound_body = {
        let serialized = eamuse_codec::binary::encode(&call, TextCharset::Utf8).unwrap();
        eamuse_codec::lz77::compress(&serialized)
    };

    let decoded_call = envelope::decode(Compression::Lz77, "", &inbound_body).unwrap();
    assert_eq!(decoded_call, call);

    let response = dispatch_stub("services.get", &decoded_call).expect("services.get is registered");

    let (body, info) = envelope::encode(Compression::None, &response, TextCharset::Utf8, PacketFormat::Binary).unwrap();

    let info_pattern = regex_like_check(&info);
    assert!(info_pattern, "X-Eamuse-Info {info:?} does not match 1-[0-9a-f]{{8}}-[0-9a-f]{{4}}");

    let (roundtripped, _) = eamuse_codec::binary::decode(&body).unwrap();
    assert_eq!(roundtripped, response);
}

#[test]
fn unregistered_action_is_handler_absent() {
    let call = Node::void("call");
    assert!(dispatch_stub("nonexistent.action", &call).is_none());
}

/// Hand-rolled `1-[0-9a-f]{8}-[0-9a-f]{4}` check; no regex dependency is
/// otherwise needed in this crate so one isn't pulled in just for a test.
fn regex_like_check(info: &str) -> bool {
    let parts: Vec<&str> = info.split('-').collect();
    parts.len() == 3
        && parts[0] == "1"
        && parts[1].len() == 8
        && parts[1].chars().all(|c| c.is_ascii_hexdigit())
        && parts[2].len() == 4
        && parts[2].chars().all(|c| c.is_ascii_hexdigit())
}
