//! Decoding of hand-assembled DER fixtures
//!
//! The fixtures are built field by field so each length byte can be checked
//! against the structure it describes.

use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use ocsp_proto::{
    decode_basic_response, decode_request, decode_response, decode_response_as_basic,
    encode_request, encode_response_from_basic, CertStatus, ResponderId, ResponseStatus,
    OID_OCSP_NONCE,
};

/// SHA-1 CertID for serial 0x01E240 with fixed issuer hashes (62 bytes)
fn cert_id_hex() -> String {
    [
        "303C",
        // AlgorithmIdentifier { id-sha1, NULL }
        "3009",
        "06052B0E03021A",
        "0500",
        // issuerNameHash, issuerKeyHash
        "0414",
        &"11".repeat(20),
        "0414",
        &"22".repeat(20),
        // serialNumber
        "020301E240",
    ]
    .concat()
}

fn nonce_value() -> Vec<u8> {
    let mut value = vec![0x04, 0x10];
    value.extend(0u8..16);
    value
}

fn request_fixture() -> Vec<u8> {
    let hex = [
        "3069",
        // TBSRequest
        "3067",
        // requestList
        "3040",
        "303E",
        &cert_id_hex(),
        // requestExtensions [2] { Extension { id-pkix-ocsp-nonce, OCTET STRING } }
        "A223",
        "3021",
        "301F",
        "06092B0601050507300102",
        "0412",
        "0410",
        "000102030405060708090A0B0C0D0E0F",
    ]
    .concat();
    hex::decode(hex).unwrap()
}

/// BasicOCSPResponse with one good SingleResponse (153 bytes)
fn basic_hex() -> String {
    // "20240101000000Z"
    let time = "180F32303234303130313030303030305A";
    [
        "308196",
        // ResponseData
        "307E",
        // responderID byKey
        "A216",
        "0414",
        &"33".repeat(20),
        time,
        // responses
        "3053",
        "3051",
        &cert_id_hex(),
        // good
        "8000",
        time,
        // sha256WithRSAEncryption, NULL
        "300D",
        "06092A864886F70D01010B",
        "0500",
        // signature
        "030500DEADBEEF",
    ]
    .concat()
}

fn response_fixture() -> Vec<u8> {
    let hex = [
        "3081B0",
        // responseStatus successful
        "0A0100",
        "A081AA",
        "3081A7",
        "06092B0601050507300101",
        "048199",
        &basic_hex(),
    ]
    .concat();
    hex::decode(hex).unwrap()
}

#[test]
fn test_golden_request_decode() {
    let bytes = request_fixture();
    assert_eq!(bytes.len(), 0x6B);

    let request = decode_request(&bytes).unwrap();
    let tbs = &request.tbs_request;
    assert_eq!(tbs.version, 0);
    assert!(tbs.requestor_name.is_none());
    assert!(request.optional_signature.is_none());
    assert_eq!(tbs.request_list.len(), 1);

    let cert_id = &tbs.request_list[0].req_cert;
    assert_eq!(cert_id.hash_algorithm.algorithm.to_id_string(), "1.3.14.3.2.26");
    assert_eq!(cert_id.hash_algorithm.parameters, Some(vec![0x05, 0x00]));
    assert_eq!(cert_id.issuer_name_hash, vec![0x11; 20]);
    assert_eq!(cert_id.issuer_key_hash, vec![0x22; 20]);
    assert_eq!(cert_id.serial_number, BigInt::from(123_456));

    assert_eq!(tbs.request_extensions.len(), 1);
    assert_eq!(tbs.request_extensions[0].id, OID_OCSP_NONCE);
    assert!(!tbs.request_extensions[0].critical);
    assert_eq!(request.nonce(), Some(nonce_value().as_slice()));
}

#[test]
fn test_golden_request_reencodes_identically() {
    let bytes = request_fixture();
    let request = decode_request(&bytes).unwrap();
    assert_eq!(encode_request(&request).unwrap(), bytes);
}

#[test]
fn test_golden_response_decode() {
    let bytes = response_fixture();
    assert_eq!(bytes.len(), 0xB3);

    let response = decode_response(&bytes).unwrap();
    assert_eq!(response.response_status, ResponseStatus::Successful);
    let response_bytes = response.response_bytes.unwrap();
    assert!(response_bytes.is_basic());
    assert_eq!(response_bytes.response, hex::decode(basic_hex()).unwrap());

    let basic = decode_response_as_basic(&bytes).unwrap();
    let data = &basic.tbs_response_data;
    assert_eq!(data.version, 0);
    assert_eq!(data.responder_id, ResponderId::ByKey(vec![0x33; 20]));
    assert_eq!(
        data.produced_at,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
    assert!(data.response_extensions.is_empty());

    let single = &basic.responses()[0];
    assert_eq!(single.status(), Some(CertStatus::Good));
    assert_eq!(single.cert_id.serial_number, BigInt::from(123_456));
    assert_eq!(single.this_update, data.produced_at);
    assert!(single.next_update.is_none());

    assert_eq!(
        basic.signature_algorithm.algorithm.to_id_string(),
        "1.2.840.113549.1.1.11"
    );
    assert_eq!(basic.signature.unused_bits, 0);
    assert_eq!(basic.signature.bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    assert!(basic.certs.is_empty());
}

#[test]
fn test_golden_basic_response_direct() {
    let inner = hex::decode(basic_hex()).unwrap();
    let direct = decode_basic_response(&inner).unwrap();
    assert_eq!(direct, decode_response_as_basic(&response_fixture()).unwrap());
}

#[test]
fn test_golden_response_reencodes_identically() {
    let bytes = response_fixture();
    let basic = decode_response_as_basic(&bytes).unwrap();
    assert_eq!(encode_response_from_basic(&basic).unwrap(), bytes);
}
