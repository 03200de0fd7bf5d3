//! Certificate identifier used in requests and responses
//!
//! ```asn1
//! CertID ::= SEQUENCE {
//!     hashAlgorithm       AlgorithmIdentifier,
//!     issuerNameHash      OCTET STRING,
//!     issuerKeyHash       OCTET STRING,
//!     serialNumber        INTEGER
//! }
//! ```

use crate::der::{der_integer, der_octet_string, der_sequence, DerReader};
use crate::error::{DecodeError, EncodeError};
use crate::types::{AlgorithmIdentifier, OID_SHA256, OID_SHA384, OID_SHA512};
use num_bigint::BigInt;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Digest used to build a [`CertId`] from issuer data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn identifier(self) -> AlgorithmIdentifier {
        let oid = match self {
            HashAlgorithm::Sha256 => OID_SHA256,
            HashAlgorithm::Sha384 => OID_SHA384,
            HashAlgorithm::Sha512 => OID_SHA512,
        };
        AlgorithmIdentifier::with_null_parameters(oid)
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// Identifies the certificate whose status is requested or reported
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertId {
    pub hash_algorithm: AlgorithmIdentifier,
    pub issuer_name_hash: Vec<u8>,
    pub issuer_key_hash: Vec<u8>,
    pub serial_number: BigInt,
}

impl CertId {
    pub fn new(
        hash_algorithm: AlgorithmIdentifier,
        issuer_name_hash: Vec<u8>,
        issuer_key_hash: Vec<u8>,
        serial_number: BigInt,
    ) -> Self {
        CertId {
            hash_algorithm,
            issuer_name_hash,
            issuer_key_hash,
            serial_number,
        }
    }

    /// Build a CertID by hashing the issuer data
    ///
    /// # Arguments
    /// * `issuer_name_der` - DER encoding of the issuer's subject Name
    /// * `issuer_public_key` - Issuer subjectPublicKey BIT STRING value,
    ///   without tag, length and unused-bits octet
    /// * `serial_number` - Serial number of the certificate being checked
    pub fn from_issuer(
        algorithm: HashAlgorithm,
        issuer_name_der: &[u8],
        issuer_public_key: &[u8],
        serial_number: BigInt,
    ) -> Self {
        CertId {
            hash_algorithm: algorithm.identifier(),
            issuer_name_hash: algorithm.digest(issuer_name_der),
            issuer_key_hash: algorithm.digest(issuer_public_key),
            serial_number,
        }
    }

    pub(crate) fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut content = self.hash_algorithm.encode()?;
        content.extend_from_slice(&der_octet_string(&self.issuer_name_hash));
        content.extend_from_slice(&der_octet_string(&self.issuer_key_hash));
        content.extend_from_slice(&der_integer(&self.serial_number));
        Ok(der_sequence(&content))
    }

    pub(crate) fn decode(reader: &mut DerReader<'_>) -> Result<Self, DecodeError> {
        let mut seq = reader.read_sequence("CertID")?;
        let hash_algorithm = AlgorithmIdentifier::decode(&mut seq)?;
        let issuer_name_hash = seq.read_octet_string("CertID.issuerNameHash")?.to_vec();
        let issuer_key_hash = seq.read_octet_string("CertID.issuerKeyHash")?.to_vec();
        let serial_number = seq.read_integer("CertID.serialNumber")?;
        seq.finish("CertID")?;
        Ok(CertId {
            hash_algorithm,
            issuer_name_hash,
            issuer_key_hash,
            serial_number,
        })
    }
}
