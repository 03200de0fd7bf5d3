//! Certificate status normalization and response accessors
//!
//! A [`SingleResponse`] keeps the three `CertStatus` alternatives as separate
//! slots so that decoded data is reported exactly as received. Before a basic
//! response is encoded, every entry is normalized so that exactly one slot is
//! set:
//!
//! 1. good and unknown both set: good (unknown and revoked dropped)
//! 2. revoked and unknown both set: revoked
//! 3. neither good nor revoked set: unknown
//! 4. anything else is left unchanged
//!
//! Normalization is idempotent and never fails.

use crate::error::AccessError;
use crate::response::{BasicResponse, RevokedInfo, SingleResponse};
use crate::types::{find_nonce, upsert_nonce};

/// Typed view of a certificate status
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertStatus {
    /// Certificate is not revoked
    Good,
    /// Certificate has been revoked
    Revoked(RevokedInfo),
    /// Certificate status is unknown
    Unknown,
}

impl SingleResponse {
    /// The status when exactly one alternative is set, `None` otherwise
    pub fn status(&self) -> Option<CertStatus> {
        match (self.good, &self.revoked, self.unknown) {
            (true, None, false) => Some(CertStatus::Good),
            (false, Some(info), false) => Some(CertStatus::Revoked(info.clone())),
            (false, None, true) => Some(CertStatus::Unknown),
            _ => None,
        }
    }

    /// Replace the status with a single alternative
    pub fn set_status(&mut self, status: CertStatus) {
        self.clear_status();
        match status {
            CertStatus::Good => self.good = true,
            CertStatus::Revoked(info) => self.revoked = Some(info),
            CertStatus::Unknown => self.unknown = true,
        }
    }

    /// Reset every status alternative to unset
    pub fn clear_status(&mut self) {
        self.good = false;
        self.revoked = None;
        self.unknown = false;
    }

    /// Resolve over- or under-specified status slots in place
    pub fn normalize(&mut self) {
        if self.good && self.unknown {
            // good wins over unknown
            self.revoked = None;
            self.unknown = false;
        } else if self.revoked.is_some() && self.unknown {
            self.good = false;
            self.unknown = false;
        } else if !self.good && self.revoked.is_none() {
            self.unknown = true;
        }
    }

    /// Normalized copy of this response
    pub fn normalized(&self) -> Self {
        let mut single = self.clone();
        single.normalize();
        single
    }

    pub fn nonce(&self) -> Option<&[u8]> {
        find_nonce(&self.single_extensions)
    }

    pub fn set_nonce(&mut self, nonce: &[u8]) {
        upsert_nonce(&mut self.single_extensions, nonce);
    }
}

impl BasicResponse {
    fn single(&self, index: usize) -> Result<&SingleResponse, AccessError> {
        let responses = &self.tbs_response_data.responses;
        responses.get(index).ok_or(AccessError::IndexOutOfRange {
            index,
            len: responses.len(),
        })
    }

    fn single_mut(&mut self, index: usize) -> Result<&mut SingleResponse, AccessError> {
        let responses = &mut self.tbs_response_data.responses;
        let len = responses.len();
        responses
            .get_mut(index)
            .ok_or(AccessError::IndexOutOfRange { index, len })
    }

    /// Set the nonce in the single extensions of `responses[index]`,
    /// replacing an existing nonce extension or appending a non-critical one
    pub fn set_nonce(&mut self, index: usize, nonce: &[u8]) -> Result<(), AccessError> {
        self.single_mut(index)?.set_nonce(nonce);
        Ok(())
    }

    /// Nonce in the single extensions of `responses[index]`, if any
    pub fn get_nonce(&self, index: usize) -> Result<Option<&[u8]>, AccessError> {
        Ok(self.single(index)?.nonce())
    }

    /// Reset the status of `responses[index]` to fully unset
    pub fn clear_status(&mut self, index: usize) -> Result<(), AccessError> {
        self.single_mut(index)?.clear_status();
        Ok(())
    }

    /// Nonce in the top-level response extensions, if any
    pub fn nonce(&self) -> Option<&[u8]> {
        find_nonce(&self.tbs_response_data.response_extensions)
    }

    /// Set the nonce in the top-level response extensions
    pub fn set_response_nonce(&mut self, nonce: &[u8]) {
        upsert_nonce(&mut self.tbs_response_data.response_extensions, nonce);
    }

    /// Normalize the status of every single response in place
    pub fn normalize(&mut self) {
        for single in &mut self.tbs_response_data.responses {
            single.normalize();
        }
    }

    /// Normalized copy of this response
    pub fn normalized(&self) -> Self {
        let mut basic = self.clone();
        basic.normalize();
        basic
    }

    /// Index of the first single response whose status is not exactly one
    /// alternative
    pub(crate) fn first_invalid_status(&self) -> Option<usize> {
        self.tbs_response_data
            .responses
            .iter()
            .position(|single| single.status().is_none())
    }
}
