//! Signature verification for incoming requests
//!
//! Everything here is attacker-controlled input, so every failure is a
//! plain `false`. The reason is only logged at debug level.

use signet_crypto::{Encryption, Purpose};

use crate::query::canonical_payload;
use crate::request::RequestView;
use crate::{EXPIRES_AT_PARAM, SIGNATURE_PARAM};

/// Checks `signature` query parameters produced by
/// [`UrlBuilder::make_signed_url`](crate::UrlBuilder::make_signed_url).
#[derive(Debug, Clone)]
pub struct SignatureVerifier<'a> {
    encryption: &'a Encryption,
    purpose: Purpose,
}

impl<'a> SignatureVerifier<'a> {
    pub fn new(encryption: &'a Encryption) -> Self {
        Self {
            encryption,
            purpose: Purpose::RouteSignature,
        }
    }

    /// Verify signatures made for a purpose other than route signatures.
    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// True when the request carries exactly one `signature` that covers its
    /// path and remaining query pairs, and any `expires_at` is not in the past.
    pub fn has_valid_signature<R: RequestView + ?Sized>(&self, request: &R) -> bool {
        let mut qs = request.query();

        let signature = match qs.remove_all(SIGNATURE_PARAM).as_slice() {
            [one] => one.clone(),
            [] => {
                tracing::debug!(path = request.path(), "no signature in request");
                return false;
            }
            many => {
                tracing::debug!(count = many.len(), "multiple signatures in request");
                return false;
            }
        };

        let payload = canonical_payload(request.path(), &qs);
        if !self.encryption.verify(&signature, &payload, &self.purpose) {
            tracing::debug!(path = request.path(), "signature does not match request");
            return false;
        }

        let now = self.encryption.now_ms();
        for raw in qs.get_all(EXPIRES_AT_PARAM) {
            match raw.parse::<u64>() {
                Ok(expires_at) if now <= expires_at => {}
                Ok(expires_at) => {
                    tracing::debug!(expires_at, now, "signed url expired");
                    return false;
                }
                Err(_) => {
                    tracing::debug!(raw, "unparseable expires_at");
                    return false;
                }
            }
        }

        true
    }
}

/// Adds `has_valid_signature` to every [`RequestView`].
pub trait RequestSignatureExt: RequestView {
    fn has_valid_signature(&self, verifier: &SignatureVerifier<'_>) -> bool {
        verifier.has_valid_signature(self)
    }
}

impl<T: RequestView + ?Sized> RequestSignatureExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryString;
    use crate::request::ParsedRequest;
    use secrecy::SecretString;
    use signet_crypto::EncryptionOptions;

    fn encryption() -> Encryption {
        Encryption::new(EncryptionOptions {
            key: Some(SecretString::from("averylongrandom32characterssecret")),
            ..Default::default()
        })
        .unwrap()
    }

    fn signed(enc: &Encryption, path: &str, qs: QueryString) -> ParsedRequest {
        let payload = canonical_payload(path, &qs);
        let signature = enc.encrypt(&payload, &Purpose::RouteSignature).unwrap();
        let mut full = qs;
        full.push(SIGNATURE_PARAM, signature);
        ParsedRequest::new(path, full)
    }

    #[test]
    fn test_valid_signature() {
        let enc = encryption();
        let req = signed(&enc, "/posts/1", QueryString::new().with("name", "virk"));

        assert!(SignatureVerifier::new(&enc).has_valid_signature(&req));
        assert!(req.has_valid_signature(&SignatureVerifier::new(&enc)));
    }

    #[test]
    fn test_missing_signature() {
        let enc = encryption();
        let req = ParsedRequest::from_url("/posts/1?name=virk");

        assert!(!SignatureVerifier::new(&enc).has_valid_signature(&req));
    }

    #[test]
    fn test_garbage_signature() {
        let enc = encryption();
        let req = ParsedRequest::from_url("/posts/1?signature=garbage");

        assert!(!SignatureVerifier::new(&enc).has_valid_signature(&req));
    }

    #[test]
    fn test_duplicate_signature_rejected() {
        let enc = encryption();
        let req = signed(&enc, "/posts/1", QueryString::new());
        let mut qs = req.query();
        let signature = qs.get(SIGNATURE_PARAM).unwrap().to_string();
        qs.push(SIGNATURE_PARAM, signature);

        let doubled = ParsedRequest::new("/posts/1", qs);
        assert!(!SignatureVerifier::new(&enc).has_valid_signature(&doubled));
    }

    #[test]
    fn test_other_path_rejected() {
        let enc = encryption();
        let req = signed(&enc, "/posts/1", QueryString::new());
        let moved = ParsedRequest::new("/posts/2", req.query());

        assert!(!SignatureVerifier::new(&enc).has_valid_signature(&moved));
    }

    #[test]
    fn test_wrong_purpose_rejected() {
        let enc = encryption();
        let req = signed(&enc, "/posts/1", QueryString::new());

        let verifier = SignatureVerifier::new(&enc).with_purpose(Purpose::Cookie);
        assert!(!verifier.has_valid_signature(&req));
    }

    #[test]
    fn test_unparseable_expiry_rejected() {
        let enc = encryption();
        let req = signed(&enc, "/posts/1", QueryString::new().with(EXPIRES_AT_PARAM, "soon"));

        assert!(!SignatureVerifier::new(&enc).has_valid_signature(&req));
    }

    #[test]
    fn test_trait_object_request() {
        let enc = encryption();
        let req = signed(&enc, "/posts/1", QueryString::new());
        let dynamic: &dyn RequestView = &req;

        assert!(SignatureVerifier::new(&enc).has_valid_signature(dynamic));
    }
}
