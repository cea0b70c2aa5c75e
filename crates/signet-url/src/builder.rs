//! URL generation: plain route URLs and signed URLs

use signet_crypto::{Encryption, Purpose};

use crate::duration::ExpiresIn;
use crate::error::UrlError;
use crate::query::{canonical_payload, QueryString};
use crate::route::{RouteParams, RouteResolver};
use crate::{EXPIRES_AT_PARAM, SIGNATURE_PARAM};

/// Options for [`make_url`].
#[derive(Debug, Clone, Default)]
pub struct UrlOptions {
    pub params: RouteParams,
    pub qs: QueryString,
    /// Overrides the route's own domain
    pub domain: Option<String>,
    /// Absolute origin to prepend, e.g. `https://example.com`
    pub prefix_url: Option<String>,
}

/// Options for [`UrlBuilder::make_signed_url`].
#[derive(Debug, Clone, Default)]
pub struct SignedUrlOptions {
    pub params: RouteParams,
    pub qs: QueryString,
    pub expires_in: Option<ExpiresIn>,
    /// Overrides the route's own domain
    pub domain: Option<String>,
    /// Absolute origin to prepend, e.g. `https://example.com`
    pub prefix_url: Option<String>,
    /// Defaults to [`Purpose::RouteSignature`]
    pub purpose: Option<Purpose>,
}

/// Build an unsigned URL for a route. No cryptography involved.
pub fn make_url<R>(resolver: &R, identifier: &str, options: UrlOptions) -> Result<String, UrlError>
where
    R: RouteResolver + ?Sized,
{
    let route = resolver.resolve(identifier, &options.params)?;
    let domain = options.domain.or(route.domain);
    Ok(assemble(
        &route.path,
        &options.qs,
        domain.as_deref(),
        options.prefix_url.as_deref(),
    ))
}

/// Generates URLs against a route resolver, signing them with an
/// [`Encryption`] instance.
pub struct UrlBuilder<'a, R: RouteResolver + ?Sized> {
    resolver: &'a R,
    encryption: &'a Encryption,
    default_expires_in: Option<ExpiresIn>,
}

impl<'a, R: RouteResolver + ?Sized> UrlBuilder<'a, R> {
    pub fn new(resolver: &'a R, encryption: &'a Encryption) -> Self {
        Self {
            resolver,
            encryption,
            default_expires_in: None,
        }
    }

    /// Expiry applied when a signed URL is requested without one.
    pub fn with_default_expiry(mut self, expires_in: ExpiresIn) -> Self {
        self.default_expires_in = Some(expires_in);
        self
    }

    pub fn make_url(&self, identifier: &str, options: UrlOptions) -> Result<String, UrlError> {
        make_url(self.resolver, identifier, options)
    }

    /// Build a URL whose path and query are covered by a `signature`
    /// query parameter.
    ///
    /// With an expiry, `expires_at` is added to the query before signing so
    /// it is covered too. A `signature` pair in the caller's query is
    /// discarded.
    pub fn make_signed_url(
        &self,
        identifier: &str,
        options: SignedUrlOptions,
    ) -> Result<String, UrlError> {
        let route = self.resolver.resolve(identifier, &options.params)?;

        let mut qs = options.qs;
        qs.remove_all(SIGNATURE_PARAM);

        let expires_in = options.expires_in.or_else(|| self.default_expires_in.clone());
        let expires_at = match expires_in {
            Some(expires_in) => {
                let at = expires_in.resolve(self.encryption.now_ms())?;
                qs.remove_all(EXPIRES_AT_PARAM);
                qs.push(EXPIRES_AT_PARAM, at.to_string());
                Some(at)
            }
            None => None,
        };

        let payload = canonical_payload(&route.path, &qs);
        let purpose = options.purpose.unwrap_or(Purpose::RouteSignature);
        let signature = self.encryption.encrypt(&payload, &purpose)?;
        qs.push(SIGNATURE_PARAM, signature);

        tracing::debug!(identifier, path = %route.path, ?expires_at, "signed url created");

        let domain = options.domain.or(route.domain);
        Ok(assemble(
            &route.path,
            &qs,
            domain.as_deref(),
            options.prefix_url.as_deref(),
        ))
    }
}

/// `prefix_url` wins over `domain`; a domain alone gives a protocol-relative URL.
fn assemble(
    path: &str,
    qs: &QueryString,
    domain: Option<&str>,
    prefix_url: Option<&str>,
) -> String {
    let mut url = match (prefix_url, domain) {
        (Some(prefix), _) => format!("{}{path}", prefix.trim_end_matches('/')),
        (None, Some(domain)) => format!("//{}{path}", domain.trim_end_matches('/')),
        (None, None) => path.to_string(),
    };
    if !qs.is_empty() {
        url.push('?');
        url.push_str(&qs.to_query());
    }
    url
}
