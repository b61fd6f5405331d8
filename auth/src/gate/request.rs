//! Running the gate over `http` requests.

use std::net::SocketAddr;

use http::header::AUTHORIZATION;
use http::HeaderMap;
use http::Request;

use super::bearer_token;
use super::BearerTokenGate;
use super::GateError;
use super::RequestDetails;
use super::SecurityContext;
use super::TokenVerifier;
use super::UserDetailsService;

/// The `Authorization` header value, if present and visible ASCII.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// The bearer token carried by `headers`, if any.
pub fn bearer_token_from(headers: &HeaderMap) -> Option<&str> {
    authorization_header(headers).and_then(bearer_token)
}

impl<V, U> BearerTokenGate<V, U>
where
    V: TokenVerifier + ?Sized,
    U: UserDetailsService + ?Sized,
{
    /// Run the gate over a request, replacing the [`SecurityContext`] in its
    /// extensions with the one the gate hands back.
    ///
    /// A request without a context starts from an empty one.
    pub async fn authenticate_request<B>(
        &self,
        request: &mut Request<B>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<(), GateError> {
        let authorization = authorization_header(request.headers()).map(str::to_string);

        let context = request
            .extensions_mut()
            .remove::<SecurityContext>()
            .unwrap_or_default();

        let context = self
            .authenticate(
                authorization.as_deref(),
                context,
                RequestDetails::new(remote_addr),
            )
            .await?;

        request.extensions_mut().insert(context);
        Ok(())
    }
}
