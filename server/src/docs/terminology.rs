//! # Project Terminology
//!
//! Terms used throughout the helper and the page server.
//!
//! ## Protocol Terms
//!
//! * **Authorization code**: Short-lived, single-use value the identity provider
//!   appends to the redirect URI as `?code=…`. The page exchanges it for tokens
//!   over the back channel.
//!
//! * **Redirect URI**: The current page URL with its query string removed. The
//!   same value is sent in the authorization request and in the token request.
//!
//! * **State**: Random opaque value generated once per page load, stored in the
//!   session under `state` before redirecting, and echoed back by the provider.
//!   The page compares it on return and logs a mismatch; it does not reject the
//!   callback.
//!
//! * **acr_values**: Authentication Context Class Reference. Selects the
//!   identity method at the provider, written as
//!   `urn:signicat:oidc:method:<method>`, e.g. `urn:signicat:oidc:method:nbid`.
//!
//! * **Claims request**: Optional `claims` parameter, a JSON object of the form
//!   `{"userinfo": {"<claim>": {"value": "<v>"}}}`. Used to pass hints such as
//!   `t` and `mt` through to the userinfo response. Requests carrying claims are
//!   sent as an auto-submitted POST form.
//!
//! ## Helper Terms
//!
//! * **Page load**: One [`OidcHelper`](crate::oauth::OidcHelper). Owns the page
//!   URL, the generated state, the session store and the notifier.
//!
//! * **Session store**: Storage that survives the trip to the provider. Private
//!   session cookies in the page server, memory in the CLI and tests.
//!
//! * **Alert**: The only way a failed token or userinfo request is reported.
//!   Text has the form `Whoops! <status text>: <detail>`. The success callback
//!   is not called and no error reaches the calling code.
//!
//! ## Credentials
//!
//! * **Demo client**: The client id and secret compiled in as defaults. They are
//!   compiled into the binary and used for every visitor, so they are public.
//!   Replace them through `OIDC_CLIENT_ID` / `OIDC_CLIENT_SECRET`.
