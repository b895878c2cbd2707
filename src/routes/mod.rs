/// Router Module Index
///
/// Splits the routing surface by authentication requirement. The public
/// module carries the identity gateway (register/login) and the health
/// probe; everything else sits behind the bearer-token middleware.
///
/// Role and ownership checks are *not* expressed at the router level:
/// every handler runs its operation through the single authorization table
/// in `policy`, so the access-control matrix lives in exactly one place.

/// Routes accessible without a token.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
pub mod authenticated;
