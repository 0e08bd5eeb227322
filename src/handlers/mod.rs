// Three route tiers:
// public (no auth) → protected (bearer JWT) → elevated (JWT with the Admin role)
pub mod elevated;
pub mod protected;
pub mod public;
