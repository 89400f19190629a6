//! EntitlementResolver: what an account may do right now.

pub mod resolver;

pub use resolver::EntitlementResolver;
