//! ReportAccessGate: the one place the free/Pro report boundary is decided.

pub mod gate;

pub use gate::ReportAccessGate;
