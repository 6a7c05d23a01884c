/// Query module
///
/// Read side of the cross-reference store, consumed by exporters.
pub mod application;

pub use application::QueryFacade;
