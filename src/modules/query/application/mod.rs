pub mod facade;

pub use facade::QueryFacade;
