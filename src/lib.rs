//! Телеметрия возбудителя EC710 по SNMP: каталог измерений и аварий,
//! форматирование значений и цикл опроса, собирающий snapshot.

pub mod catalog;
pub mod collector;
pub mod config;
pub mod formatter;
pub mod handlers;
pub mod routes;
pub mod snmp;
pub mod system;

pub use catalog::{Catalog, CatalogError};
pub use collector::{Collector, ProtocolClient, Snapshot};
