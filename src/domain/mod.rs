// Domain layer: records, the type-code table and ports (interfaces).

pub mod model;
pub mod ports;
pub mod type_table;
