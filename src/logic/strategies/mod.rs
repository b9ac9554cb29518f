pub mod inventory_times_margin;
pub mod unit_margin;

pub use inventory_times_margin::InventoryTimesMargin;
pub use unit_margin::UnitMargin;
