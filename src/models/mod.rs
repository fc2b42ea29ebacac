//! Data models for MathRent

pub mod attendance;
pub mod enums;
pub mod item;
pub mod loan;
pub mod room;
pub mod user;

// Re-export commonly used types
pub use attendance::AttendanceSlot;
pub use enums::{LoanStatus, ResourceKind, ResourceStatus, Role};
pub use item::Item;
pub use loan::{DetailPayload, LoanDetail, LoanRequest, LoanRequestDetails};
pub use room::Room;
pub use user::{User, UserShort};
