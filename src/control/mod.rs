//! Control core: orientation tracking, calibration and drive decisions.
//!
//! Pure logic, no I/O: everything here is driven by
//! [`RoverService`](crate::app::service::RoverService) one sample at a time.

pub mod drive;
pub mod navigation;
pub mod orientation;
