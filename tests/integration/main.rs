//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no real
//! hardware required.

mod mock_hw;
mod read_loop_tests;
mod service_tests;

// Link the host embassy-time driver required by `async_io_mini::Timer`.
use embassy_time as _;
