//! Shared test harness modules for the routepack CLI.

use super::*;

mod export_unit;
mod helpers;
