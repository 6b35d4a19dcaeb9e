//! The subset of the WMO GRIB2 code tables needed to interpret the grid and
//! data representation templates handled by this crate.
//!
//! Code values are converted with [`num_enum`]; a value that the crate has no
//! name for is kept as a number through [`Code`].
//!
//! ```
//! use gribpoint::codetables::{Code, Table5_0};
//!
//! assert_eq!(Code::from(Table5_0::try_from(0u16)), Code::Name(Table5_0::SimplePacking));
//! assert_eq!(Code::<Table5_0, u16>::from(Table5_0::try_from(61u16)), Code::Num(61));
//! ```

mod core;
mod grib2;

pub use self::{core::*, grib2::*};
