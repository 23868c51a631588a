//! Pure attendance and salary computations. No I/O happens here; callers
//! fetch the records and pass them in.

pub mod attendance;
pub mod salary;
