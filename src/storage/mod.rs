mod results;
mod uploads;

pub use results::*;
pub use uploads::*;
