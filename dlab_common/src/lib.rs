mod rupees;

pub mod op;
mod secret;

pub use rupees::{RupeeConversionError, Rupees, INR_CURRENCY_CODE, INR_CURRENCY_CODE_LOWER};
pub use secret::Secret;
