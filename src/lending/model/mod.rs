pub mod amount;
pub mod position;
pub mod price;
pub mod token;

pub use amount::{Amount, Denomination, Native, Target, Wrapped};
pub use position::AccountPosition;
pub use price::PriceQuote;
pub use token::TokenRef;
