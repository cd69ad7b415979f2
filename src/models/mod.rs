mod account;
mod amount;
mod balance;
mod commodity;
mod posting;

pub use account::{Account, AccountId, AccountTree, ACCOUNT_SEPARATOR};
pub use amount::Amount;
pub use balance::Balance;
pub use commodity::{Commodity, CommodityRef, SymbolPlacement};
pub use posting::Posting;
