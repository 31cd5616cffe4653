mod balances;
mod connections;
mod transfer;

pub use balances::*;
pub use connections::*;
pub use transfer::*;
