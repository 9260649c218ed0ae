pub mod model;
pub mod ops;

pub use model::Account;
pub use model::Principal;
pub use model::Role;
pub use ops::AccountOpError;
pub use ops::credit;
pub use ops::debit;
pub use ops::set_active;
