//! Expense tracking domain.
//!
//! [`Engine`] turns validated requests into user-facing replies: profiles,
//! categories, expenses and the spending reports rendered by [`analytics`].
//! Persistence goes through the [`Storage`] trait; [`SqliteStorage`] is the
//! sea-orm backend shipped with the crate.

pub use categories::{Category, DEFAULT_CATEGORIES, NewCategory, OTHER_CATEGORY};
pub use clock::{Clock, FixedClock, SystemClock};
pub use currency::Currency;
pub use error::{EngineError, INTERNAL_ERROR_MESSAGE, StorageError};
pub use expenses::Expense;
pub use money::Money;
pub use ops::{DEFAULT_TIMEZONE, Engine, EngineBuilder, MAX_EXPENSE};
pub use storage::{ResultStorage, SqliteStorage, Storage};
pub use users::Profile;
pub use window::{ExpenseRange, Window};

pub mod analytics;
mod categories;
mod clock;
mod currency;
mod error;
mod expenses;
mod money;
mod ops;
mod storage;
mod users;
mod window;

pub type ResultEngine<T> = Result<T, EngineError>;
