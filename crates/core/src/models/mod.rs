//! Marketplace entities as the client consumes them.
//!
//! Every entity comes in two shapes: the persisted record (with the
//! backend-assigned `_id`) and an editable draft that is validated before it
//! is sent. Patches apply partial edits to a draft. All wire names are
//! camelCase; the canonical product schema uses `title`, not `name`.

pub mod address;
pub mod donation;
pub mod order;
pub mod portfolio;
pub mod product;
pub mod profile;

pub use address::{Address, AddressDraft, AddressPatch, MAX_ADDRESSES_PER_USER};
pub use donation::DonationRequest;
pub use order::{CartItem, Order};
pub use portfolio::{PortfolioCategory, PortfolioDraft, PortfolioItem, PortfolioPatch};
pub use product::{Product, ProductDraft, ProductPatch};
pub use profile::{NotificationSettings, PasswordChange, ProfileForm, UserProfile, UserRole};
