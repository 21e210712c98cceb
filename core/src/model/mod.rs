//! Domain entities and their wire representations.

pub mod app;
pub mod message;
pub mod norm;
pub mod page;
pub mod profile;
pub mod task;
pub mod transaction;

pub use app::{App, TokenDetails};
pub use message::{ActionContent, AttachmentContent, Content, LocationContent, Message, MessageType, TextualContent};
pub use norm::{Norm, NormOperator};
pub use page::{IdentifiersPage, Page, PageItem, ProfilePage, TaskPage, TaskTransactionPage};
pub use profile::{CoreUserProfile, Date, Gender, Scope, UserName, UserProfile};
pub use task::{Task, TaskGoal};
pub use transaction::TaskTransaction;
