//! Pages of list results.

use serde_json::{Map, Value};

use crate::codec::{list_to_repr, Fields, Repr};
use crate::error::DecodeError;
use crate::model::profile::UserProfile;
use crate::model::task::Task;
use crate::model::transaction::TaskTransaction;

/// An entity that is listed in pages, and the key its items travel under.
pub trait PageItem: Repr {
    const ITEMS_KEY: &'static str;
}

impl PageItem for Task {
    const ITEMS_KEY: &'static str = "tasks";
}

impl PageItem for TaskTransaction {
    const ITEMS_KEY: &'static str = "transactions";
}

impl PageItem for UserProfile {
    const ITEMS_KEY: &'static str = "profiles";
}

impl PageItem for String {
    const ITEMS_KEY: &'static str = "userIds";
}

impl Repr for String {
    fn to_repr(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        raw.as_str().map(str::to_string).ok_or(DecodeError::InvalidType {
            entity: "identifier",
            field: "<root>",
            expected: "a string",
        })
    }
}

/// A bounded slice of a larger result set.
///
/// `offset` is the index of the first item returned and `total` the size of
/// the whole result set on the server. The final page may hold fewer items
/// than were asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub offset: u64,
    pub total: u64,
    pub items: Vec<T>,
}

pub type TaskPage = Page<Task>;
pub type TaskTransactionPage = Page<TaskTransaction>;
pub type ProfilePage = Page<UserProfile>;
pub type IdentifiersPage = Page<String>;

impl<T> Page<T> {
    pub fn new(offset: u64, total: u64, items: Vec<T>) -> Self {
        Self { offset, total, items }
    }

    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the items of this page reach the end of the result set.
    pub fn is_last(&self) -> bool {
        self.offset + self.items.len() as u64 >= self.total
    }
}

impl<T: PageItem> Repr for Page<T> {
    fn to_repr(&self) -> Value {
        let mut repr = Map::new();
        repr.insert("offset".to_string(), Value::from(self.offset));
        repr.insert("total".to_string(), Value::from(self.total));
        repr.insert(T::ITEMS_KEY.to_string(), list_to_repr(&self.items));
        Value::Object(repr)
    }

    fn from_repr(raw: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("page", raw)?;
        Ok(Self {
            offset: fields.u64("offset")?,
            total: fields.u64("total")?,
            items: fields.list(T::ITEMS_KEY)?,
        })
    }
}
