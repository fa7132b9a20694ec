//! Page behavior for the validation site: FAQ toggles and the email form,
//! running against an in-memory document.

pub mod dom;
pub mod event;
pub mod faq;
pub mod fetch;
pub mod markup;
pub mod page;
mod selector;
pub mod validate_form;

pub use dom::{ClassList, Document, Element, NodeId};
pub use event::{Dispatch, Event, EventType, HandlerTask};
pub use fetch::{encode_uri_component, Fetch, FetchError, FetchResponse, HttpFetch};
pub use markup::MarkupError;
pub use page::{init, PageBindings};
