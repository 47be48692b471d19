//! Streaming parse of annotation documents
//!
//! [`EventReader`] turns bytes into markup events and
//! [`AnnotationStateMachine`] turns those events into sealed annotations.

pub mod machine;
pub mod reader;
pub mod tags;

pub use machine::AnnotationStateMachine;
pub use reader::{EventReader, XmlEvent};
pub use tags::{Scope, Tag, TextTarget};
