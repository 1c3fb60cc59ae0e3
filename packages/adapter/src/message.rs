//! Inbound messages and the typed requests and responses they become.

use std::collections::BTreeMap;
use std::fmt;

use schemashim_mapping::Error;
use schemashim_records::{
    ColumnSet, QueryExpression, Record, RecordCollection, RecordId, RecordReference,
};
use serde::{Deserialize, Serialize};

/// The message kinds the adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Retrieve,
    RetrieveMultiple,
    Create,
    Update,
    Delete,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Retrieve,
        MessageKind::RetrieveMultiple,
        MessageKind::Create,
        MessageKind::Update,
        MessageKind::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Retrieve => "Retrieve",
            MessageKind::RetrieveMultiple => "RetrieveMultiple",
            MessageKind::Create => "Create",
            MessageKind::Update => "Update",
            MessageKind::Delete => "Delete",
        }
    }

    /// Look a message kind up by its pipeline name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimistic concurrency for writes. Passed to the backing store as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencyBehavior {
    #[default]
    Default,
    IfRowVersionMatches,
    AlwaysOverwrite,
}

/// One input parameter of an inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Reference(RecordReference),
    Record(Record),
    ColumnSet(ColumnSet),
    Query(QueryExpression),
    RelatedQueries(Vec<QueryExpression>),
    ConcurrencyBehavior(ConcurrencyBehavior),
}

impl Parameter {
    fn type_name(&self) -> &'static str {
        match self {
            Parameter::Reference(_) => "reference",
            Parameter::Record(_) => "record",
            Parameter::ColumnSet(_) => "column_set",
            Parameter::Query(_) => "query",
            Parameter::RelatedQueries(_) => "related_queries",
            Parameter::ConcurrencyBehavior(_) => "concurrency_behavior",
        }
    }
}

pub const TARGET: &str = "Target";
pub const COLUMN_SET: &str = "ColumnSet";
pub const RELATED_ENTITIES_QUERY: &str = "RelatedEntitiesQuery";
pub const QUERY: &str = "Query";
pub const CONCURRENCY_BEHAVIOR: &str = "ConcurrencyBehavior";

/// A message as the hosting pipeline delivers it: a name and a bag of
/// named input parameters.
///
/// # Example
///
/// ```rust
/// use schemashim_adapter::{Message, Parameter, Request};
/// use schemashim_records::{ColumnSet, RecordReference};
///
/// let message = Message::new("Retrieve")
///     .with_parameter("Target", Parameter::Reference(RecordReference::new("Customer", "123")))
///     .with_parameter("ColumnSet", Parameter::ColumnSet(ColumnSet::new(["CustomerName"])));
///
/// let request = Request::try_from(message)?;
/// assert_eq!(request.kind().as_str(), "Retrieve");
/// # Ok::<(), schemashim_mapping::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
}

impl Message {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }
}

/// A typed request, in whichever vocabulary it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message")]
pub enum Request {
    Retrieve {
        target: RecordReference,
        columns: ColumnSet,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        related_queries: Vec<QueryExpression>,
    },
    RetrieveMultiple {
        query: QueryExpression,
    },
    Create {
        target: Record,
    },
    Update {
        target: Record,
        #[serde(default)]
        concurrency: ConcurrencyBehavior,
    },
    Delete {
        target: RecordReference,
        #[serde(default)]
        concurrency: ConcurrencyBehavior,
    },
}

impl Request {
    pub fn kind(&self) -> MessageKind {
        match self {
            Request::Retrieve { .. } => MessageKind::Retrieve,
            Request::RetrieveMultiple { .. } => MessageKind::RetrieveMultiple,
            Request::Create { .. } => MessageKind::Create,
            Request::Update { .. } => MessageKind::Update,
            Request::Delete { .. } => MessageKind::Delete,
        }
    }

    /// The record type this request addresses.
    pub fn type_name(&self) -> &str {
        match self {
            Request::Retrieve { target, .. } | Request::Delete { target, .. } => &target.type_name,
            Request::Create { target } | Request::Update { target, .. } => &target.type_name,
            Request::RetrieveMultiple { query } => &query.entity_name,
        }
    }
}

impl TryFrom<Message> for Request {
    type Error = Error;

    fn try_from(message: Message) -> Result<Self, Error> {
        let kind = MessageKind::from_name(&message.name)
            .ok_or_else(|| Error::unsupported(format!("Message '{}'", message.name)))?;
        let mut params = Parameters {
            message: kind,
            inner: message.parameters,
        };

        let request = match kind {
            MessageKind::Retrieve => Request::Retrieve {
                target: params.reference(TARGET)?,
                columns: params.column_set(COLUMN_SET)?,
                related_queries: params.related_queries(RELATED_ENTITIES_QUERY)?,
            },
            MessageKind::RetrieveMultiple => Request::RetrieveMultiple {
                query: params.query(QUERY)?,
            },
            MessageKind::Create => Request::Create {
                target: params.record(TARGET)?,
            },
            MessageKind::Update => Request::Update {
                target: params.record(TARGET)?,
                concurrency: params.concurrency(CONCURRENCY_BEHAVIOR)?,
            },
            MessageKind::Delete => Request::Delete {
                target: params.reference(TARGET)?,
                concurrency: params.concurrency(CONCURRENCY_BEHAVIOR)?,
            },
        };
        Ok(request)
    }
}

/// Typed extraction of message parameters.
struct Parameters {
    message: MessageKind,
    inner: BTreeMap<String, Parameter>,
}

impl Parameters {
    fn required(&mut self, name: &str) -> Result<Parameter, Error> {
        self.inner.remove(name).ok_or_else(|| {
            Error::invalid_request(format!(
                "{} requires parameter '{}'",
                self.message, name
            ))
        })
    }

    fn mistyped(&self, name: &str, expected: &str, found: &Parameter) -> Error {
        Error::invalid_request(format!(
            "{} parameter '{}' must be a {}, found a {}",
            self.message,
            name,
            expected,
            found.type_name()
        ))
    }

    fn reference(&mut self, name: &str) -> Result<RecordReference, Error> {
        match self.required(name)? {
            Parameter::Reference(reference) => Ok(reference),
            other => Err(self.mistyped(name, "reference", &other)),
        }
    }

    fn record(&mut self, name: &str) -> Result<Record, Error> {
        match self.required(name)? {
            Parameter::Record(record) => Ok(record),
            other => Err(self.mistyped(name, "record", &other)),
        }
    }

    fn column_set(&mut self, name: &str) -> Result<ColumnSet, Error> {
        match self.required(name)? {
            Parameter::ColumnSet(columns) => Ok(columns),
            other => Err(self.mistyped(name, "column_set", &other)),
        }
    }

    fn query(&mut self, name: &str) -> Result<QueryExpression, Error> {
        match self.required(name)? {
            Parameter::Query(query) => Ok(query),
            other => Err(self.mistyped(name, "query", &other)),
        }
    }

    fn related_queries(&mut self, name: &str) -> Result<Vec<QueryExpression>, Error> {
        match self.inner.remove(name) {
            None => Ok(Vec::new()),
            Some(Parameter::RelatedQueries(queries)) => Ok(queries),
            Some(other) => Err(self.mistyped(name, "related_queries", &other)),
        }
    }

    fn concurrency(&mut self, name: &str) -> Result<ConcurrencyBehavior, Error> {
        match self.inner.remove(name) {
            None => Ok(ConcurrencyBehavior::Default),
            Some(Parameter::ConcurrencyBehavior(behavior)) => Ok(behavior),
            Some(other) => Err(self.mistyped(name, "concurrency_behavior", &other)),
        }
    }
}

/// The result of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", content = "result")]
pub enum Response {
    Retrieve(Record),
    RetrieveMultiple(RecordCollection),
    Create(RecordId),
    Update,
    Delete,
}

impl Response {
    pub fn kind(&self) -> MessageKind {
        match self {
            Response::Retrieve(_) => MessageKind::Retrieve,
            Response::RetrieveMultiple(_) => MessageKind::RetrieveMultiple,
            Response::Create(_) => MessageKind::Create,
            Response::Update => MessageKind::Update,
            Response::Delete => MessageKind::Delete,
        }
    }
}
