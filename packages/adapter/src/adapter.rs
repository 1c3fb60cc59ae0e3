//! The adapter: rewrite a request, run it against the backing store,
//! rewrite the response.

use schemashim_mapping::{
    rewrite_collection, rewrite_columns, rewrite_query, rewrite_record, rewrite_reference,
    Direction, EntityMap, EntityMapFactory, Error, MetadataSource, NameMapper, QueryMap,
    QueryMapFactory,
};
use schemashim_records::ColumnSet;
use tracing::{debug, trace};

use crate::message::RELATED_ENTITIES_QUERY;
use crate::{AdapterConfig, BackingStore, Message, MessageKind, Request, Response};

/// Translates requests between the caller's schema and the backing
/// store's.
///
/// The metadata source and name mapper are injected at construction; the
/// backing store is passed per call. Every request builds its own maps, so
/// one adapter can serve concurrent requests.
pub struct Adapter {
    metadata: Box<dyn MetadataSource>,
    mapper: Box<dyn NameMapper>,
    config: AdapterConfig,
}

/// A request rewritten for the backing store, plus what is needed to
/// rewrite its response.
#[derive(Debug)]
pub struct Prepared {
    request: Request,
    pending: Pending,
}

impl Prepared {
    /// The request in backing-store vocabulary.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_parts(self) -> (Request, Pending) {
        (self.request, self.pending)
    }
}

/// The maps a response is rewritten with.
#[derive(Debug)]
pub struct Pending {
    kind: MessageKind,
    map: QueryMap,
    projection: Option<ColumnSet>,
}

impl Pending {
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn map(&self) -> &QueryMap {
        &self.map
    }
}

impl Adapter {
    pub fn new<M, N>(metadata: M, mapper: N, config: AdapterConfig) -> Self
    where
        M: MetadataSource + 'static,
        N: NameMapper + 'static,
    {
        Self::from_parts(Box::new(metadata), Box::new(mapper), config)
    }

    /// Build an adapter from already boxed collaborators, for when they
    /// are chosen at runtime.
    pub fn from_parts(
        metadata: Box<dyn MetadataSource>,
        mapper: Box<dyn NameMapper>,
        config: AdapterConfig,
    ) -> Self {
        Self {
            metadata,
            mapper,
            config,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Build the entity map for one record type.
    pub fn entity_map(&self, type_name: &str) -> Result<EntityMap, Error> {
        let metadata = self.metadata.record_type(type_name)?;
        EntityMapFactory::new(self.mapper.as_ref()).create(&metadata, None)
    }

    /// Parse a pipeline message and run it.
    pub fn handle<S>(&self, message: Message, store: &S) -> Result<Response, Error>
    where
        S: BackingStore + ?Sized,
    {
        self.execute(Request::try_from(message)?, store)
    }

    /// Run one request: rewrite it, make exactly one backing-store call,
    /// and rewrite the response.
    ///
    /// Nothing reaches the store unless the whole request could be
    /// rewritten.
    pub fn execute<S>(&self, request: Request, store: &S) -> Result<Response, Error>
    where
        S: BackingStore + ?Sized,
    {
        let (native, pending) = self.prepare(request)?.into_parts();
        let response = store.execute(native)?;
        self.complete(pending, response)
    }

    /// Rewrite a request into backing-store vocabulary without running it.
    pub fn prepare(&self, request: Request) -> Result<Prepared, Error> {
        let kind = request.kind();
        if !self.config.is_enabled(kind) {
            return Err(Error::unsupported(format!("Message '{}'", kind)));
        }
        let type_name = request.type_name().to_string();

        let (native, map, projection) = match request {
            Request::Retrieve {
                target,
                columns,
                related_queries,
            } => {
                if !related_queries.is_empty() {
                    return Err(Error::unsupported(RELATED_ENTITIES_QUERY));
                }
                let map = self.entity_map(&target.type_name)?;
                let native = Request::Retrieve {
                    target: rewrite_reference(target, &map, Direction::ToNative)?,
                    columns: rewrite_columns(columns.clone(), &map, Direction::ToNative)?,
                    related_queries,
                };
                let projection =
                    (self.config.project_retrieve && !columns.is_all()).then_some(columns);
                (native, QueryMap::new(map), projection)
            }
            Request::RetrieveMultiple { query } => {
                let map = QueryMapFactory::new(self.metadata.as_ref(), self.mapper.as_ref())
                    .create(&query)?;
                let query = rewrite_query(query, &map, Direction::ToNative)?;
                trace!(
                    entity = %query.entity_name,
                    columns = ?query.columns,
                    conditions = query.criteria.conditions.len(),
                    "converted query"
                );
                (Request::RetrieveMultiple { query }, map, None)
            }
            Request::Create { target } => {
                let map = self.entity_map(&target.type_name)?;
                let target = rewrite_record(target, &map, Direction::ToNative)?;
                (Request::Create { target }, QueryMap::new(map), None)
            }
            Request::Update {
                target,
                concurrency,
            } => {
                let map = self.entity_map(&target.type_name)?;
                let target = rewrite_record(target, &map, Direction::ToNative)?;
                (
                    Request::Update {
                        target,
                        concurrency,
                    },
                    QueryMap::new(map),
                    None,
                )
            }
            Request::Delete {
                target,
                concurrency,
            } => {
                let map = self.entity_map(&target.type_name)?;
                let target = rewrite_reference(target, &map, Direction::ToNative)?;
                (
                    Request::Delete {
                        target,
                        concurrency,
                    },
                    QueryMap::new(map),
                    None,
                )
            }
        };

        debug!(
            kind = %kind,
            type_name = %type_name,
            native_type = native.type_name(),
            attributes = map.primary().attributes().len(),
            joins = map.joins().len(),
            "prepared request"
        );

        Ok(Prepared {
            request: native,
            pending: Pending {
                kind,
                map,
                projection,
            },
        })
    }

    /// Rewrite a backing-store response back into caller vocabulary.
    pub fn complete(&self, pending: Pending, response: Response) -> Result<Response, Error> {
        let Pending {
            kind,
            map,
            projection,
        } = pending;

        let response = match (kind, response) {
            (MessageKind::Retrieve, Response::Retrieve(record)) => {
                let mut record = rewrite_record(record, map.primary(), Direction::ToExternal)?;
                if let Some(columns) = projection {
                    record.attributes.retain(|name, _| columns.contains(name));
                }
                Response::Retrieve(record)
            }
            (MessageKind::RetrieveMultiple, Response::RetrieveMultiple(collection)) => {
                Response::RetrieveMultiple(rewrite_collection(
                    collection,
                    &map,
                    Direction::ToExternal,
                )?)
            }
            (MessageKind::Create, Response::Create(id)) => Response::Create(id),
            (MessageKind::Update, Response::Update) => Response::Update,
            (MessageKind::Delete, Response::Delete) => Response::Delete,
            (kind, other) => {
                debug!(
                    expected = %kind,
                    found = %other.kind(),
                    "backing store answered with the wrong shape"
                );
                return Err(Error::UnexpectedResponse {
                    expected: kind.as_str(),
                });
            }
        };

        debug!(
            kind = %kind,
            type_name = map.primary().type_name(Direction::ToExternal),
            "completed request"
        );
        Ok(response)
    }
}
