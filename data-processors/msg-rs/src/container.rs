//! Access to the compound file holding a message
//!
//! The OLE container itself is read elsewhere; the decoder only needs named
//! streams and the list of content streams of a storage. Paths use `/` as
//! the separator, storages end with `/` and the root storage is the empty
//! string
use std::collections::BTreeMap;
use std::io;

/// The prefix of every content stream name
pub const CONTENT_STREAM_PREFIX: &str = "__substg1.0_";

/// The name of the property stream in every object storage
pub const PROPERTY_STREAM: &str = "__properties_version1.0";

/// A read only store of named streams
///
/// A [`NotFound`](io::ErrorKind::NotFound) error means the stream or storage
/// is absent; any other error is a failure of the container
pub trait StreamStore {
    /// Read the whole stream at `path`
    fn read_stream(&self, path: &str) -> Result<Vec<u8>, io::Error>;

    /// List the content streams (`__substg1.0_*`) directly inside `storage`,
    /// with their data
    ///
    /// Stream names are relative to `storage`
    fn list_property_streams(&self, storage: &str) -> Result<Vec<(String, Vec<u8>)>, io::Error>;
}

impl<T: StreamStore + ?Sized> StreamStore for &T {
    fn read_stream(&self, path: &str) -> Result<Vec<u8>, io::Error> {
        (**self).read_stream(path)
    }

    fn list_property_streams(&self, storage: &str) -> Result<Vec<(String, Vec<u8>)>, io::Error> {
        (**self).list_property_streams(storage)
    }
}

impl<T: StreamStore + ?Sized> StreamStore for Box<T> {
    fn read_stream(&self, path: &str) -> Result<Vec<u8>, io::Error> {
        (**self).read_stream(path)
    }

    fn list_property_streams(&self, storage: &str) -> Result<Vec<(String, Vec<u8>)>, io::Error> {
        (**self).list_property_streams(storage)
    }
}

#[derive(Debug, Default, Clone)]
/// A [`StreamStore`] over streams already held in memory
pub struct MemoryStore {
    streams: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the stream at `path`
    pub fn insert<P: Into<String>, D: Into<Vec<u8>>>(&mut self, path: P, data: D) {
        self.streams.insert(path.into(), data.into());
    }

    /// Remove the stream at `path`
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.streams.remove(path)
    }

    /// Remove every stream inside `storage`
    pub fn remove_storage(&mut self, storage: &str) {
        self.streams.retain(|k, _| !k.starts_with(storage));
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether the store holds no stream
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl StreamStore for MemoryStore {
    fn read_stream(&self, path: &str) -> Result<Vec<u8>, io::Error> {
        self.streams
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no stream {path:?}")))
    }

    fn list_property_streams(&self, storage: &str) -> Result<Vec<(String, Vec<u8>)>, io::Error> {
        let mut found = storage.is_empty();
        let mut ret = Vec::new();
        for (path, data) in self.streams.range(storage.to_string()..) {
            let Some(name) = path.strip_prefix(storage) else {
                break;
            };
            found = true;
            if name.starts_with(CONTENT_STREAM_PREFIX) && !name.contains('/') {
                ret.push((name.to_string(), data.clone()));
            }
        }
        if found {
            Ok(ret)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no storage {storage:?}"),
            ))
        }
    }
}

impl<P: Into<String>, D: Into<Vec<u8>>> FromIterator<(P, D)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (P, D)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (path, data) in iter {
            store.insert(path, data);
        }
        store
    }
}
