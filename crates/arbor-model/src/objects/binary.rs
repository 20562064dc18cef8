use std::io::Read;

use arbor_store::{BinaryStream, ByteRange};
use arbor_types::{vocab, Digest};

use crate::error::ModelResult;

typed_object!(
    /// Opaque content with a separate description resource.
    ///
    /// Only the probe data is captured when the handle is created; the
    /// description graph is fetched on first metadata access.
    BinaryObject,
    Binary
);

impl BinaryObject {
    pub fn filename(&self) -> ModelResult<Option<String>> {
        let graph = self.core.graph()?;
        Ok(graph
            .literal(self.uri(), vocab::ebucore::FILENAME)
            .map(str::to_string))
    }

    pub fn mimetype(&self) -> ModelResult<Option<String>> {
        let graph = self.core.graph()?;
        Ok(graph
            .literal(self.uri(), vocab::ebucore::MIME_TYPE)
            .map(str::to_string))
    }

    /// Content length in bytes.
    pub fn size(&self) -> ModelResult<Option<u64>> {
        let graph = self.core.graph()?;
        Ok(graph
            .literal(self.uri(), vocab::premis::HAS_SIZE)
            .and_then(|v| v.parse().ok())
            .or(self.core.content_length()))
    }

    /// Recorded digests; unparseable values are skipped.
    pub fn digests(&self) -> ModelResult<Vec<Digest>> {
        let graph = self.core.graph()?;
        Ok(graph
            .iris(self.uri(), vocab::premis::HAS_MESSAGE_DIGEST)
            .into_iter()
            .filter_map(|urn| Digest::from_urn(urn).ok())
            .collect())
    }

    /// Where the bytes can be fetched: the external location if the
    /// content is stored out of band, otherwise the binary itself.
    pub fn content_uri(&self) -> &str {
        self.core.content_location().unwrap_or(self.uri())
    }

    pub fn open_stream(&self, range: Option<ByteRange>) -> ModelResult<BinaryStream> {
        self.core.driver().get_binary_stream(self, range)
    }

    /// Read the whole content into memory.
    pub fn read_to_vec(&self) -> ModelResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.open_stream(None)?.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
